//! # stockroom-tax
//!
//! ```bash
//! stockroom-tax import taxes.json
//! stockroom-tax calculate context.json
//! stockroom-tax list --status active --sort name --asc
//! ```

use anyhow::Context;
use std::process::ExitCode;
use tracing::info;

use stockroom_cli::commands::{self, Command, USAGE};
use stockroom_cli::config::CliConfig;
use stockroom_cli::error::CliError;
use stockroom_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    stockroom_cli::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(err) => return report(&err),
    };

    if !command.needs_database() {
        print!("{}", USAGE);
        return Ok(ExitCode::SUCCESS);
    }

    let config = CliConfig::load().context("failed to load configuration")?;
    info!(db_path = %config.db_path.display(), "Configuration loaded");

    let db = Database::new(config.db_config())
        .await
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;

    let outcome = commands::execute(&db, command).await;
    db.close().await;

    match outcome {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report(&err),
    }
}

fn report(err: &CliError) -> anyhow::Result<ExitCode> {
    eprintln!("{}", serde_json::to_string_pretty(err)?);
    Ok(ExitCode::from(err.exit_code() as u8))
}
