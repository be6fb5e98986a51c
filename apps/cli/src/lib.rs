//! # Stockroom Tax CLI
//!
//! Library half of the `stockroom-tax` binary: configuration, logging setup,
//! commands and their error type. `main.rs` only wires these together.
//!
//! ## Module Organization
//! ```text
//! stockroom_cli/
//! ├── lib.rs          ◄─── You are here (logging setup)
//! ├── config.rs       ◄─── Environment configuration
//! ├── error.rs        ◄─── CliError { code, message }
//! └── commands/
//!     ├── mod.rs      ◄─── Argument parsing + dispatch
//!     ├── calculate.rs◄─── Evaluate active taxes against a context
//!     └── tax.rs      ◄─── list / get / import / delete / status
//! ```

pub mod commands;
pub mod config;
pub mod error;

use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,stockroom=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so that stdout carries only command output.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=stockroom_core=trace` - Show why each tax did or did not apply
/// - Default: [`DEFAULT_LOG_FILTER`]
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
