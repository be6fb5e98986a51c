//! # Commands
//!
//! Argument parsing and dispatch for `stockroom-tax`.
//!
//! ## Command Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stockroom-tax calculate <context.json|->  → calculate::run            │
//! │  stockroom-tax list [flags]                → tax::list                 │
//! │  stockroom-tax get <id>                    → tax::get                  │
//! │  stockroom-tax create <tax.json|->         → tax::create               │
//! │  stockroom-tax update <id> <tax.json|->    → tax::update               │
//! │  stockroom-tax delete <id>                 → tax::delete               │
//! │  stockroom-tax import <taxes.json|->       → tax::import               │
//! │  stockroom-tax status                      → tax::status               │
//! │  stockroom-tax help                        (no database needed)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every command returns a serializable value; `main` prints it as JSON.

pub mod calculate;
pub mod tax;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CliError, ErrorCode};
use stockroom_core::{SortDirection, TaxQuery};
use stockroom_db::Database;

/// Usage text printed by `help`.
pub const USAGE: &str = "\
Usage: stockroom-tax <COMMAND>

Commands:
  calculate <FILE>    Evaluate active taxes against a context (JSON file, - for stdin)
  list [OPTIONS]      List taxes
  get <ID>            Show one tax
  create <FILE>       Create a tax from a JSON object (FILE, - for stdin)
  update <ID> <FILE>  Replace a tax's definition (FILE, - for stdin)
  delete <ID>         Delete a tax
  import <FILE>       Create taxes from a JSON array (FILE, - for stdin)
  status              Database health and counts
  help                Show this message

List options:
  --search <TEXT>       Name contains TEXT (case-insensitive)
  --status <STATUS>     active | inactive
  --type <TYPE>         percentage | fixed
  --sort <FIELD>        name | rate | type | status | updatedAt
  --asc | --desc        Sort direction (default: desc)
  --page <N>            Page number (default: 1)
  --page-size <N>       Page size (default: 20, max: 100)

Environment:
  STOCKROOM_DB_PATH, STOCKROOM_DB_MAX_CONNECTIONS, STOCKROOM_RUN_MIGRATIONS, RUST_LOG
";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Calculate { input: PathBuf },
    List(TaxQuery),
    Get { id: String },
    Create { input: PathBuf },
    Update { id: String, input: PathBuf },
    Delete { id: String },
    Import { input: PathBuf },
    Status,
    Help,
}

impl Command {
    /// Parses the arguments after the program name.
    pub fn parse(args: &[String]) -> Result<Self, CliError> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };

        match name.as_str() {
            "calculate" | "calc" => Ok(Command::Calculate {
                input: PathBuf::from(single_arg(rest, "calculate", "FILE")?),
            }),
            "list" | "ls" => Ok(Command::List(parse_list_flags(rest)?)),
            "get" | "show" => Ok(Command::Get {
                id: single_arg(rest, "get", "ID")?,
            }),
            "create" | "new" => Ok(Command::Create {
                input: PathBuf::from(single_arg(rest, "create", "FILE")?),
            }),
            "update" | "edit" => match rest {
                [id, input] => Ok(Command::Update {
                    id: id.clone(),
                    input: PathBuf::from(input),
                }),
                _ => Err(CliError::usage("update requires <ID> <FILE>")),
            },
            "delete" | "rm" => Ok(Command::Delete {
                id: single_arg(rest, "delete", "ID")?,
            }),
            "import" => Ok(Command::Import {
                input: PathBuf::from(single_arg(rest, "import", "FILE")?),
            }),
            "status" => Ok(Command::Status),
            "help" | "--help" | "-h" => Ok(Command::Help),
            other => Err(CliError::usage(format!(
                "unknown command '{}' (try 'stockroom-tax help')",
                other
            ))),
        }
    }

    pub fn needs_database(&self) -> bool {
        !matches!(self, Command::Help)
    }
}

/// Runs a command against the database and returns its JSON output.
pub async fn execute(db: &Database, command: Command) -> Result<Value, CliError> {
    debug!(?command, "Executing command");

    match command {
        Command::Calculate { input } => {
            let context = read_json(&input)?;
            to_json(&calculate::run(db, context).await?)
        }
        Command::List(query) => to_json(&tax::list(db, query).await?),
        Command::Get { id } => to_json(&tax::get(db, &id).await?),
        Command::Create { input } => {
            let new_tax = read_json(&input)?;
            to_json(&tax::create(db, new_tax).await?)
        }
        Command::Update { id, input } => {
            let new_tax = read_json(&input)?;
            to_json(&tax::update(db, &id, new_tax).await?)
        }
        Command::Delete { id } => to_json(&tax::delete(db, &id).await?),
        Command::Import { input } => {
            let new_taxes = read_json(&input)?;
            to_json(&tax::import(db, new_taxes).await?)
        }
        Command::Status => to_json(&tax::status(db).await?),
        Command::Help => Ok(Value::String(USAGE.to_string())),
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn single_arg(rest: &[String], command: &str, what: &str) -> Result<String, CliError> {
    match rest {
        [value] => Ok(value.clone()),
        [] => Err(CliError::usage(format!("{} requires <{}>", command, what))),
        _ => Err(CliError::usage(format!(
            "{} takes exactly one <{}>",
            command, what
        ))),
    }
}

fn parse_list_flags(args: &[String]) -> Result<TaxQuery, CliError> {
    let mut query = TaxQuery::default();

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--asc" => query.sort_direction = SortDirection::Asc,
            "--desc" => query.sort_direction = SortDirection::Desc,
            "--search" | "--status" | "--type" | "--sort" | "--page" | "--page-size" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| CliError::usage(format!("{} requires a value", flag)))?;
                i += 1;

                match flag {
                    "--search" => query.search = Some(value.clone()),
                    "--status" => query.status = Some(value.parse()?),
                    "--type" => query.tax_type = Some(value.parse()?),
                    "--sort" => query.sort_by = value.parse()?,
                    "--page" => query.page = parse_number(flag, value)?,
                    _ => query.page_size = parse_number(flag, value)?,
                }
            }
            other => {
                return Err(CliError::usage(format!("unknown list option '{}'", other)));
            }
        }
        i += 1;
    }

    Ok(query)
}

fn parse_number(flag: &str, value: &str) -> Result<u32, CliError> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::usage(format!("{} expects a positive number, got '{}'", flag, value)))
}

/// Reads and deserializes a JSON input file; `-` reads stdin.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::io(format!("failed to read stdin: {}", e)))?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| CliError::io(format!("failed to read {}: {}", path.display(), e)))?
    };

    serde_json::from_str(&text)
        .map_err(|e| CliError::io(format!("invalid JSON in {}: {}", path.display(), e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, CliError> {
    serde_json::to_value(value).map_err(|e| CliError::new(ErrorCode::Internal, e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::{TaxSortField, TaxStatus, TaxType};

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse(&[]).unwrap(), Command::Help);
        assert_eq!(Command::parse(&args("status")).unwrap(), Command::Status);
        assert_eq!(
            Command::parse(&args("get abc")).unwrap(),
            Command::Get { id: "abc".into() }
        );
        assert_eq!(
            Command::parse(&args("calculate ctx.json")).unwrap(),
            Command::Calculate {
                input: PathBuf::from("ctx.json")
            }
        );
        assert_eq!(
            Command::parse(&args("update abc tax.json")).unwrap(),
            Command::Update {
                id: "abc".into(),
                input: PathBuf::from("tax.json")
            }
        );
        assert_eq!(
            Command::parse(&args("create -")).unwrap(),
            Command::Create {
                input: PathBuf::from("-")
            }
        );
        assert!(!Command::Help.needs_database());
        assert!(Command::Status.needs_database());
    }

    #[test]
    fn test_parse_errors_are_usage_errors() {
        for line in [
            "frobnicate",
            "get",
            "delete a b",
            "update abc",
            "create",
            "list --page",
            "list --bogus",
        ] {
            let err = Command::parse(&args(line)).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidArguments, "{}", line);
        }

        let err = Command::parse(&args("list --status maybe")).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArguments);
    }

    #[test]
    fn test_parse_list_flags() {
        let cmd = Command::parse(&args(
            "list --search vat --status inactive --type fixed --sort rate --asc --page 2 --page-size 5",
        ))
        .unwrap();

        let Command::List(query) = cmd else {
            panic!("expected list");
        };
        assert_eq!(query.search.as_deref(), Some("vat"));
        assert_eq!(query.status, Some(TaxStatus::Inactive));
        assert_eq!(query.tax_type, Some(TaxType::Fixed));
        assert_eq!(query.sort_by, TaxSortField::Rate);
        assert_eq!(query.sort_direction, SortDirection::Asc);
        assert_eq!(query.page, 2);
        assert_eq!(query.page_size, 5);
    }

    #[test]
    fn test_read_json_reports_missing_file() {
        let err = read_json::<Value>(Path::new("/definitely/not/here.json")).unwrap_err();
        assert_eq!(err.code, ErrorCode::IoError);
    }
}
