//! # CLI Error Type
//!
//! Unified error type for CLI commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in stockroom-tax                          │
//! │                                                                         │
//! │  Command function -> Result<T, CliError>                                │
//! │         │                                                               │
//! │         ├── DbError::NotFound        ──► NOT_FOUND                      │
//! │         ├── DbError::Validation      ──► VALIDATION_ERROR               │
//! │         ├── CoreError::InvalidContext ─► VALIDATION_ERROR               │
//! │         ├── bad flags / file path    ──► INVALID_ARGUMENTS / IO_ERROR   │
//! │         └── anything from SQLite     ──► DATABASE_ERROR                 │
//! │                                                                         │
//! │  main() prints the error as JSON on stderr and exits non-zero:          │
//! │                                                                         │
//! │    { "code": "NOT_FOUND", "message": "Tax not found: 4f0c..." }         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use stockroom_core::{CoreError, ValidationError};
use stockroom_db::DbError;

/// Error reported by a CLI command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliError {
    /// Machine-readable error code for scripts
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for CLI failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Tax not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Unknown command, missing or malformed flag
    InvalidArguments,

    /// Input file could not be read or parsed
    IoError,

    /// Database operation failed
    DatabaseError,

    /// Internal error
    Internal,
}

impl ErrorCode {
    /// Process exit status for this code.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::InvalidArguments => 2,
            ErrorCode::NotFound => 3,
            ErrorCode::ValidationError => 4,
            ErrorCode::IoError => 5,
            ErrorCode::DatabaseError | ErrorCode::Internal => 1,
        }
    }
}

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        CliError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ValidationError, message)
    }

    pub fn usage(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::InvalidArguments, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::IoError, message)
    }

    pub fn exit_code(&self) -> i32 {
        self.code.exit_code()
    }
}

impl From<DbError> for CliError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CliError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => CliError::validation(format!(
                "{} '{}' already exists",
                field, value
            )),
            DbError::Validation(e) => CliError::validation(e.to_string()),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                CliError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Serialization(e) => {
                tracing::error!("Stored rule value is unreadable: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Stored tax data is corrupt")
            }
            DbError::PoolExhausted => {
                CliError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::TaxNotFound(id) => CliError::not_found("Tax", &id),
            CoreError::InvalidContext(e) => {
                CliError::validation(format!("Invalid calculation context: {}", e))
            }
            CoreError::Validation(e) => CliError::validation(e.to_string()),
        }
    }
}

/// Flag values that fail to parse (`--status maybe`) are usage errors.
impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::usage(err.to_string())
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_maps_to_not_found() {
        let err: CliError = DbError::tax_not_found("abc").into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Tax not found: abc");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_invalid_context_maps_to_validation() {
        let err: CliError = CoreError::InvalidContext(ValidationError::MustBeNonNegative {
            field: "basePrice".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("basePrice"));
    }

    #[test]
    fn test_serialized_shape() {
        let err = CliError::usage("unknown command 'frobnicate'");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "INVALID_ARGUMENTS");
        assert_eq!(json["message"], "unknown command 'frobnicate'");
    }

    #[test]
    fn test_internal_details_are_not_leaked() {
        let err: CliError = DbError::QueryFailed("near \"SELEC\": syntax error".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");
    }
}
