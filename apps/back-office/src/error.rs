//! # CLI Error Type
//!
//! Every failure reaching the operator carries a stable machine-readable
//! code next to the human message, so scripts driving `clowee --json` can
//! branch on `code` without parsing text.
//!
//! ```json
//! { "code": "DUPLICATE_PERIOD", "message": "Machine m1 already has sale s1 for billing period 2026-10" }
//! ```

use serde::Serialize;
use std::fmt;

use crate::config::ConfigError;
use clowee_core::{CoreError, ValidationError};
use clowee_db::DbError;

/// Error returned from back-office commands.
#[derive(Debug, Clone, Serialize)]
pub struct CliError {
    pub code: ErrorCode,
    pub message: String,
}

/// Stable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    /// A sale already exists in the machine's billing period.
    DuplicatePeriod,
    BusinessLogic,
    PaymentError,
    DatabaseError,
    ConfigError,
    Internal,
}

impl ErrorCode {
    /// Process exit status for this error.
    pub fn exit_status(self) -> i32 {
        match self {
            ErrorCode::ValidationError | ErrorCode::ConfigError => 2,
            ErrorCode::NotFound => 3,
            ErrorCode::DuplicatePeriod | ErrorCode::BusinessLogic | ErrorCode::PaymentError => 4,
            ErrorCode::DatabaseError | ErrorCode::Internal => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::DuplicatePeriod => "DUPLICATE_PERIOD",
            ErrorCode::BusinessLogic => "BUSINESS_LOGIC",
            ErrorCode::PaymentError => "PAYMENT_ERROR",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::Internal => "INTERNAL",
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

    pub fn validation(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::Internal, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<DbError> for CliError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => core.into(),
            DbError::NotFound { entity, id } => {
                CliError::new(ErrorCode::NotFound, format!("{entity} not found: {id}"))
            }
            DbError::UniqueViolation { field, value } => {
                CliError::validation(format!("{field} '{value}' already exists"))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                CliError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                CliError::new(ErrorCode::DatabaseError, format!("Database connection failed: {e}"))
            }
            DbError::MigrationFailed(e) => {
                CliError::new(ErrorCode::DatabaseError, format!("Database migration failed: {e}"))
            }
            DbError::PoolExhausted => CliError::new(ErrorCode::DatabaseError, "Database is busy, try again"),
            DbError::QueryFailed(e) | DbError::InvalidData(e) | DbError::Internal(e) => {
                tracing::error!("Database operation failed: {}", e);
                CliError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::DuplicateBillingPeriod { .. } => ErrorCode::DuplicatePeriod,
            CoreError::InvalidPaymentAmount { .. } => ErrorCode::PaymentError,
            CoreError::Validation(_) | CoreError::CounterRegression { .. } => ErrorCode::ValidationError,
            CoreError::FranchiseMismatch { .. }
            | CoreError::MachineInactive(_)
            | CoreError::InvalidSaleStatus { .. } => ErrorCode::BusinessLogic,
        };
        CliError::new(code, err.to_string())
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::validation(err.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::internal(format!("Cannot encode output: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_period_code() {
        let err: CliError = DbError::Domain(CoreError::DuplicateBillingPeriod {
            machine_id: "m1".into(),
            period: "2026-10".into(),
            existing_sale_id: "s1".into(),
        })
        .into();

        assert_eq!(err.code, ErrorCode::DuplicatePeriod);
        assert_eq!(err.code.exit_status(), 4);
        assert!(err.message.contains("2026-10"));
    }

    #[test]
    fn test_serializes_code_and_message() {
        let err: CliError = DbError::not_found("Sale", "s9").into();
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Sale not found: s9");
        assert_eq!(err.to_string(), "[NOT_FOUND] Sale not found: s9");
    }

    #[test]
    fn test_internal_details_are_not_leaked() {
        let err: CliError = DbError::QueryFailed("near \"SELEC\": syntax error".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("SELEC"));
    }
}
