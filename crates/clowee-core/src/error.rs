//! # Error Types
//!
//! Domain-specific error types for clowee-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  clowee-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  clowee-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  back-office errors (in app)                                           │
//! │  └── CliError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → CliError → Operator     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A machine already has a sale inside the billing period.
    ///
    /// ## When This Occurs
    /// ```text
    /// Machine M-07, Monthly franchise
    ///   existing sale: 2026-10-05
    ///   new sale:      2026-10-28
    ///      │
    ///      ▼
    /// DuplicateBillingPeriod { period: "2026-10", ... }
    ///      │
    ///      ▼
    /// Operator must edit the existing sale instead
    /// ```
    #[error("Machine {machine_id} already has sale {existing_sale_id} for billing period {period}")]
    DuplicateBillingPeriod {
        machine_id: String,
        period: String,
        existing_sale_id: String,
    },

    /// The machine is registered under a different franchise.
    #[error("Machine {machine_id} does not belong to franchise {franchise_id}")]
    FranchiseMismatch {
        machine_id: String,
        franchise_id: String,
    },

    /// Sales cannot be recorded for a decommissioned machine.
    #[error("Machine {0} is inactive")]
    MachineInactive(String),

    /// Sale is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Editing a sale that has already been paid
    #[error("Sale {sale_id} is {current_status}, cannot perform operation")]
    InvalidSaleStatus {
        sale_id: String,
        current_status: String,
    },

    /// A counter reading is lower than the previous one.
    #[error("{counter} counter went backwards: previous {previous}, current {current}")]
    CounterRegression {
        counter: String,
        previous: i64,
        current: i64,
    },

    /// Payment amount is invalid.
    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two date bounds are in the wrong order.
    #[error("{field}: start {from} is after end {to}")]
    InvertedRange {
        field: String,
        from: String,
        to: String,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
