//! Error types for the upsert subsystem.

use smelter_core::SessionError;
use thiserror::Error;

/// Errors raised by upsert engines, the dialect registry, and the
/// reconciler.
#[derive(Debug, Error)]
pub enum UpsertError {
    /// No engine is registered for the session's dialect.
    #[error("Unsupported dialect: {dialect}")]
    UnsupportedDialect {
        /// The dialect name the session reported.
        dialect: String,
    },

    /// The session failed while executing or committing a statement.
    #[error("Upsert execution failed: {0}")]
    Execution(#[from] SessionError),

    /// Too large a fraction of the batch went missing after the upsert.
    #[error(
        "Upserted {affected} of {total} rows, missing ratio {missing_ratio:.3} exceeds tolerance {tolerance}"
    )]
    ToleranceExceeded {
        /// Rows the driver reported as affected.
        affected: u64,
        /// Rows in the submitted batch.
        total: usize,
        /// `1 - affected / total`.
        missing_ratio: f64,
        /// The tolerance the ratio was compared against.
        tolerance: f64,
    },

    /// Reconciler configured with a tolerance outside the supported range.
    #[error("Tolerance {value} is outside the supported range [0.0, 0.5]")]
    InvalidTolerance {
        /// The rejected tolerance.
        value: f64,
    },
}

/// Result type alias for upsert operations.
pub type Result<T> = std::result::Result<T, UpsertError>;
