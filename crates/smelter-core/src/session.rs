//! The unit-of-work seam between upsert engines and database drivers.
//!
//! Engines render SQL and hand it to a [`Session`]; driver crates own the
//! connection, the parameter binding, and the transaction lifecycle. The
//! trait is object-safe on purpose: callers pass `&mut dyn Session`, so a
//! test can substitute a scripted session for a real connection without any
//! production code path knowing the difference.

use std::error::Error as StdError;

use thiserror::Error;

use crate::value::ScalarValue;

/// A boxed driver error, carried as the source of a [`SessionError`].
pub type DriverError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors surfaced by a [`Session`] implementation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Establishing the connection failed.
    #[error("Failed to connect to the database: {0}")]
    Connect(#[source] DriverError),

    /// Executing a statement failed.
    #[error("Statement execution failed: {0}")]
    Execute(#[source] DriverError),

    /// Committing the open transaction failed.
    #[error("Commit failed: {0}")]
    Commit(#[source] DriverError),

    /// The session configuration is unusable (bad URL, missing variable).
    #[error("Invalid session configuration: {0}")]
    Configuration(String),
}

/// A caller-owned unit of work against one database connection.
///
/// Implementations are synchronous and single-threaded: one statement at a
/// time, no internal retries or timeouts. Work stays invisible to other
/// connections until [`commit`](Session::commit); a session dropped with an
/// open transaction lets the database roll it back.
pub trait Session {
    /// Lowercase dialect name, e.g. `"postgresql"` or `"duckdb"`.
    ///
    /// This is the key the dialect registry resolves engines by.
    fn dialect(&self) -> &str;

    /// Executes one parameterized statement and returns the affected-row
    /// count as reported by the driver.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Execute`] when the driver rejects the
    /// statement. A failed statement rolls back any open transaction, so
    /// the session stays usable for a fresh attempt; work executed earlier
    /// in the transaction is lost with it.
    fn execute(&mut self, sql: &str, params: &[ScalarValue]) -> Result<u64, SessionError>;

    /// Makes the work of this session durable.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Commit`] when the database rejects the
    /// commit.
    fn commit(&mut self) -> Result<(), SessionError>;
}
