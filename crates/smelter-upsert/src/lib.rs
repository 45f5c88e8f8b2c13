//! # smelter-upsert
//!
//! Dialect-polymorphic bulk upserts with partial-failure tracking.
//!
//! This crate provides:
//! - [`UpsertEngine`], the per-dialect strategy that renders and executes
//!   `INSERT ... ON CONFLICT` statements ([`PostgresUpsertEngine`],
//!   [`DuckDbUpsertEngine`])
//! - [`DialectRegistry`], a table-driven map from dialect name to engine
//! - [`BulkReconciler`], which runs the upsert and fails when too large a
//!   fraction of the batch went missing
//!
//! Engines are stateless; the caller supplies the
//! [`Session`](smelter_core::Session) each call executes against, so a unit
//! test can substitute a scripted session for a real connection.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use smelter_core::{Batch, ConflictPolicy, Row, TableDescriptor};
//! use smelter_duckdb::DuckDbSession;
//! use smelter_upsert::{BulkReconciler, DialectRegistry, ReconcileRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let accounts = TableDescriptor::builder("accounts")
//!     .column("id")
//!     .column("name")
//!     .primary_key("id")
//!     .build()?;
//! let batch: Batch = vec![
//!     Row::new().with("id", 1).with("name", "Alice"),
//!     Row::new().with("id", 2).with("name", "Bob"),
//! ]
//! .into();
//!
//! let registry = Arc::new(DialectRegistry::with_default_engines());
//! let reconciler = BulkReconciler::builder(registry)
//!     .tolerance(0.0)
//!     .on_conflict(ConflictPolicy::Update)
//!     .build()?;
//!
//! let mut session = DuckDbSession::open_in_memory()?;
//! let affected =
//!     reconciler.reconcile(&ReconcileRequest::new(&accounts, &batch), &mut session)?;
//! assert_eq!(affected, 2);
//! # Ok(())
//! # }
//! ```

pub mod duckdb;
pub mod engine;
pub mod error;
pub mod postgres;
pub mod reconcile;
pub mod registry;

#[cfg(test)]
mod testing;

pub use duckdb::DuckDbUpsertEngine;
pub use engine::{UpsertEngine, UpsertRequest};
pub use error::{Result, UpsertError};
pub use postgres::PostgresUpsertEngine;
pub use reconcile::{BulkReconciler, BulkReconcilerBuilder, ReconcileRequest, ReconcilerConfig};
pub use registry::{DialectRegistry, SharedEngine};
