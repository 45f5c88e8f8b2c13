//! # smelter-core
//!
//! Shared vocabulary for the smelter bulk-upsert workspace.
//!
//! This crate provides:
//! - A dynamic scalar value model for row cells ([`ScalarValue`], [`ToScalar`])
//! - Tabular batches of rows keyed by column name ([`Row`], [`Batch`])
//! - Table descriptors naming columns and primary keys ([`TableDescriptor`])
//! - The conflict policy vocabulary shared by every dialect ([`ConflictPolicy`])
//! - The [`Session`] trait, the unit-of-work seam drivers implement
//!
//! Nothing in this crate talks to a database. Driver crates
//! (`smelter-postgres`, `smelter-duckdb`) implement [`Session`]; the
//! `smelter-upsert` crate renders and executes the statements.
//!
//! ## Describing a table and a batch
//!
//! ```rust
//! use smelter_core::{Batch, Row, TableDescriptor};
//!
//! let accounts = TableDescriptor::builder("accounts")
//!     .column("id")
//!     .column("name")
//!     .column("balance")
//!     .primary_key("id")
//!     .build()
//!     .expect("valid descriptor");
//!
//! let batch: Batch = vec![
//!     Row::new().with("id", 1).with("name", "Alice").with("balance", 10.5),
//!     Row::new().with("id", 2).with("name", "Bob"),
//! ]
//! .into();
//!
//! assert_eq!(accounts.non_key_columns(), vec!["name", "balance"]);
//! assert_eq!(batch.len(), 2);
//! ```

pub mod policy;
pub mod row;
pub mod session;
pub mod table;
pub mod value;

pub use policy::{ConflictPolicy, InvalidPolicy};
pub use row::{Batch, Row};
pub use session::{Session, SessionError};
pub use table::{DescriptorError, TableDescriptor, TableDescriptorBuilder};
pub use value::{ScalarValue, ToScalar};
