//! # smelter-duckdb
//!
//! DuckDB [`Session`](smelter_core::Session) driver for `smelter-core`.
//!
//! # How DuckDB differs from other dialects
//!
//! - **In-process store**: DuckDB runs inside the application, backed by a
//!   single database file or by memory. [`DuckDbSession::open`] accepts a
//!   file path, and turns a directory path into `<dir>/store.duckdb`.
//! - **[UPSERT]**: DuckDB speaks the PostgreSQL conflict grammar,
//!   `INSERT ... ON CONFLICT (...) DO NOTHING / DO UPDATE SET ...`.
//! - **[Prepared statements]**: parameters use positional `?` placeholders,
//!   not PostgreSQL's `$1..$n`.
//! - **Identifier quoting**: double quotes, standard SQL style.
//! - **UUID binding**: values bind as text; DuckDB casts `VARCHAR` to
//!   `UUID` implicitly on insert.
//!
//! [UPSERT]: https://duckdb.org/docs/sql/statements/insert
//! [Prepared statements]: https://duckdb.org/docs/sql/query_syntax/prepared_statements
//!
//! ## Example
//!
//! ```rust
//! use smelter_core::Session;
//! use smelter_duckdb::DuckDbSession;
//!
//! let mut session = DuckDbSession::open_in_memory().expect("in-memory store");
//! assert_eq!(session.dialect(), "duckdb");
//! ```

mod session;

pub use session::DuckDbSession;
