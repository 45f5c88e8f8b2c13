//! # smelter-postgres
//!
//! PostgreSQL [`Session`](smelter_core::Session) driver for `smelter-core`,
//! built on the blocking [`postgres`] client.
//!
//! # How PostgreSQL differs from other dialects
//!
//! - **[Placeholders]**: parameters are numbered `$1..$n`, not positional
//!   `?`.
//! - **Bind ceiling**: the extended-query protocol caps one statement at
//!   65 535 bound parameters, which is why bulk statements are chunked
//!   upstream.
//! - **Schema qualification**: tables are commonly addressed as
//!   `"schema"."table"`; the upsert engines qualify names when a schema is
//!   given.
//! - **Typed binds**: the server declares each parameter's type. Cell
//!   values adapt where that is lossless (`INT4`/`INT2` narrowing,
//!   `FLOAT4`), and `NULL` binds for any column type.
//!
//! [Placeholders]: https://www.postgresql.org/docs/current/sql-prepare.html
//!
//! ## Example
//!
//! ```rust,no_run
//! use smelter_core::Session;
//! use smelter_postgres::PgSession;
//!
//! # fn main() -> Result<(), smelter_core::SessionError> {
//! let mut session = PgSession::connect("postgres://app@localhost/ledger")?;
//! assert_eq!(session.dialect(), "postgresql");
//! # Ok(())
//! # }
//! ```

mod param;
mod session;

pub use session::PgSession;
