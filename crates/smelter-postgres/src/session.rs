//! Session implementation over a blocking `postgres::Client`.

use postgres::types::ToSql;
use postgres::{Client, NoTls};
use tracing::debug;

use smelter_core::{ScalarValue, Session, SessionError};

use crate::param::PgParam;

/// A synchronous unit of work against one PostgreSQL connection.
///
/// The first [`execute`](Session::execute) opens a transaction; work stays
/// invisible to other connections until [`commit`](Session::commit).
/// A failed statement rolls the transaction back so the session can run
/// another. Dropping the session with an open transaction lets the server
/// roll it back when the connection closes.
pub struct PgSession {
    client: Client,
    in_txn: bool,
}

impl std::fmt::Debug for PgSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgSession")
            .field("in_txn", &self.in_txn)
            .finish_non_exhaustive()
    }
}

impl PgSession {
    /// Dialect name reported by this driver.
    pub const DIALECT: &'static str = "postgresql";

    /// Connects to the given database URL without TLS.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Connect`] when the URL is malformed or the
    /// server is unreachable.
    pub fn connect(url: &str) -> Result<Self, SessionError> {
        let client =
            Client::connect(url, NoTls).map_err(|err| SessionError::Connect(Box::new(err)))?;
        debug!("Connected to PostgreSQL");
        Ok(Self {
            client,
            in_txn: false,
        })
    }

    /// Connects using the `DATABASE_URL` environment variable, loading a
    /// `.env` file first when one is present.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Configuration`] when `DATABASE_URL` is not
    /// set, or [`SessionError::Connect`] when the connection fails.
    pub fn from_env() -> Result<Self, SessionError> {
        dotenvy::dotenv().ok();
        let url = std::env::var("DATABASE_URL").map_err(|_| {
            SessionError::Configuration(String::from("DATABASE_URL is not set"))
        })?;
        Self::connect(&url)
    }

    /// The underlying client, for DDL and ad-hoc queries.
    ///
    /// Statements issued here bypass the session's transaction tracking.
    pub fn client(&mut self) -> &mut Client {
        &mut self.client
    }

    fn begin_if_needed(&mut self) -> Result<(), SessionError> {
        if !self.in_txn {
            self.client
                .batch_execute("BEGIN")
                .map_err(|err| SessionError::Execute(Box::new(err)))?;
            self.in_txn = true;
        }
        Ok(())
    }

    /// Abandons the aborted transaction so the session stays usable.
    /// The execute error is the one reported; a rollback failure is not.
    fn rollback_after_failure(&mut self) {
        if self.in_txn {
            let _ = self.client.batch_execute("ROLLBACK");
            self.in_txn = false;
        }
    }
}

impl Session for PgSession {
    fn dialect(&self) -> &str {
        Self::DIALECT
    }

    fn execute(&mut self, sql: &str, params: &[ScalarValue]) -> Result<u64, SessionError> {
        self.begin_if_needed()?;
        let bound: Vec<PgParam<'_>> = params.iter().map(PgParam).collect();
        let refs: Vec<&(dyn ToSql + Sync)> = bound
            .iter()
            .map(|param| param as &(dyn ToSql + Sync))
            .collect();
        match self.client.execute(sql, &refs) {
            Ok(affected) => Ok(affected),
            Err(err) => {
                self.rollback_after_failure();
                Err(SessionError::Execute(Box::new(err)))
            }
        }
    }

    fn commit(&mut self) -> Result<(), SessionError> {
        if self.in_txn {
            self.client
                .batch_execute("COMMIT")
                .map_err(|err| SessionError::Commit(Box::new(err)))?;
            self.in_txn = false;
            debug!("Committed PostgreSQL transaction");
        }
        Ok(())
    }
}
