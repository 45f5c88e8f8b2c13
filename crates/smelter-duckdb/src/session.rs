//! Session implementation over a `duckdb::Connection`.

use std::path::{Path, PathBuf};

use duckdb::types::{TimeUnit, Value};
use duckdb::{params_from_iter, Connection};
use tracing::debug;

use smelter_core::{ScalarValue, Session, SessionError};

/// File name used when [`DuckDbSession::open`] is handed a directory.
const DEFAULT_STORE_FILE: &str = "store.duckdb";

/// A synchronous unit of work against an in-process DuckDB store.
///
/// The first [`execute`](Session::execute) opens a transaction; work stays
/// invisible to later connections until [`commit`](Session::commit).
/// A failed statement rolls the transaction back so the session can run
/// another. Dropping the session with an open transaction abandons it.
pub struct DuckDbSession {
    conn: Connection,
    in_txn: bool,
}

impl DuckDbSession {
    /// Dialect name reported by this driver.
    pub const DIALECT: &'static str = "duckdb";

    /// Opens a database file, creating it when absent.
    ///
    /// A directory path is accepted too and resolves to
    /// `<dir>/store.duckdb`, so callers can point at a data directory
    /// without caring about the file name.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Connect`] when DuckDB cannot open the store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = resolve_store_path(path.as_ref());
        let conn =
            Connection::open(&path).map_err(|err| SessionError::Connect(Box::new(err)))?;
        debug!(path = %path.display(), "Opened DuckDB store");
        Ok(Self {
            conn,
            in_txn: false,
        })
    }

    /// Opens an ephemeral in-memory store.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Connect`] when DuckDB fails to initialize.
    pub fn open_in_memory() -> Result<Self, SessionError> {
        let conn =
            Connection::open_in_memory().map_err(|err| SessionError::Connect(Box::new(err)))?;
        debug!("Opened in-memory DuckDB store");
        Ok(Self {
            conn,
            in_txn: false,
        })
    }

    /// The underlying connection, for DDL and ad-hoc queries.
    ///
    /// Statements issued here bypass the session's transaction tracking.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn begin_if_needed(&mut self) -> Result<(), SessionError> {
        if !self.in_txn {
            self.conn
                .execute_batch("BEGIN TRANSACTION")
                .map_err(|err| SessionError::Execute(Box::new(err)))?;
            self.in_txn = true;
        }
        Ok(())
    }

    /// Abandons the aborted transaction so the session stays usable.
    /// The execute error is the one reported; a rollback failure is not.
    fn rollback_after_failure(&mut self) {
        if self.in_txn {
            let _ = self.conn.execute_batch("ROLLBACK");
            self.in_txn = false;
        }
    }
}

impl Session for DuckDbSession {
    fn dialect(&self) -> &str {
        Self::DIALECT
    }

    fn execute(&mut self, sql: &str, params: &[ScalarValue]) -> Result<u64, SessionError> {
        self.begin_if_needed()?;
        let bound = params.iter().map(bind_value);
        match self.conn.execute(sql, params_from_iter(bound)) {
            Ok(affected) => Ok(affected as u64),
            Err(err) => {
                self.rollback_after_failure();
                Err(SessionError::Execute(Box::new(err)))
            }
        }
    }

    fn commit(&mut self) -> Result<(), SessionError> {
        if self.in_txn {
            self.conn
                .execute_batch("COMMIT")
                .map_err(|err| SessionError::Commit(Box::new(err)))?;
            self.in_txn = false;
            debug!("Committed DuckDB transaction");
        }
        Ok(())
    }
}

/// Maps a cell value onto DuckDB's dynamic bind type.
fn bind_value(value: &ScalarValue) -> Value {
    match value {
        ScalarValue::Null => Value::Null,
        ScalarValue::Bool(b) => Value::Boolean(*b),
        ScalarValue::Int(n) => Value::BigInt(*n),
        ScalarValue::Float(f) => Value::Double(*f),
        ScalarValue::Text(s) => Value::Text(s.clone()),
        ScalarValue::Blob(b) => Value::Blob(b.clone()),
        // DuckDB casts VARCHAR to UUID implicitly on insert.
        ScalarValue::Uuid(u) => Value::Text(u.to_string()),
        ScalarValue::Timestamp(ts) => {
            Value::Timestamp(TimeUnit::Microsecond, ts.timestamp_micros())
        }
    }
}

fn resolve_store_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(DEFAULT_STORE_FILE)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn session_with_accounts_table() -> DuckDbSession {
        let session = DuckDbSession::open_in_memory().unwrap();
        session
            .connection()
            .execute_batch(
                "CREATE TABLE accounts (id BIGINT PRIMARY KEY, name VARCHAR, balance DOUBLE)",
            )
            .unwrap();
        session
    }

    #[test]
    fn test_dialect_name() {
        let session = DuckDbSession::open_in_memory().unwrap();
        assert_eq!(session.dialect(), "duckdb");
    }

    #[test]
    fn test_execute_binds_scalar_values() {
        let mut session = session_with_accounts_table();
        let affected = session
            .execute(
                "INSERT INTO accounts (id, name, balance) VALUES (?, ?, ?)",
                &[
                    ScalarValue::Int(1),
                    ScalarValue::Text(String::from("Alice")),
                    ScalarValue::Float(10.5),
                ],
            )
            .unwrap();
        assert_eq!(affected, 1);

        let name: String = session
            .connection()
            .query_row("SELECT name FROM accounts WHERE id = 1", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(name, "Alice");
    }

    #[test]
    fn test_execute_binds_null() {
        let mut session = session_with_accounts_table();
        session
            .execute(
                "INSERT INTO accounts (id, name, balance) VALUES (?, ?, ?)",
                &[
                    ScalarValue::Int(2),
                    ScalarValue::Null,
                    ScalarValue::Null,
                ],
            )
            .unwrap();

        let name: Option<String> = session
            .connection()
            .query_row("SELECT name FROM accounts WHERE id = 2", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(name, None);
    }

    #[test]
    fn test_uuid_binds_as_native_uuid() {
        let mut session = DuckDbSession::open_in_memory().unwrap();
        session
            .connection()
            .execute_batch("CREATE TABLE devices (id UUID PRIMARY KEY, label VARCHAR)")
            .unwrap();
        let id = Uuid::new_v4();

        session
            .execute(
                "INSERT INTO devices (id, label) VALUES (?, ?)",
                &[ScalarValue::Uuid(id), ScalarValue::Text(String::from("probe"))],
            )
            .unwrap();

        let stored: String = session
            .connection()
            .query_row("SELECT CAST(id AS VARCHAR) FROM devices", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(stored, id.to_string());
    }

    #[test]
    fn test_timestamp_binds_with_microsecond_precision() {
        let mut session = DuckDbSession::open_in_memory().unwrap();
        session
            .connection()
            .execute_batch("CREATE TABLE events (id BIGINT, occurred TIMESTAMP)")
            .unwrap();
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 8, 15, 30).unwrap();

        session
            .execute(
                "INSERT INTO events (id, occurred) VALUES (?, ?)",
                &[ScalarValue::Int(1), ScalarValue::Timestamp(at)],
            )
            .unwrap();

        let micros: i64 = session
            .connection()
            .query_row("SELECT epoch_us(occurred) FROM events", [], |row| row.get(0))
            .unwrap();
        assert_eq!(micros, at.timestamp_micros());
    }

    #[test]
    fn test_failed_execute_rolls_back_and_frees_the_session() {
        let mut session = DuckDbSession::open_in_memory().unwrap();
        session
            .connection()
            .execute_batch("CREATE TABLE t (id BIGINT PRIMARY KEY, label VARCHAR NOT NULL)")
            .unwrap();

        let err = session
            .execute(
                "INSERT INTO t (id, label) VALUES (?, ?)",
                &[ScalarValue::Int(1), ScalarValue::Null],
            )
            .unwrap_err();
        assert!(matches!(err, SessionError::Execute(_)));

        // The aborted transaction is gone; the corrected statement runs on
        // the same session.
        let affected = session
            .execute(
                "INSERT INTO t (id, label) VALUES (?, ?)",
                &[ScalarValue::Int(1), ScalarValue::Text(String::from("ok"))],
            )
            .unwrap();
        assert_eq!(affected, 1);
        session.commit().unwrap();

        let count: i64 = session
            .connection()
            .query_row("SELECT count(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_failed_execute_discards_earlier_uncommitted_work() {
        let mut session = DuckDbSession::open_in_memory().unwrap();
        session
            .connection()
            .execute_batch("CREATE TABLE t (id BIGINT PRIMARY KEY, label VARCHAR NOT NULL)")
            .unwrap();

        session
            .execute(
                "INSERT INTO t (id, label) VALUES (?, ?)",
                &[ScalarValue::Int(1), ScalarValue::Text(String::from("kept?"))],
            )
            .unwrap();
        session
            .execute(
                "INSERT INTO t (id, label) VALUES (?, ?)",
                &[ScalarValue::Int(2), ScalarValue::Null],
            )
            .unwrap_err();

        // The rollback takes the first insert with it.
        let count: i64 = session
            .connection()
            .query_row("SELECT count(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_commit_without_transaction_is_a_no_op() {
        let mut session = DuckDbSession::open_in_memory().unwrap();
        session.commit().unwrap();
        session.commit().unwrap();
    }

    #[test]
    fn test_uncommitted_work_is_abandoned_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("ledger.duckdb");

        let mut session = DuckDbSession::open(&store).unwrap();
        session
            .connection()
            .execute_batch("CREATE TABLE t (id BIGINT)")
            .unwrap();
        session
            .execute("INSERT INTO t (id) VALUES (?)", &[ScalarValue::Int(1)])
            .unwrap();
        drop(session);

        let reopened = DuckDbSession::open(&store).unwrap();
        let count: i64 = reopened
            .connection()
            .query_row("SELECT count(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_committed_work_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("ledger.duckdb");

        let mut session = DuckDbSession::open(&store).unwrap();
        session
            .connection()
            .execute_batch("CREATE TABLE t (id BIGINT)")
            .unwrap();
        session
            .execute("INSERT INTO t (id) VALUES (?)", &[ScalarValue::Int(1)])
            .unwrap();
        session.commit().unwrap();
        drop(session);

        let reopened = DuckDbSession::open(&store).unwrap();
        let count: i64 = reopened
            .connection()
            .query_row("SELECT count(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_open_turns_directory_into_store_file() {
        let dir = tempfile::tempdir().unwrap();
        let session = DuckDbSession::open(dir.path()).unwrap();
        drop(session);
        assert!(dir.path().join("store.duckdb").exists());
    }
}
