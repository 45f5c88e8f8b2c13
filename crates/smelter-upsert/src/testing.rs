//! Scripted sessions for unit tests.

use std::collections::VecDeque;

use smelter_core::{ScalarValue, Session, SessionError};

/// A session that records statements instead of running them.
///
/// Affected counts come from a script of queued results; unscripted
/// executions report zero rows.
pub(crate) struct RecordingSession {
    dialect: String,
    results: VecDeque<u64>,
    fail_execute: bool,
    /// Every executed statement with its bound parameters, in order.
    pub(crate) executed: Vec<(String, Vec<ScalarValue>)>,
    /// Number of commit calls.
    pub(crate) commits: usize,
}

impl RecordingSession {
    pub(crate) fn new(dialect: &str) -> Self {
        Self {
            dialect: String::from(dialect),
            results: VecDeque::new(),
            fail_execute: false,
            executed: Vec::new(),
            commits: 0,
        }
    }

    /// Queues the affected count the next unscripted execute will report.
    pub(crate) fn script_result(mut self, affected: u64) -> Self {
        self.results.push_back(affected);
        self
    }

    /// A session whose every execute fails.
    pub(crate) fn failing(dialect: &str) -> Self {
        let mut session = Self::new(dialect);
        session.fail_execute = true;
        session
    }
}

impl Session for RecordingSession {
    fn dialect(&self) -> &str {
        &self.dialect
    }

    fn execute(&mut self, sql: &str, params: &[ScalarValue]) -> Result<u64, SessionError> {
        if self.fail_execute {
            return Err(SessionError::Execute("scripted failure".into()));
        }
        self.executed.push((String::from(sql), params.to_vec()));
        Ok(self.results.pop_front().unwrap_or(0))
    }

    fn commit(&mut self) -> Result<(), SessionError> {
        self.commits += 1;
        Ok(())
    }
}
