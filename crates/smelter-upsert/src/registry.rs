//! Table-driven dialect registry.
//!
//! Maps lowercase dialect names to upsert engines. Plain data, no global
//! state: construct one, share it by reference or `Arc`, and register more
//! engines as dialects appear. Adding a dialect never means editing a
//! dispatch chain.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use smelter_core::Session;

use crate::duckdb::DuckDbUpsertEngine;
use crate::engine::UpsertEngine;
use crate::error::UpsertError;
use crate::postgres::PostgresUpsertEngine;

/// A shareable, thread-safe engine handle.
pub type SharedEngine = Arc<dyn UpsertEngine + Send + Sync>;

/// Registry of upsert engines, keyed by lowercase dialect name.
#[derive(Default, Clone)]
pub struct DialectRegistry {
    engines: HashMap<String, SharedEngine>,
}

impl DialectRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in PostgreSQL and DuckDB engines.
    #[must_use]
    pub fn with_default_engines() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PostgresUpsertEngine::new()));
        registry.register(Arc::new(DuckDbUpsertEngine::new()));
        registry
    }

    /// Registers `engine` under its dialect name, replacing any previous
    /// registration for that dialect.
    pub fn register(&mut self, engine: SharedEngine) {
        let dialect = engine.dialect().to_ascii_lowercase();
        debug!(dialect = %dialect, "Registered upsert engine");
        self.engines.insert(dialect, engine);
    }

    /// Resolves the engine for the session's dialect.
    ///
    /// # Errors
    ///
    /// Returns [`UpsertError::UnsupportedDialect`] naming the session's
    /// dialect when nothing is registered for it.
    pub fn engine_for(&self, session: &dyn Session) -> Result<SharedEngine, UpsertError> {
        self.engine_for_dialect(session.dialect())
    }

    /// Resolves an engine by dialect name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`UpsertError::UnsupportedDialect`] naming `dialect` when
    /// nothing is registered for it.
    pub fn engine_for_dialect(&self, dialect: &str) -> Result<SharedEngine, UpsertError> {
        self.engines
            .get(&dialect.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| UpsertError::UnsupportedDialect {
                dialect: String::from(dialect),
            })
    }

    /// Registered dialect names, sorted.
    #[must_use]
    pub fn dialects(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.engines.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectRegistry")
            .field("dialects", &self.dialects())
            .finish()
    }
}
