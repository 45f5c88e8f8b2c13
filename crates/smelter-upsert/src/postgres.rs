//! PostgreSQL upsert engine.

use crate::engine::UpsertEngine;

/// Bind ceiling of the PostgreSQL extended-query protocol.
const PG_MAX_BIND_PARAMS: usize = 65_535;

/// Upsert engine speaking PostgreSQL's conflict grammar with `$n`
/// placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresUpsertEngine;

impl PostgresUpsertEngine {
    /// Creates the engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl UpsertEngine for PostgresUpsertEngine {
    fn dialect(&self) -> &'static str {
        "postgresql"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn max_bind_params(&self) -> usize {
        PG_MAX_BIND_PARAMS
    }
}
