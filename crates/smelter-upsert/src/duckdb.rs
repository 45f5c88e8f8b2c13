//! DuckDB upsert engine.

use crate::engine::UpsertEngine;

/// Upsert engine for DuckDB, which speaks the PostgreSQL conflict grammar
/// but binds parameters with positional `?` placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDbUpsertEngine;

impl DuckDbUpsertEngine {
    /// Creates the engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl UpsertEngine for DuckDbUpsertEngine {
    fn dialect(&self) -> &'static str {
        "duckdb"
    }

    fn placeholder(&self, _index: usize) -> String {
        String::from("?")
    }

    fn max_bind_params(&self) -> usize {
        // In-process API, no wire-protocol ceiling; the row cap alone
        // governs chunking.
        usize::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smelter_core::{Batch, ConflictPolicy, Row, TableDescriptor};

    use crate::engine::UpsertRequest;

    fn accounts() -> TableDescriptor {
        TableDescriptor::builder("accounts")
            .column("id")
            .column("name")
            .primary_key("id")
            .build()
            .unwrap()
    }

    #[test]
    fn test_render_do_nothing_with_positional_placeholders() {
        let table = accounts();
        let batch = Batch::new();
        let request = UpsertRequest::new(&table, &batch);
        let rows = [
            Row::new().with("id", 1).with("name", "Alice"),
            Row::new().with("id", 2).with("name", "Bob"),
        ];

        let (sql, params) =
            DuckDbUpsertEngine::new().render_statement(&request, &[&rows[0], &rows[1]]);

        assert_eq!(
            sql,
            "INSERT INTO \"accounts\" (\"id\", \"name\") \
             VALUES (?, ?), (?, ?) ON CONFLICT (\"id\") DO NOTHING"
        );
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_render_do_update() {
        let table = accounts();
        let batch = Batch::new();
        let request =
            UpsertRequest::new(&table, &batch).on_conflict(ConflictPolicy::Update);
        let row = Row::new().with("id", 1).with("name", "Alice");

        let (sql, _) = DuckDbUpsertEngine::new().render_statement(&request, &[&row]);

        assert_eq!(
            sql,
            "INSERT INTO \"accounts\" (\"id\", \"name\") \
             VALUES (?, ?) ON CONFLICT (\"id\") DO UPDATE SET \"name\" = excluded.\"name\""
        );
    }

    #[test]
    fn test_render_schema_qualifies_the_table() {
        let table = accounts();
        let batch = Batch::new();
        let request = UpsertRequest::new(&table, &batch).schema("analytics");
        let row = Row::new().with("id", 1);

        let (sql, _) = DuckDbUpsertEngine::new().render_statement(&request, &[&row]);

        assert!(sql.starts_with("INSERT INTO \"analytics\".\"accounts\" "));
    }
}
