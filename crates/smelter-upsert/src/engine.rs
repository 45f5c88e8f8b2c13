//! The dialect-polymorphic upsert engine.
//!
//! [`UpsertEngine`] is a template: dialects supply their placeholder style
//! and bind ceiling, the trait's provided methods do everything else —
//! projecting rows, rendering `INSERT ... ON CONFLICT`, chunking to respect
//! the protocol, executing in the caller's session, and committing once per
//! batch.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use smelter_core::{Batch, ConflictPolicy, Row, ScalarValue, Session, TableDescriptor};

use crate::error::UpsertError;

/// Rows per rendered statement before the dialect's bind ceiling is
/// considered.
const DEFAULT_CHUNK_ROWS: usize = 1000;

/// One bulk-upsert invocation: what to write, where, and how conflicts are
/// handled.
#[derive(Debug, Clone)]
pub struct UpsertRequest<'a> {
    /// Descriptor of the target table.
    pub table: &'a TableDescriptor,
    /// Rows to upsert.
    pub batch: &'a Batch,
    /// Optional schema qualifying the table name.
    pub schema: Option<&'a str>,
    /// Conflict-target columns; `None` uses the descriptor's primary keys.
    pub key_columns: Option<&'a [String]>,
    /// What the statement does when a row collides with an existing key.
    pub policy: ConflictPolicy,
}

impl<'a> UpsertRequest<'a> {
    /// A request against `table` with no schema and the default policy.
    #[must_use]
    pub fn new(table: &'a TableDescriptor, batch: &'a Batch) -> Self {
        Self {
            table,
            batch,
            schema: None,
            key_columns: None,
            policy: ConflictPolicy::default(),
        }
    }

    /// Qualifies the table name with a schema.
    #[must_use]
    pub fn schema(mut self, schema: &'a str) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Sets the conflict policy.
    #[must_use]
    pub fn on_conflict(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Overrides the conflict-target columns.
    #[must_use]
    pub fn key_columns(mut self, columns: &'a [String]) -> Self {
        self.key_columns = Some(columns);
        self
    }

    /// The conflict-target columns after defaulting.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        self.key_columns
            .unwrap_or_else(|| self.table.primary_keys())
    }
}

/// Renders and executes multi-row upserts for one SQL dialect.
///
/// Implementations are stateless strategies; the registry hands out one per
/// dialect. Only the placeholder style, the bind ceiling, and the dialect
/// name vary — rendering and execution are shared. `Debug` is a supertrait
/// so shared engine handles stay printable in diagnostics.
pub trait UpsertEngine: fmt::Debug {
    /// Lowercase dialect name; the registry key.
    fn dialect(&self) -> &'static str;

    /// Placeholder for the 1-based parameter `index`.
    fn placeholder(&self, index: usize) -> String;

    /// Hard ceiling on bound parameters per statement.
    fn max_bind_params(&self) -> usize;

    /// Rows per statement before the bind ceiling is considered.
    fn chunk_rows(&self) -> usize {
        DEFAULT_CHUNK_ROWS
    }

    /// Identifier quote character.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Quotes one identifier.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        format!("{quote}{name}{quote}")
    }

    /// Quotes the table name, schema-qualified when a schema is given.
    fn qualified_table(&self, schema: Option<&str>, table: &str) -> String {
        match schema {
            Some(schema) => format!(
                "{}.{}",
                self.quote_identifier(schema),
                self.quote_identifier(table)
            ),
            None => self.quote_identifier(table),
        }
    }

    /// Renders one `INSERT ... ON CONFLICT` statement covering `rows`.
    ///
    /// Every declared column of the table appears in the column list; cells
    /// a row does not carry bind as NULL. When the conflict action is
    /// [`ConflictPolicy::Update`] but every column is part of the conflict
    /// target, the statement degrades to `DO NOTHING` since there is
    /// nothing left to set.
    fn render_statement(
        &self,
        request: &UpsertRequest<'_>,
        rows: &[&Row],
    ) -> (String, Vec<ScalarValue>) {
        let columns = request.table.columns();
        let keys = request.keys();

        let column_list = columns
            .iter()
            .map(|column| self.quote_identifier(column))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!(
            "INSERT INTO {} ({column_list}) VALUES ",
            self.qualified_table(request.schema, request.table.name())
        );

        let mut params = Vec::with_capacity(rows.len() * columns.len());
        for (row_index, row) in rows.iter().enumerate() {
            if row_index > 0 {
                sql.push_str(", ");
            }
            sql.push('(');
            for column_index in 0..columns.len() {
                if column_index > 0 {
                    sql.push_str(", ");
                }
                sql.push_str(&self.placeholder(row_index * columns.len() + column_index + 1));
            }
            sql.push(')');
            params.extend(row.project(columns));
        }

        let key_list = keys
            .iter()
            .map(|key| self.quote_identifier(key))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&format!(" ON CONFLICT ({key_list})"));

        let update_columns: Vec<&String> = columns
            .iter()
            .filter(|column| !keys.contains(column))
            .collect();
        if request.policy == ConflictPolicy::Update && !update_columns.is_empty() {
            let assignments = update_columns
                .iter()
                .map(|column| {
                    let quoted = self.quote_identifier(column);
                    format!("{quoted} = excluded.{quoted}")
                })
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(" DO UPDATE SET {assignments}"));
        } else {
            sql.push_str(" DO NOTHING");
        }

        (sql, params)
    }

    /// Upserts the whole batch inside the caller's session and commits.
    ///
    /// Chunks are sized so `rows * columns` stays within
    /// [`max_bind_params`](UpsertEngine::max_bind_params); every chunk
    /// executes in the same session, and the session commits once after the
    /// last chunk, so the batch lands atomically.
    ///
    /// The returned count is whatever the driver reports and may
    /// under-report the rows now present: `DO NOTHING` skips are never
    /// counted, and some drivers count matched rather than rewritten rows
    /// for `DO UPDATE`. Callers comparing against the batch length should
    /// allow for that slack rather than expect exact equality.
    ///
    /// # Errors
    ///
    /// Returns [`UpsertError::Execution`] when the session rejects a
    /// statement or the commit; conflicts the policy already absorbs are
    /// not errors.
    fn upsert(
        &self,
        request: &UpsertRequest<'_>,
        session: &mut dyn Session,
    ) -> Result<u64, UpsertError> {
        if request.batch.is_empty() {
            return Ok(0);
        }

        let rows = effective_rows(request);
        let per_chunk = rows_per_chunk(
            self.chunk_rows(),
            self.max_bind_params(),
            request.table.columns().len(),
        );
        debug!(
            dialect = self.dialect(),
            table = request.table.name(),
            rows = rows.len(),
            chunk_rows = per_chunk,
            policy = %request.policy,
            "Executing bulk upsert"
        );

        let mut affected = 0_u64;
        for chunk in rows.chunks(per_chunk) {
            let (sql, params) = self.render_statement(request, chunk);
            trace!(sql = %sql, params = params.len(), "Rendered upsert statement");
            affected += session.execute(&sql, &params)?;
        }
        session.commit()?;
        Ok(affected)
    }
}

/// Flattens the batch for execution.
///
/// Under [`ConflictPolicy::Update`], rows sharing a key tuple collapse to
/// the last occurrence: both supported dialects reject a multi-row
/// `DO UPDATE` that touches the same target row twice, and keeping the last
/// copy makes the outcome deterministic regardless of how the engine orders
/// rows. Under [`ConflictPolicy::Nothing`] rows pass through untouched —
/// `DO NOTHING` already keeps the first copy silently.
fn effective_rows<'a>(request: &UpsertRequest<'a>) -> Vec<&'a Row> {
    let rows = request.batch.rows();
    if request.policy != ConflictPolicy::Update {
        return rows.iter().collect();
    }

    let keys = request.keys();
    let mut retained: HashMap<String, usize> = HashMap::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        retained.insert(key_signature(row, keys), index);
    }
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| {
            (retained.get(&key_signature(row, keys)) == Some(&index)).then_some(row)
        })
        .collect()
}

/// Canonical string form of a row's key tuple; used only for in-memory
/// duplicate detection.
fn key_signature(row: &Row, keys: &[String]) -> String {
    format!("{:?}", row.project(keys))
}

fn rows_per_chunk(chunk_rows: usize, max_bind_params: usize, column_count: usize) -> usize {
    let by_params = max_bind_params / column_count.max(1);
    chunk_rows.min(by_params).max(1)
}
