//! Tabular batches of rows keyed by column name.
//!
//! A [`Batch`] is the unit a bulk upsert works on: an ordered list of
//! [`Row`]s, each mapping column names to [`ScalarValue`]s. Rows may be
//! heterogeneous; projecting a row against a column list fills absent cells
//! with `Null`. Validating and flattening upstream payloads into batches is
//! the producer's job, not this crate's.

use std::collections::BTreeMap;

use crate::value::{ScalarValue, ToScalar};

/// One row of a batch: a mapping from column name to value.
///
/// Cells are stored in a sorted map so iteration and `Debug` output are
/// deterministic; the insert order of the generated SQL comes from the
/// table descriptor, not from the row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: BTreeMap<String, ScalarValue>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style cell assignment.
    ///
    /// ```rust
    /// use smelter_core::{Row, ScalarValue};
    ///
    /// let row = Row::new().with("id", 7).with("name", "Ada");
    /// assert_eq!(row.get("id"), Some(&ScalarValue::Int(7)));
    /// ```
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl ToScalar) -> Self {
        self.set(column, value);
        self
    }

    /// Sets a cell, replacing any previous value for the column.
    pub fn set(&mut self, column: impl Into<String>, value: impl ToScalar) {
        self.cells.insert(column.into(), value.to_scalar());
    }

    /// Returns the value of a column, if present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&ScalarValue> {
        self.cells.get(column)
    }

    /// Returns `true` when the row has a cell for `column`.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    /// Iterates the row's column names in sorted order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// Materializes the row against a column list.
    ///
    /// Values come out in the order of `columns`; absent cells become
    /// [`ScalarValue::Null`].
    #[must_use]
    pub fn project(&self, columns: &[String]) -> Vec<ScalarValue> {
        columns
            .iter()
            .map(|column| self.cells.get(column).cloned().unwrap_or(ScalarValue::Null))
            .collect()
    }

    /// Number of cells in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` when the row has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// An ordered collection of rows destined for a single table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    rows: Vec<Row>,
}

impl Batch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row, keeping arrival order.
    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Number of rows in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when the batch has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates the rows in arrival order.
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// The rows as a slice, in arrival order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

impl From<Vec<Row>> for Batch {
    fn from(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

impl FromIterator<Row> for Batch {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_builder_and_lookup() {
        let row = Row::new().with("id", 1).with("name", "Alice");
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("id"), Some(&ScalarValue::Int(1)));
        assert_eq!(row.get("name"), Some(&ScalarValue::Text(String::from("Alice"))));
        assert_eq!(row.get("missing"), None);
        assert!(row.contains("name"));
    }

    #[test]
    fn test_row_set_replaces_existing_cell() {
        let mut row = Row::new().with("id", 1);
        row.set("id", 2);
        assert_eq!(row.get("id"), Some(&ScalarValue::Int(2)));
        assert_eq!(row.len(), 1);
    }

    #[test]
    fn test_project_follows_column_order() {
        let row = Row::new().with("b", 2).with("a", 1);
        let columns = vec![String::from("a"), String::from("b")];
        assert_eq!(
            row.project(&columns),
            vec![ScalarValue::Int(1), ScalarValue::Int(2)]
        );
    }

    #[test]
    fn test_project_fills_missing_cells_with_null() {
        let row = Row::new().with("id", 1);
        let columns = vec![String::from("id"), String::from("name")];
        assert_eq!(
            row.project(&columns),
            vec![ScalarValue::Int(1), ScalarValue::Null]
        );
    }

    #[test]
    fn test_batch_keeps_arrival_order() {
        let batch: Batch = vec![
            Row::new().with("id", 2),
            Row::new().with("id", 1),
        ]
        .into();
        let ids: Vec<_> = batch.iter().map(|row| row.get("id").cloned()).collect();
        assert_eq!(
            ids,
            vec![Some(ScalarValue::Int(2)), Some(ScalarValue::Int(1))]
        );
    }

    #[test]
    fn test_empty_batch() {
        let batch = Batch::new();
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }

    #[test]
    fn test_batch_from_iterator() {
        let batch: Batch = (0..3).map(|n| Row::new().with("id", n)).collect();
        assert_eq!(batch.len(), 3);
    }
}
