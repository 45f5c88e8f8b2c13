//! Table descriptors: where a batch lands.
//!
//! A descriptor names the target table, its insertable columns in statement
//! order, and the primary-key subset the conflict clause targets. Schema
//! qualification is deliberately not part of the descriptor; the schema name
//! travels with each upsert request, so one descriptor can serve several
//! schemas.

use thiserror::Error;

/// Errors raised while building a [`TableDescriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// The descriptor declares no columns.
    #[error("Table '{table}' declares no columns")]
    NoColumns {
        /// The table being described.
        table: String,
    },

    /// The descriptor declares no primary-key columns.
    #[error("Table '{table}' declares no primary key columns")]
    NoPrimaryKey {
        /// The table being described.
        table: String,
    },

    /// A primary-key column is missing from the column list.
    #[error("Primary key column '{column}' is not a declared column of table '{table}'")]
    UnknownKeyColumn {
        /// The table being described.
        table: String,
        /// The offending primary-key column.
        column: String,
    },

    /// The same column was declared twice.
    #[error("Duplicate column '{column}' in descriptor for table '{table}'")]
    DuplicateColumn {
        /// The table being described.
        table: String,
        /// The column declared more than once.
        column: String,
    },
}

/// Describes the table a batch is upserted into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    name: String,
    columns: Vec<String>,
    primary_keys: Vec<String>,
}

impl TableDescriptor {
    /// Starts building a descriptor for `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> TableDescriptorBuilder {
        TableDescriptorBuilder {
            name: name.into(),
            columns: Vec::new(),
            primary_keys: Vec::new(),
        }
    }

    /// The unqualified table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All insertable columns, in statement order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The primary-key columns the conflict clause targets.
    #[must_use]
    pub fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }

    /// Columns that are not part of the primary key, in statement order.
    ///
    /// These are the columns an `ON CONFLICT ... DO UPDATE` rewrites.
    #[must_use]
    pub fn non_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|column| !self.primary_keys.contains(column))
            .map(String::as_str)
            .collect()
    }
}

/// Builder for [`TableDescriptor`]; `build` validates the declaration.
#[derive(Debug, Clone)]
pub struct TableDescriptorBuilder {
    name: String,
    columns: Vec<String>,
    primary_keys: Vec<String>,
}

impl TableDescriptorBuilder {
    /// Declares one insertable column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(name.into());
        self
    }

    /// Declares several insertable columns at once.
    #[must_use]
    pub fn columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declares one primary-key column; it must also be a declared column.
    #[must_use]
    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_keys.push(name.into());
        self
    }

    /// Validates the declaration and produces the descriptor.
    ///
    /// # Errors
    ///
    /// Returns a [`DescriptorError`] when the declaration has no columns, no
    /// primary key, a key column missing from the column list, or a
    /// duplicated name.
    pub fn build(self) -> Result<TableDescriptor, DescriptorError> {
        if self.columns.is_empty() {
            return Err(DescriptorError::NoColumns { table: self.name });
        }
        if self.primary_keys.is_empty() {
            return Err(DescriptorError::NoPrimaryKey { table: self.name });
        }
        if let Some(column) = first_duplicate(&self.columns) {
            return Err(DescriptorError::DuplicateColumn {
                table: self.name,
                column: String::from(column),
            });
        }
        if let Some(column) = first_duplicate(&self.primary_keys) {
            return Err(DescriptorError::DuplicateColumn {
                table: self.name,
                column: String::from(column),
            });
        }
        if let Some(column) = self
            .primary_keys
            .iter()
            .find(|key| !self.columns.contains(key))
        {
            return Err(DescriptorError::UnknownKeyColumn {
                table: self.name,
                column: column.clone(),
            });
        }
        Ok(TableDescriptor {
            name: self.name,
            columns: self.columns,
            primary_keys: self.primary_keys,
        })
    }
}

fn first_duplicate(names: &[String]) -> Option<&str> {
    names.iter().enumerate().find_map(|(index, name)| {
        if names[..index].contains(name) {
            Some(name.as_str())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts() -> TableDescriptor {
        TableDescriptor::builder("accounts")
            .column("id")
            .column("name")
            .column("balance")
            .primary_key("id")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_happy_path() {
        let table = accounts();
        assert_eq!(table.name(), "accounts");
        assert_eq!(table.columns(), ["id", "name", "balance"]);
        assert_eq!(table.primary_keys(), ["id"]);
    }

    #[test]
    fn test_non_key_columns_keep_statement_order() {
        assert_eq!(accounts().non_key_columns(), vec!["name", "balance"]);
    }

    #[test]
    fn test_composite_key_descriptor() {
        let table = TableDescriptor::builder("ledger_entries")
            .columns(["ledger_id", "seq", "amount"])
            .primary_key("ledger_id")
            .primary_key("seq")
            .build()
            .unwrap();
        assert_eq!(table.primary_keys(), ["ledger_id", "seq"]);
        assert_eq!(table.non_key_columns(), vec!["amount"]);
    }

    #[test]
    fn test_rejects_missing_columns() {
        let err = TableDescriptor::builder("empty").primary_key("id").build();
        assert_eq!(
            err,
            Err(DescriptorError::NoColumns {
                table: String::from("empty")
            })
        );
    }

    #[test]
    fn test_rejects_missing_primary_key() {
        let err = TableDescriptor::builder("keyless").column("id").build();
        assert_eq!(
            err,
            Err(DescriptorError::NoPrimaryKey {
                table: String::from("keyless")
            })
        );
    }

    #[test]
    fn test_rejects_unknown_key_column() {
        let err = TableDescriptor::builder("accounts")
            .column("id")
            .primary_key("uuid")
            .build();
        assert_eq!(
            err,
            Err(DescriptorError::UnknownKeyColumn {
                table: String::from("accounts"),
                column: String::from("uuid")
            })
        );
    }

    #[test]
    fn test_rejects_duplicate_column() {
        let err = TableDescriptor::builder("accounts")
            .column("id")
            .column("id")
            .primary_key("id")
            .build();
        assert_eq!(
            err,
            Err(DescriptorError::DuplicateColumn {
                table: String::from("accounts"),
                column: String::from("id")
            })
        );
    }
}
