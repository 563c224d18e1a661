//! Table definitions.

use super::column::ColumnDef;
use super::constraint::{CheckConstraint, ForeignKey, PrimaryKey, UniqueConstraint};
use super::name::QualifiedName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An introspected table with its columns and constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    /// Qualified table name.
    pub name: QualifiedName,
    /// Columns ordered by position.
    pub columns: Vec<ColumnDef>,
    /// Primary key, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<PrimaryKey>,
    /// Outgoing foreign keys, sorted by constraint name.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
    /// Unique constraints, sorted by constraint name.
    #[serde(default)]
    pub unique_constraints: Vec<UniqueConstraint>,
    /// Check constraints, sorted by constraint name.
    #[serde(default)]
    pub check_constraints: Vec<CheckConstraint>,
}

impl TableDef {
    /// Create a table without columns or constraints.
    pub fn new(name: QualifiedName) -> Self {
        Self {
            name,
            columns: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
            unique_constraints: Vec::new(),
            check_constraints: Vec::new(),
        }
    }

    /// Add a column.
    pub fn with_column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Set the primary key.
    pub fn with_primary_key(mut self, primary_key: PrimaryKey) -> Self {
        self.primary_key = Some(primary_key);
        self
    }

    /// Add a foreign key.
    pub fn with_foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Add a unique constraint.
    pub fn with_unique(mut self, unique: UniqueConstraint) -> Self {
        self.unique_constraints.push(unique);
        self
    }

    /// Add a check constraint.
    pub fn with_check(mut self, check: CheckConstraint) -> Self {
        self.check_constraints.push(check);
        self
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Primary key column names, empty if there is no primary key.
    pub fn primary_key_columns(&self) -> &[String] {
        self.primary_key
            .as_ref()
            .map(|pk| pk.columns.as_slice())
            .unwrap_or(&[])
    }

    /// Tables referenced by foreign keys, deduplicated.
    pub fn foreign_key_targets(&self) -> BTreeSet<&QualifiedName> {
        self.foreign_keys.iter().map(|fk| &fk.target).collect()
    }

    /// Sort columns by position and constraints by name.
    pub fn normalize(&mut self) {
        self.columns.sort_by_key(|c| c.position);
        self.foreign_keys.sort_by(|a, b| a.name.cmp(&b.name));
        self.unique_constraints.sort_by(|a, b| a.name.cmp(&b.name));
        self.check_constraints.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Check that column positions run 1..=n without gaps.
    pub fn has_contiguous_positions(&self) -> bool {
        self.columns
            .iter()
            .enumerate()
            .all(|(i, c)| c.position as usize == i + 1)
    }
}
