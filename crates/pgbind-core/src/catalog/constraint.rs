//! Table constraint definitions.

use super::name::QualifiedName;
use serde::{Deserialize, Serialize};

/// Primary key of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    /// Constraint name.
    pub name: String,
    /// Key columns, in key order.
    pub columns: Vec<String>,
}

/// Foreign key from one table to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name.
    pub name: String,
    /// Referencing columns on the owning table.
    pub columns: Vec<String>,
    /// Referenced table.
    pub target: QualifiedName,
    /// Referenced columns, parallel to `columns`.
    pub target_columns: Vec<String>,
}

/// Uniqueness constraint (single or composite).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    /// Constraint name.
    pub name: String,
    /// Columns that are unique together.
    pub columns: Vec<String>,
}

/// Check constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConstraint {
    /// Constraint name.
    pub name: String,
    /// Constraint definition as reported by the catalog.
    pub expression: String,
}

impl PrimaryKey {
    /// Create a primary key.
    pub fn new(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl ForeignKey {
    /// Create a foreign key.
    pub fn new(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
        target: QualifiedName,
        target_columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            target,
            target_columns: target_columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl UniqueConstraint {
    /// Create a unique constraint.
    pub fn new(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl CheckConstraint {
    /// Create a check constraint.
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
        }
    }
}
