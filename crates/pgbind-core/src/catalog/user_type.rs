//! User-defined types: enums, composites and domains.

use super::column::ColumnDef;
use super::constraint::CheckConstraint;
use super::name::QualifiedName;
use super::types::ColumnType;
use serde::{Deserialize, Serialize};

/// An enumeration type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDef {
    /// Qualified type name.
    pub name: QualifiedName,
    /// Labels in declaration order.
    pub labels: Vec<String>,
}

impl EnumDef {
    /// Create an enum definition.
    pub fn new(name: QualifiedName, labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name,
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }
}

/// A composite (row) type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeDef {
    /// Qualified type name.
    pub name: QualifiedName,
    /// Fields ordered by position.
    pub fields: Vec<ColumnDef>,
}

impl CompositeDef {
    /// Create a composite definition without fields.
    pub fn new(name: QualifiedName) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    /// Add a field.
    pub fn with_field(mut self, field: ColumnDef) -> Self {
        self.fields.push(field);
        self
    }
}

/// A domain over a base type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDef {
    /// Qualified domain name.
    pub name: QualifiedName,
    /// Resolved base type.
    pub base: ColumnType,
    /// Whether the domain accepts NULL.
    pub nullable: bool,
    /// Default expression, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Check constraints, sorted by name.
    #[serde(default)]
    pub checks: Vec<CheckConstraint>,
}

impl DomainDef {
    /// Create a nullable domain without default or checks.
    pub fn new(name: QualifiedName, base: ColumnType) -> Self {
        Self {
            name,
            base,
            nullable: true,
            default: None,
            checks: Vec::new(),
        }
    }

    /// Mark the domain NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Add a check constraint.
    pub fn with_check(mut self, check: CheckConstraint) -> Self {
        self.checks.push(check);
        self
    }
}
