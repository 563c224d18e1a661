//! Column definitions.

use super::types::ColumnType;
use serde::{Deserialize, Serialize};

/// A column of a table or a field of a composite type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// 1-based position in source order.
    pub position: u32,
    /// Column name.
    pub name: String,
    /// Resolved column type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Default expression, as SQL text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ColumnDef {
    /// Create a new NOT NULL column without default.
    pub fn new(position: u32, name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            position,
            name: name.into(),
            column_type,
            nullable: false,
            default: None,
        }
    }

    /// Mark the column as nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Set the default expression.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Check if this column has a server-side default.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PrimitiveType;

    #[test]
    fn test_column_builder() {
        let column = ColumnDef::new(1, "id", ColumnType::Primitive(PrimitiveType::Int4))
            .with_default("nextval('users_id_seq'::regclass)");

        assert_eq!(column.position, 1);
        assert!(!column.nullable);
        assert!(column.has_default());
    }

    #[test]
    fn test_default_omitted_from_json() {
        let column = ColumnDef::new(2, "bio", ColumnType::Primitive(PrimitiveType::Text)).nullable();
        let json = serde_json::to_string(&column).unwrap();
        assert!(!json.contains("default"));
        assert!(json.contains("\"type\""));
    }
}
