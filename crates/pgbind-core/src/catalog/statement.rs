//! Named statement definitions.

use super::types::ColumnType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How many rows a statement is declared to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// Exactly one row.
    One,
    /// Zero or more rows, streamed.
    Many,
    /// No rows; the affected-row count is returned.
    Exec,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::One => write!(f, "one"),
            Cardinality::Many => write!(f, "many"),
            Cardinality::Exec => write!(f, "exec"),
        }
    }
}

/// A bound parameter of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Parameter name as written in the script.
    pub name: String,
    /// Resolved parameter type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Whether NULL may be passed.
    pub nullable: bool,
}

impl Variable {
    /// Create a required (non-NULL) variable.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
        }
    }

    /// Allow NULL to be passed.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// A result column of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultColumn {
    /// Column label.
    pub name: String,
    /// Resolved column type.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Whether the column may be NULL. Unknown nullability counts as nullable.
    pub nullable: bool,
}

impl ResultColumn {
    /// Create a result column.
    pub fn new(name: impl Into<String>, column_type: ColumnType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable,
        }
    }
}

/// A named SQL statement with typed inputs and outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementDef {
    /// Statement name.
    pub name: String,
    /// Declared cardinality.
    pub cardinality: Cardinality,
    /// Parameters in positional order.
    #[serde(default)]
    pub variables: Vec<Variable>,
    /// Result columns in select order.
    #[serde(default)]
    pub columns: Vec<ResultColumn>,
    /// SQL as written, with named parameters.
    pub sql: String,
    /// SQL as executed, with positional parameters.
    pub positional_sql: String,
}

impl StatementDef {
    /// Create a statement without variables or result columns.
    pub fn new(
        name: impl Into<String>,
        cardinality: Cardinality,
        sql: impl Into<String>,
        positional_sql: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cardinality,
            variables: Vec::new(),
            columns: Vec::new(),
            sql: sql.into(),
            positional_sql: positional_sql.into(),
        }
    }

    /// Add a variable.
    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    /// Add a result column.
    pub fn with_column(mut self, column: ResultColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// First variable name that appears more than once.
    pub fn duplicate_variable(&self) -> Option<&str> {
        self.variables.iter().enumerate().find_map(|(i, v)| {
            self.variables[..i]
                .iter()
                .any(|prev| prev.name == v.name)
                .then_some(v.name.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PrimitiveType;

    #[test]
    fn test_duplicate_variable() {
        let text = ColumnType::Primitive(PrimitiveType::Text);
        let stmt = StatementDef::new("by_email", Cardinality::One, "", "")
            .with_variable(Variable::new("email", text.clone()))
            .with_variable(Variable::new("name", text.clone()));
        assert_eq!(stmt.duplicate_variable(), None);

        let stmt = stmt.with_variable(Variable::new("email", text));
        assert_eq!(stmt.duplicate_variable(), Some("email"));
    }

    #[test]
    fn test_cardinality_serde() {
        let json = serde_json::to_string(&Cardinality::Many).unwrap();
        assert_eq!(json, "\"many\"");
    }
}
