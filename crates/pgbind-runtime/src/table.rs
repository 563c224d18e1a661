//! Table and column descriptors, and dynamic rows.

use crate::value::{ToValue, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Quote an SQL identifier, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// A table, by schema and name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Table {
    pub schema: &'static str,
    pub name: &'static str,
}

impl Table {
    /// Create a table descriptor.
    pub const fn new(schema: &'static str, name: &'static str) -> Self {
        Self { schema, name }
    }

    /// Quoted qualified name, e.g. `"public"."users"`.
    pub fn to_sql(&self) -> String {
        format!("{}.{}", quote_ident(self.schema), quote_ident(self.name))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// A column with the SQL type its parameters are cast to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    /// Column name.
    pub name: &'static str,
    /// SQL type used in parameter casts, e.g. `int4` or `"public"."mood"[]`.
    pub sql_type: &'static str,
    /// Type the column is cast to when read, if it differs.
    pub read_as: Option<&'static str>,
}

impl Column {
    /// Create a column descriptor.
    pub const fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type,
            read_as: None,
        }
    }

    /// Cast the column to another type when reading it.
    pub const fn read_as(mut self, sql_type: &'static str) -> Self {
        self.read_as = Some(sql_type);
        self
    }

    /// Quoted column name.
    pub fn quoted(&self) -> String {
        quote_ident(self.name)
    }

    /// Select-list expression, e.g. `"email"::text AS "email"`.
    pub fn select_expr(&self) -> String {
        match self.read_as {
            Some(cast) => format!("{}::{} AS {}", self.quoted(), cast, self.quoted()),
            None => self.quoted(),
        }
    }

    /// Cast parameter reference, e.g. `$3::int4`.
    pub fn param(&self, index: usize) -> String {
        format!("${}::{}", index, self.sql_type)
    }
}

/// Render a select list.
pub fn select_list(columns: &[Column]) -> String {
    if columns.is_empty() {
        return "*".to_string();
    }
    columns
        .iter()
        .map(Column::select_expr)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A row of column values, ordered by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: BTreeMap<&'static str, (Column, Value)>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value.
    pub fn with<T: ToValue + ?Sized>(mut self, column: Column, value: &T) -> Self {
        self.set(column, value.to_value());
        self
    }

    /// Set a column value in place.
    pub fn set(&mut self, column: Column, value: Value) {
        self.values.insert(column.name, (column, value));
    }

    /// Get a value by column name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).map(|(_, v)| v)
    }

    /// Columns, ordered by name.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.values.values().map(|(c, _)| c)
    }

    /// Column names, ordered.
    pub fn column_names(&self) -> Vec<&'static str> {
        self.values.keys().copied().collect()
    }

    /// Column/value pairs, ordered by column name.
    pub fn iter(&self) -> impl Iterator<Item = (&Column, &Value)> {
        self.values.values().map(|(c, v)| (c, v))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: Column = Column::new("id", "int8");
    const EMAIL: Column = Column::new("email", "\"public\".\"email\"").read_as("text");

    #[test]
    fn test_table_sql() {
        let table = Table::new("public", "user\"s");
        assert_eq!(table.to_sql(), "\"public\".\"user\"\"s\"");
        assert_eq!(table.to_string(), "public.user\"s");
    }

    #[test]
    fn test_select_list() {
        assert_eq!(
            select_list(&[ID, EMAIL]),
            "\"id\", \"email\"::text AS \"email\""
        );
        assert_eq!(EMAIL.param(2), "$2::\"public\".\"email\"");
    }

    #[test]
    fn test_row_is_ordered_by_name() {
        let row = Row::new().with(ID, &1i64).with(EMAIL, "a@b.c");
        assert_eq!(row.column_names(), ["email", "id"]);
        assert_eq!(row.get("id"), Some(&Value::Int64(1)));
        assert_eq!(row.len(), 2);
    }
}
