//! Three-state column values for inserts and updates.

use crate::table::Column;
use crate::value::{ToValue, Value};

/// A column value that may be left out, set to NULL, or set to a value.
///
/// An omitted column is not mentioned in the statement, so the server
/// default applies on insert and the current value is kept on update.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    /// Leave the column out.
    Omitted,
    /// Set the column to NULL.
    Null,
    /// Set the column to a value.
    Value(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Omitted
    }
}

impl<T> Field<T> {
    /// Check if the column is left out.
    pub fn is_omitted(&self) -> bool {
        matches!(self, Field::Omitted)
    }

    /// Borrow the value, if one is set.
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: ToValue> Field<T> {
    /// Append `(column, value)` unless the field is omitted.
    pub fn push_to(&self, column: Column, out: &mut Vec<(Column, Value)>) {
        match self {
            Field::Omitted => {}
            Field::Null => out.push((column, Value::Null)),
            Field::Value(v) => out.push((column, v.to_value())),
        }
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Value(value)
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Value(v),
            None => Field::Null,
        }
    }
}
