//! Dynamically typed parameter values.

use crate::codec::TextCodec;
use crate::literal::format_array;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::types::Oid;
use sqlx::postgres::PgArguments;
use sqlx::Arguments;
use uuid::Uuid;

/// A value bound to a statement parameter.
///
/// Every parameter is rendered with an explicit cast to the column type, so
/// values of user-defined types (enums, composites, arrays of them) travel as
/// text and are converted by the server.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Numeric(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    Json(serde_json::Value),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    /// One-dimensional array, bound as an array literal.
    Array(Vec<Value>),
}

impl Value {
    /// Check if this is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text form of the value; `None` for NULL.
    pub fn to_text(&self) -> Option<String> {
        let text = match self {
            Value::Null => return None,
            Value::Bool(v) => v.encode_text(),
            Value::Int16(v) => v.encode_text(),
            Value::Int32(v) => v.encode_text(),
            Value::Int64(v) => v.encode_text(),
            Value::Float32(v) => v.encode_text(),
            Value::Float64(v) => v.encode_text(),
            Value::Numeric(v) => v.encode_text(),
            Value::Text(v) => v.clone(),
            Value::Bytes(v) => v.encode_text(),
            Value::Uuid(v) => v.encode_text(),
            Value::Json(v) => v.encode_text(),
            Value::Date(v) => v.encode_text(),
            Value::Time(v) => v.encode_text(),
            Value::Timestamp(v) => v.encode_text(),
            Value::TimestampTz(v) => v.encode_text(),
            Value::Array(elements) => {
                let elements: Vec<Option<String>> = elements.iter().map(Value::to_text).collect();
                format_array(&elements)
            }
        };
        Some(text)
    }

    /// Append this value to a set of arguments.
    pub fn add_to(&self, args: &mut PgArguments) -> Result<(), sqlx::Error> {
        let result = match self {
            Value::Null => args.add(Option::<String>::None),
            Value::Bool(v) => args.add(*v),
            Value::Int16(v) => args.add(*v),
            Value::Int32(v) => args.add(*v),
            Value::Int64(v) => args.add(*v),
            Value::Float32(v) => args.add(*v),
            Value::Float64(v) => args.add(*v),
            Value::Numeric(v) => args.add(*v),
            Value::Text(v) => args.add(v.clone()),
            Value::Bytes(v) => args.add(v.clone()),
            Value::Uuid(v) => args.add(*v),
            Value::Json(v) => args.add(sqlx::types::Json(v.clone())),
            Value::Date(v) => args.add(*v),
            Value::Time(v) => args.add(*v),
            Value::Timestamp(v) => args.add(*v),
            Value::TimestampTz(v) => args.add(*v),
            Value::Array(_) => args.add(self.to_text()),
        };
        result.map_err(sqlx::Error::Encode)
    }
}

/// Conversion into a [`Value`].
pub trait ToValue {
    /// Convert to a parameter value.
    fn to_value(&self) -> Value;
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(ToValue::to_value).collect())
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Bytes(self.clone())
    }
}

impl ToValue for Oid {
    fn to_value(&self) -> Value {
        Value::Int64(i64::from(self.0))
    }
}

macro_rules! copy_to_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::$variant(*self)
                }
            }
        )*
    };
}

copy_to_value! {
    bool => Bool,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    Decimal => Numeric,
    Uuid => Uuid,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => Timestamp,
    DateTime<Utc> => TimestampTz,
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value {
        Value::Json(self.clone())
    }
}
