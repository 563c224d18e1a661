//! Text encoding of column values.
//!
//! Composite fields, array elements and change payloads travel as text in
//! the server's output format. [`TextCodec`] converts between that text and
//! Rust values for every primitive mapping; generated enums and composites
//! implement it too.

use crate::error::{Error, Result};
use crate::literal::{format_array, parse_array};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::types::Oid;
use std::str::FromStr;
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Conversion to and from the server's text representation.
pub trait TextCodec: Sized {
    /// Encode to text.
    fn encode_text(&self) -> String;

    /// Decode from text.
    fn decode_text(text: &str) -> Result<Self>;
}

fn parse<T: FromStr>(type_name: &'static str, text: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    text.trim()
        .parse()
        .map_err(|e: T::Err| Error::invalid_literal(type_name, format!("{text:?}: {e}")))
}

impl TextCodec for bool {
    fn encode_text(&self) -> String {
        if *self { "t" } else { "f" }.to_string()
    }

    fn decode_text(text: &str) -> Result<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "t" | "true" | "y" | "yes" | "on" | "1" => Ok(true),
            "f" | "false" | "n" | "no" | "off" | "0" => Ok(false),
            _ => Err(Error::invalid_literal("bool", format!("{text:?}"))),
        }
    }
}

macro_rules! display_codec {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl TextCodec for $ty {
                fn encode_text(&self) -> String {
                    self.to_string()
                }

                fn decode_text(text: &str) -> Result<Self> {
                    parse($name, text)
                }
            }
        )*
    };
}

display_codec! {
    i16 => "int2",
    i32 => "int4",
    i64 => "int8",
    Decimal => "numeric",
    Uuid => "uuid",
}

macro_rules! float_codec {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl TextCodec for $ty {
                fn encode_text(&self) -> String {
                    if self.is_nan() {
                        "NaN".to_string()
                    } else if self.is_infinite() {
                        if *self > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
                    } else {
                        self.to_string()
                    }
                }

                fn decode_text(text: &str) -> Result<Self> {
                    match text.trim() {
                        "NaN" => Ok(<$ty>::NAN),
                        "Infinity" => Ok(<$ty>::INFINITY),
                        "-Infinity" => Ok(<$ty>::NEG_INFINITY),
                        other => parse($name, other),
                    }
                }
            }
        )*
    };
}

float_codec! {
    f32 => "float4",
    f64 => "float8",
}

impl TextCodec for String {
    fn encode_text(&self) -> String {
        self.clone()
    }

    fn decode_text(text: &str) -> Result<Self> {
        Ok(text.to_string())
    }
}

impl TextCodec for Vec<u8> {
    fn encode_text(&self) -> String {
        format!("\\x{}", hex::encode(self))
    }

    fn decode_text(text: &str) -> Result<Self> {
        let digits = text
            .strip_prefix("\\x")
            .ok_or_else(|| Error::invalid_literal("bytea", "expected hex format"))?;
        hex::decode(digits).map_err(|e| Error::invalid_literal("bytea", e.to_string()))
    }
}

impl TextCodec for serde_json::Value {
    fn encode_text(&self) -> String {
        self.to_string()
    }

    fn decode_text(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::invalid_literal("json", e.to_string()))
    }
}

impl TextCodec for NaiveDate {
    fn encode_text(&self) -> String {
        self.format(DATE_FORMAT).to_string()
    }

    fn decode_text(text: &str) -> Result<Self> {
        NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
            .map_err(|e| Error::invalid_literal("date", e.to_string()))
    }
}

impl TextCodec for NaiveTime {
    fn encode_text(&self) -> String {
        self.format(TIME_FORMAT).to_string()
    }

    fn decode_text(text: &str) -> Result<Self> {
        NaiveTime::parse_from_str(text.trim(), TIME_FORMAT)
            .map_err(|e| Error::invalid_literal("time", e.to_string()))
    }
}

impl TextCodec for NaiveDateTime {
    fn encode_text(&self) -> String {
        self.format(TIMESTAMP_FORMAT).to_string()
    }

    fn decode_text(text: &str) -> Result<Self> {
        NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
            .map_err(|e| Error::invalid_literal("timestamp", e.to_string()))
    }
}

impl TextCodec for DateTime<Utc> {
    fn encode_text(&self) -> String {
        format!("{}+00", self.format(TIMESTAMP_FORMAT))
    }

    fn decode_text(text: &str) -> Result<Self> {
        DateTime::parse_from_str(text.trim(), "%Y-%m-%d %H:%M:%S%.f%#z")
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::invalid_literal("timestamptz", e.to_string()))
    }
}

impl TextCodec for Oid {
    fn encode_text(&self) -> String {
        self.0.to_string()
    }

    fn decode_text(text: &str) -> Result<Self> {
        parse::<u32>("oid", text).map(Oid)
    }
}

impl<T: TextCodec> TextCodec for Vec<T> {
    fn encode_text(&self) -> String {
        let elements: Vec<Option<String>> = self.iter().map(|e| Some(e.encode_text())).collect();
        format_array(&elements)
    }

    fn decode_text(text: &str) -> Result<Self> {
        parse_array(text)?
            .into_iter()
            .map(|element| match element {
                Some(text) => T::decode_text(&text),
                None => Err(Error::invalid_literal("array", "unexpected NULL element")),
            })
            .collect()
    }
}

impl<T: TextCodec> TextCodec for Vec<Option<T>> {
    fn encode_text(&self) -> String {
        let elements: Vec<Option<String>> = self
            .iter()
            .map(|e| e.as_ref().map(TextCodec::encode_text))
            .collect();
        format_array(&elements)
    }

    fn decode_text(text: &str) -> Result<Self> {
        parse_array(text)?
            .into_iter()
            .map(|element| element.map(|text| T::decode_text(&text)).transpose())
            .collect()
    }
}
