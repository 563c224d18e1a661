//! Row change events decoded into reduced entity types.
//!
//! A replication listener delivers [`RawChange`]s whose row images hold
//! column values in text form. Tables tagged for events get a generated
//! type implementing [`EventEntity`] that keeps only the event columns.

use crate::codec::TextCodec;
use crate::error::{Error, Result};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Column name to text value; `None` is SQL NULL.
pub type Payload = BTreeMap<String, Option<String>>;

/// Kind of row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
    Truncate,
}

impl ChangeKind {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "insert",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
            ChangeKind::Truncate => "truncate",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change as delivered by the listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawChange {
    pub schema: String,
    pub table: String,
    pub kind: ChangeKind,
    /// Row image before the change (update, delete).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<Payload>,
    /// Row image after the change (insert, update).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<Payload>,
}

impl RawChange {
    /// Check if the change belongs to `table`.
    pub fn is_for(&self, table: &Table) -> bool {
        self.schema == table.schema && self.table == table.name
    }
}

/// A generated reduced entity that can be read from a change payload.
pub trait EventEntity: Sized {
    /// Table the entity belongs to.
    const TABLE: Table;

    /// Decode from a row image.
    fn from_payload(payload: &Payload) -> Result<Self>;
}

/// A decoded change.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent<T> {
    Insert(T),
    /// `old` is present only when the listener delivers the old row image.
    Update {
        old: Option<T>,
        new: T,
    },
    Delete(T),
    Truncate,
}

impl<T: EventEntity> ChangeEvent<T> {
    /// Decode a raw change. Returns `None` for changes to other tables.
    pub fn from_raw(raw: &RawChange) -> Result<Option<Self>> {
        if !raw.is_for(&T::TABLE) {
            return Ok(None);
        }
        let image = |payload: &Option<Payload>| -> Result<T> {
            match payload {
                Some(payload) => T::from_payload(payload),
                None => Err(Error::MissingPayload {
                    table: T::TABLE.to_string(),
                    kind: raw.kind.as_str(),
                }),
            }
        };
        let event = match raw.kind {
            ChangeKind::Insert => ChangeEvent::Insert(image(&raw.new)?),
            ChangeKind::Update => ChangeEvent::Update {
                old: raw.old.as_ref().map(T::from_payload).transpose()?,
                new: image(&raw.new)?,
            },
            ChangeKind::Delete => ChangeEvent::Delete(image(&raw.old)?),
            ChangeKind::Truncate => ChangeEvent::Truncate,
        };
        Ok(Some(event))
    }
}

/// Read a non-null column from a payload.
pub fn payload_required<T: TextCodec>(table: &Table, payload: &Payload, column: &str) -> Result<T> {
    match payload.get(column) {
        Some(Some(text)) => T::decode_text(text),
        Some(None) => Err(Error::invalid_literal(
            "payload",
            format!("column {column} of {table} is NULL"),
        )),
        None => Err(Error::MissingPayloadColumn {
            table: table.to_string(),
            column: column.to_string(),
        }),
    }
}

/// Read a nullable column from a payload. An absent column reads as NULL.
pub fn payload_optional<T: TextCodec>(payload: &Payload, column: &str) -> Result<Option<T>> {
    match payload.get(column) {
        Some(Some(text)) => T::decode_text(text).map(Some),
        _ => Ok(None),
    }
}
