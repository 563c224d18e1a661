//! pgbind Runtime - support library for generated bindings.
//!
//! Generated table modules describe their columns with [`Table`] and
//! [`Column`] constants and build statements through this crate:
//!
//! - [`Field`] carries three-state column values for inserts and updates
//! - [`query`] builds keyed `INSERT`/`UPDATE`/`SELECT`/`DELETE` statements
//! - [`sync()`] reconciles a table partition against a set of rows
//! - [`batch_update`] applies keyed updates through one statement template
//! - [`statement`] enforces `:one`/`:many`/`:exec` cardinality
//! - [`event`] decodes replication payloads into reduced entity types
//! - [`pg`] matches server-reported types against generated user types
//!
//! Nothing here begins, commits or retries transactions; every operation
//! runs on the executor it is given.

pub mod batch;
pub mod codec;
pub mod error;
pub mod event;
pub mod field;
pub mod literal;
pub mod pg;
pub mod query;
pub mod statement;
pub mod sync;
pub mod table;
pub mod value;

pub use batch::{batch_update, BatchUpdate};
pub use codec::TextCodec;
pub use error::{DbErrorKind, Error, Result, RowCount};
pub use event::{ChangeEvent, ChangeKind, EventEntity, Payload, RawChange};
pub use field::Field;
pub use query::SqlStatement;
pub use sync::{sync, SyncOutcome, SyncStatement};
pub use table::{quote_ident, Column, Row, Table};
pub use value::{ToValue, Value};
