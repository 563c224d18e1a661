//! pgbind Introspect - reads PostgreSQL catalogs into the spec model.
//!
//! [`PgCatalog`] wraps one connection and a private tokio runtime; all of
//! its methods block. [`read_spec`] runs the whole spec-generation phase
//! for one database:
//!
//! 1. the configured tables plus their foreign-key closure
//! 2. the statement scripts, described by the server
//! 3. every enum, composite and domain reached from columns, fields,
//!    domain bases and statement types, iterated to a fixpoint
//!
//! Explicitly requested names that do not exist are configuration errors.

pub mod catalog;
mod describe;
pub mod error;
pub mod queries;
pub mod reader;

pub use catalog::PgCatalog;
pub use error::{Error, Result};
pub use reader::{read_database, read_spec};
