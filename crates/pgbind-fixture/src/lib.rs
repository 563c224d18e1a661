//! Bindings generated at build time for the schema in `schema.sql`.
//!
//! Nothing here is written by hand except this module wrapper: the build
//! script runs the code-generation phase and the tests drive the result
//! against a live database.

/// Generated bindings.
pub mod db {
    include!(concat!(env!("OUT_DIR"), "/db.rs"));
}

/// DDL creating the schema the bindings describe. Drops it first.
pub const SCHEMA_SQL: &str = include_str!("schema.sql");
