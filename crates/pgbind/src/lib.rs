//! pgbind - typed Rust bindings for PostgreSQL schemas.
//!
//! A [`Config`] names one or more databases. The [`Pipeline`] introspects
//! them into a persisted spec document and generates a module tree of
//! bindings per database from that document:
//!
//! ```no_run
//! use pgbind::{Config, Pipeline};
//!
//! let config = Config::load("pgbind.toml")?;
//! let reports = Pipeline::new(config).run()?;
//! for (database, report) in &reports {
//!     println!("{database}: {} changes", report.changes());
//! }
//! # Ok::<(), pgbind::Error>(())
//! ```
//!
//! Generated code depends on `sqlx`, `futures` and `pgbind-runtime`.

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{Config, DEFAULT_CONFIG, DEFAULT_SPEC};
pub use error::{Error, Result};
pub use pgbind_codegen::{SyncMode, SyncReport};
pub use pgbind_core::{DatabaseConfig, SpecModel};
pub use pipeline::{load_spec, write_spec, Pipeline};
