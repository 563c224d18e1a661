//! pgbind Core - schema model, type resolution, and object filtering.
//!
//! This crate holds everything that is independent of a live database
//! connection: the serializable spec model, the closed column type taxonomy,
//! the type resolver, object filters, the foreign-key closure engine and the
//! per-database configuration shared by the introspection and code
//! generation phases.

pub mod catalog;
pub mod closure;
pub mod config;
pub mod error;
pub mod filter;
pub mod resolver;

pub use catalog::{
    Cardinality, CheckConstraint, ColumnDef, ColumnType, CompositeDef, CustomType,
    DatabaseSpec, DomainDef, EnumDef, ForeignKey, PrimaryKey, PrimitiveType, QualifiedName,
    ResultColumn, SpecModel, StatementDef, TableDef, UniqueConstraint, Variable, SPEC_VERSION,
};
pub use closure::{closure, TableSource};
pub use config::{DatabaseConfig, TypeOverride};
pub use error::{Error, ObjectKind, Result};
pub use filter::ObjectFilter;
pub use resolver::{CatalogType, TypeKind, TypeMappings, TypeResolver};
