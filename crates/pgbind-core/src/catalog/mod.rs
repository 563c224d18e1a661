//! Spec model for pgbind.
//!
//! The spec model describes the introspected schema of one or more databases:
//! tables, enums, composite types, domains and named statements. It bridges
//! the introspection phase and the code generation phase and is persisted as
//! a versioned JSON document.

mod column;
mod constraint;
mod name;
mod spec;
mod statement;
mod table;
mod types;
mod user_type;

pub use column::ColumnDef;
pub use constraint::{CheckConstraint, ForeignKey, PrimaryKey, UniqueConstraint};
pub use name::QualifiedName;
pub use spec::{DatabaseSpec, SpecModel, SPEC_VERSION};
pub use statement::{Cardinality, ResultColumn, StatementDef, Variable};
pub use table::TableDef;
pub use types::{ColumnType, CustomType, PrimitiveType};
pub use user_type::{CompositeDef, DomainDef, EnumDef};
