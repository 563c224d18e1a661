//! Column type taxonomy.

use super::name::QualifiedName;
use serde::{Deserialize, Serialize};

/// Catalog base types with a fixed mapping.
///
/// Each variant corresponds 1:1 to a PostgreSQL base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Numeric,
    Text,
    Varchar,
    Bpchar,
    Name,
    Citext,
    Bytea,
    Uuid,
    Json,
    Jsonb,
    Date,
    Time,
    Timestamp,
    Timestamptz,
    Oid,
}

impl PrimitiveType {
    /// All primitive types.
    pub const ALL: [PrimitiveType; 21] = [
        PrimitiveType::Bool,
        PrimitiveType::Int2,
        PrimitiveType::Int4,
        PrimitiveType::Int8,
        PrimitiveType::Float4,
        PrimitiveType::Float8,
        PrimitiveType::Numeric,
        PrimitiveType::Text,
        PrimitiveType::Varchar,
        PrimitiveType::Bpchar,
        PrimitiveType::Name,
        PrimitiveType::Citext,
        PrimitiveType::Bytea,
        PrimitiveType::Uuid,
        PrimitiveType::Json,
        PrimitiveType::Jsonb,
        PrimitiveType::Date,
        PrimitiveType::Time,
        PrimitiveType::Timestamp,
        PrimitiveType::Timestamptz,
        PrimitiveType::Oid,
    ];

    /// The catalog (`pg_type.typname`) name of this type.
    pub fn catalog_name(&self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Int2 => "int2",
            PrimitiveType::Int4 => "int4",
            PrimitiveType::Int8 => "int8",
            PrimitiveType::Float4 => "float4",
            PrimitiveType::Float8 => "float8",
            PrimitiveType::Numeric => "numeric",
            PrimitiveType::Text => "text",
            PrimitiveType::Varchar => "varchar",
            PrimitiveType::Bpchar => "bpchar",
            PrimitiveType::Name => "name",
            PrimitiveType::Citext => "citext",
            PrimitiveType::Bytea => "bytea",
            PrimitiveType::Uuid => "uuid",
            PrimitiveType::Json => "json",
            PrimitiveType::Jsonb => "jsonb",
            PrimitiveType::Date => "date",
            PrimitiveType::Time => "time",
            PrimitiveType::Timestamp => "timestamp",
            PrimitiveType::Timestamptz => "timestamptz",
            PrimitiveType::Oid => "oid",
        }
    }

    /// Look up a primitive by catalog type.
    ///
    /// Built-in types must live in `pg_catalog`; `citext` is an extension
    /// type and is accepted from any schema.
    pub fn from_catalog(name: &QualifiedName) -> Option<Self> {
        let primitive = Self::ALL
            .iter()
            .copied()
            .find(|p| p.catalog_name() == name.name)?;
        if name.schema == "pg_catalog" || primitive == PrimitiveType::Citext {
            Some(primitive)
        } else {
            None
        }
    }

    /// Check if this type is textual.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            PrimitiveType::Text
                | PrimitiveType::Varchar
                | PrimitiveType::Bpchar
                | PrimitiveType::Name
                | PrimitiveType::Citext
        )
    }
}

/// An explicit user override of a catalog type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomType {
    /// Path of the Rust type used in generated code.
    pub rust: String,
    /// SQL type name used for casts.
    pub sql: String,
}

/// Resolved type of a column, variable or field.
///
/// The taxonomy is closed and its variants are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// A built-in base type.
    Primitive(PrimitiveType),
    /// A named user-defined type whose category is not resolved.
    Reference(QualifiedName),
    /// A domain over a base type.
    Domain {
        /// Domain name.
        name: QualifiedName,
        /// Resolved base type.
        base: Box<ColumnType>,
    },
    /// An enumeration type.
    Enum(QualifiedName),
    /// A composite (row) type.
    Composite(QualifiedName),
    /// A one-dimensional array.
    Array(Box<ColumnType>),
    /// An explicit user override; always wins.
    Custom(CustomType),
}

impl ColumnType {
    /// Create an array type.
    pub fn array(element: ColumnType) -> Self {
        ColumnType::Array(Box::new(element))
    }

    /// Create a domain type.
    pub fn domain(name: QualifiedName, base: ColumnType) -> Self {
        ColumnType::Domain {
            name,
            base: Box::new(base),
        }
    }

    /// SQL type name usable in a cast, e.g. `int4`, `"public"."mood"[]`.
    pub fn sql_type(&self) -> String {
        match self {
            ColumnType::Primitive(p) => p.catalog_name().to_string(),
            ColumnType::Reference(name)
            | ColumnType::Domain { name, .. }
            | ColumnType::Enum(name)
            | ColumnType::Composite(name) => name.to_sql(),
            ColumnType::Array(element) => format!("{}[]", element.sql_type()),
            ColumnType::Custom(custom) => custom.sql.clone(),
        }
    }

    /// Named user-defined type referenced by this type, if any.
    ///
    /// Arrays report their element's name; domains report their own name.
    pub fn named_type(&self) -> Option<&QualifiedName> {
        match self {
            ColumnType::Reference(name)
            | ColumnType::Domain { name, .. }
            | ColumnType::Enum(name)
            | ColumnType::Composite(name) => Some(name),
            ColumnType::Array(element) => element.named_type(),
            ColumnType::Primitive(_) | ColumnType::Custom(_) => None,
        }
    }

    /// Visit every type nested in this one, including itself.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ColumnType)) {
        visit(self);
        match self {
            ColumnType::Domain { base, .. } => base.walk(visit),
            ColumnType::Array(element) => element.walk(visit),
            _ => {}
        }
    }

    /// Check if this is an array type.
    pub fn is_array(&self) -> bool {
        matches!(self, ColumnType::Array(_))
    }
}
