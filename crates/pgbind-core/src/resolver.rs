//! Catalog type resolution.
//!
//! Resolution is a pure function of the catalog description of a type and
//! the configured mappings: a custom mapping always wins, domains keep their
//! identity and resolve their base, arrays resolve their element, and base
//! types must belong to the primitive set.

use crate::catalog::{ColumnType, CustomType, PrimitiveType, QualifiedName};
use crate::config::TypeOverride;
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Custom type mappings keyed by catalog type name.
pub type TypeMappings = BTreeMap<QualifiedName, TypeOverride>;

/// Catalog category of a type (`pg_type.typtype` plus array detection).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Base type (`b`) that is not an array.
    Base,
    /// Domain (`d`).
    Domain,
    /// Enum (`e`).
    Enum,
    /// Composite (`c`).
    Composite,
    /// Array type (`typcategory = 'A'` with an element type).
    Array,
    /// Any other category: range, multirange, pseudo.
    Other,
}

impl TypeKind {
    /// Classify a catalog type from `typtype`, `typcategory` and whether
    /// `typelem` is set.
    pub fn classify(typtype: &str, typcategory: &str, has_element: bool) -> Self {
        match typtype {
            "d" => TypeKind::Domain,
            "e" => TypeKind::Enum,
            "c" => TypeKind::Composite,
            "b" if typcategory == "A" && has_element => TypeKind::Array,
            "b" => TypeKind::Base,
            _ => TypeKind::Other,
        }
    }
}

/// Catalog description of a type, with nested element and base types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogType {
    /// Qualified type name.
    pub name: QualifiedName,
    /// Category of the type.
    pub kind: TypeKind,
    /// Element type, for arrays.
    pub element: Option<Box<CatalogType>>,
    /// Base type, for domains.
    pub base: Option<Box<CatalogType>>,
}

impl CatalogType {
    /// Describe a type without element or base.
    pub fn new(name: QualifiedName, kind: TypeKind) -> Self {
        Self {
            name,
            kind,
            element: None,
            base: None,
        }
    }

    /// Describe a `pg_catalog` base type.
    pub fn builtin(name: &str) -> Self {
        Self::new(QualifiedName::new("pg_catalog", name), TypeKind::Base)
    }

    /// Set the element type.
    pub fn with_element(mut self, element: CatalogType) -> Self {
        self.element = Some(Box::new(element));
        self
    }

    /// Set the base type.
    pub fn with_base(mut self, base: CatalogType) -> Self {
        self.base = Some(Box::new(base));
        self
    }
}

/// Resolves catalog types into [`ColumnType`]s.
#[derive(Debug, Clone, Default)]
pub struct TypeResolver {
    mappings: TypeMappings,
}

impl TypeResolver {
    /// Create a resolver with the given custom mappings.
    pub fn new(mappings: TypeMappings) -> Self {
        Self { mappings }
    }

    /// Configured mappings.
    pub fn mappings(&self) -> &TypeMappings {
        &self.mappings
    }

    /// Resolve a catalog type.
    pub fn resolve(&self, ty: &CatalogType) -> Result<ColumnType> {
        if let Some(mapping) = self.mappings.get(&ty.name) {
            return Ok(ColumnType::Custom(CustomType {
                rust: mapping.rust.clone(),
                sql: ty.name.to_sql(),
            }));
        }

        match ty.kind {
            TypeKind::Domain => {
                let base = ty
                    .base
                    .as_deref()
                    .ok_or_else(|| missing_part(&ty.name, "base type"))?;
                Ok(ColumnType::domain(ty.name.clone(), self.resolve(base)?))
            }
            TypeKind::Array => {
                let element = ty
                    .element
                    .as_deref()
                    .ok_or_else(|| missing_part(&ty.name, "element type"))?;
                Ok(ColumnType::array(self.resolve(element)?))
            }
            TypeKind::Enum => Ok(ColumnType::Enum(ty.name.clone())),
            TypeKind::Composite => Ok(ColumnType::Composite(ty.name.clone())),
            TypeKind::Base => PrimitiveType::from_catalog(&ty.name)
                .map(ColumnType::Primitive)
                .ok_or_else(|| Error::UnsupportedType(ty.name.clone())),
            TypeKind::Other => Ok(ColumnType::Reference(ty.name.clone())),
        }
    }
}

fn missing_part(name: &QualifiedName, part: &str) -> Error {
    Error::Introspection(format!("catalog did not report the {part} of {name}"))
}
