//! Rust types for catalog column types.

use crate::error::{Error, Result};
use crate::layout::{Category, Layout};
use pgbind_core::{ColumnType, DatabaseConfig, PrimitiveType, QualifiedName};
use proc_macro2::TokenStream;
use quote::quote;

/// Parse a configured Rust type path.
pub(crate) fn parse_type(rust: &str, context: &str) -> Result<TokenStream> {
    let ty: syn::Type = syn::parse_str(rust).map_err(|e| {
        Error::configuration(format!("{context}: '{rust}' is not a Rust type: {e}"))
    })?;
    Ok(quote!(#ty))
}

fn primitive(p: PrimitiveType) -> TokenStream {
    match p {
        PrimitiveType::Bool => quote!(bool),
        PrimitiveType::Int2 => quote!(i16),
        PrimitiveType::Int4 => quote!(i32),
        PrimitiveType::Int8 => quote!(i64),
        PrimitiveType::Float4 => quote!(f32),
        PrimitiveType::Float8 => quote!(f64),
        PrimitiveType::Numeric => quote!(::sqlx::types::Decimal),
        PrimitiveType::Text
        | PrimitiveType::Varchar
        | PrimitiveType::Bpchar
        | PrimitiveType::Name
        | PrimitiveType::Citext => quote!(::std::string::String),
        PrimitiveType::Bytea => quote!(::std::vec::Vec<u8>),
        PrimitiveType::Uuid => quote!(::sqlx::types::Uuid),
        PrimitiveType::Json | PrimitiveType::Jsonb => quote!(::sqlx::types::JsonValue),
        PrimitiveType::Date => quote!(::sqlx::types::chrono::NaiveDate),
        PrimitiveType::Time => quote!(::sqlx::types::chrono::NaiveTime),
        PrimitiveType::Timestamp => quote!(::sqlx::types::chrono::NaiveDateTime),
        PrimitiveType::Timestamptz => {
            quote!(::sqlx::types::chrono::DateTime<::sqlx::types::chrono::Utc>)
        }
        PrimitiveType::Oid => quote!(::sqlx::postgres::types::Oid),
    }
}

/// Type the server must cast a column to before `sqlx` can decode it.
pub(crate) fn read_cast(ty: &ColumnType) -> Option<String> {
    match ty {
        ColumnType::Primitive(PrimitiveType::Citext) => Some("text".to_string()),
        ColumnType::Domain { base, .. } => read_cast(base),
        ColumnType::Array(element) => read_cast(element).map(|cast| format!("{cast}[]")),
        _ => None,
    }
}

/// Maps column types to Rust types within one layout.
pub(crate) struct TypeMap<'a> {
    layout: &'a Layout,
    config: &'a DatabaseConfig,
}

impl<'a> TypeMap<'a> {
    pub(crate) fn new(layout: &'a Layout, config: &'a DatabaseConfig) -> Self {
        Self { layout, config }
    }

    /// Rust type of a non-null value of `ty`.
    pub(crate) fn rust_type(&self, ty: &ColumnType) -> Result<TokenStream> {
        match ty {
            ColumnType::Primitive(p) => Ok(primitive(*p)),
            ColumnType::Custom(custom) => parse_type(&custom.rust, "custom type mapping"),
            ColumnType::Array(element) => {
                let element = self.rust_type(element)?;
                Ok(quote!(::std::vec::Vec<#element>))
            }
            ColumnType::Enum(name) => self.enum_type(name),
            ColumnType::Composite(name) => self.generated(Category::Composites, name),
            ColumnType::Domain { name, .. } => self.domain_type(name),
            ColumnType::Reference(name) => self.reference(name),
        }
    }

    /// Rust type of a column value, `Option` when nullable.
    pub(crate) fn value_type(&self, ty: &ColumnType, nullable: bool) -> Result<TokenStream> {
        let inner = self.rust_type(ty)?;
        Ok(optional(inner, nullable))
    }

    fn enum_type(&self, name: &QualifiedName) -> Result<TokenStream> {
        match self.config.enum_overrides.get(name) {
            Some(rust) => parse_type(rust, &format!("override of enum {name}")),
            None => self.generated(Category::Enums, name),
        }
    }

    fn domain_type(&self, name: &QualifiedName) -> Result<TokenStream> {
        if let Some(rust) = self.config.domain_overrides.get(name) {
            return parse_type(rust, &format!("override of domain {name}"));
        }
        if let Some(mapping) = self.config.types.get(name) {
            return parse_type(&mapping.rust, &format!("type mapping of {name}"));
        }
        self.generated(Category::Domains, name)
    }

    fn generated(&self, category: Category, name: &QualifiedName) -> Result<TokenStream> {
        self.layout
            .entity(category, name)
            .map(|entity| self.layout.type_path(entity))
            .ok_or_else(|| {
                Error::configuration(format!(
                    "type {name} is used but missing from the {}",
                    category.dir()
                ))
            })
    }

    /// A catalog type introspection could not classify, looked up among
    /// the model's own types.
    fn reference(&self, name: &QualifiedName) -> Result<TokenStream> {
        if self.config.enum_overrides.contains_key(name)
            || self.layout.entity(Category::Enums, name).is_some()
        {
            return self.enum_type(name);
        }
        if self.layout.entity(Category::Composites, name).is_some() {
            return self.generated(Category::Composites, name);
        }
        if self.config.domain_overrides.contains_key(name)
            || self.config.types.contains_key(name)
            || self.layout.entity(Category::Domains, name).is_some()
        {
            return self.domain_type(name);
        }
        Err(Error::configuration(format!(
            "type {name} is not supported: configure a custom type mapping for it"
        )))
    }
}

/// Wrap in `Option` when nullable.
pub(crate) fn optional(inner: TokenStream, nullable: bool) -> TokenStream {
    if nullable {
        quote!(::std::option::Option<#inner>)
    } else {
        inner
    }
}

/// Borrowed parameter type for a value of `ty`: `&str` for text, slices for
/// bytes and arrays, references otherwise.
pub(crate) fn borrowed(
    map: &TypeMap<'_>,
    ty: &ColumnType,
    lifetime: Option<&syn::Lifetime>,
) -> Result<TokenStream> {
    let lt = lifetime.map(|lt| quote!(#lt));
    Ok(match ty {
        ColumnType::Primitive(p) if p.is_text() => quote!(&#lt str),
        ColumnType::Primitive(PrimitiveType::Bytea) => quote!(&#lt [u8]),
        ColumnType::Array(element) => {
            let element = map.rust_type(element)?;
            quote!(&#lt [#element])
        }
        other => {
            let owned = map.rust_type(other)?;
            quote!(&#lt #owned)
        }
    })
}
