use super::{inner_doc, render_file};
use crate::error::Result;
use crate::layout::EntityPath;
use crate::naming::ident;
use crate::types::TypeMap;
use crate::GeneratedFile;
use pgbind_core::DomainDef;
use quote::quote;

/// Emit a nominal wrapper for a domain.
///
/// The server describes domain-typed result columns by their base type,
/// so the wrapper is transparent to `sqlx`.
pub(crate) fn emit_domain(
    def: &DomainDef,
    entity: &EntityPath,
    types: &TypeMap<'_>,
) -> Result<GeneratedFile> {
    let ty = ident(&entity.type_name);
    let base = types.rust_type(&def.base)?;

    let mut text = format!("Domain `{}` over `{}`.", def.name, def.base.sql_type());
    for check in &def.checks {
        text.push_str(&format!("\n\n`{}`: `{}`", check.name, check.expression));
    }
    let doc = inner_doc(&text);

    let sqlx_attr = if def.base.is_array() {
        quote!(#[sqlx(transparent, no_pg_array)])
    } else {
        quote!(#[sqlx(transparent)])
    };

    let tokens = quote! {
        #doc

        #[derive(Debug, Clone, PartialEq, ::sqlx::Type)]
        #sqlx_attr
        pub struct #ty(pub #base);

        impl ::std::convert::From<#base> for #ty {
            fn from(value: #base) -> Self {
                Self(value)
            }
        }

        impl ::pgbind_runtime::ToValue for #ty {
            fn to_value(&self) -> ::pgbind_runtime::Value {
                ::pgbind_runtime::ToValue::to_value(&self.0)
            }
        }

        impl ::pgbind_runtime::TextCodec for #ty {
            fn encode_text(&self) -> ::std::string::String {
                ::pgbind_runtime::TextCodec::encode_text(&self.0)
            }

            fn decode_text(text: &str) -> ::pgbind_runtime::Result<Self> {
                <#base as ::pgbind_runtime::TextCodec>::decode_text(text).map(Self)
            }
        }
    };

    render_file(entity.file(), tokens)
}
