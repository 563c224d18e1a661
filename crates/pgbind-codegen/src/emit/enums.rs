use super::{inner_doc, lit, render_file};
use crate::error::Result;
use crate::layout::EntityPath;
use crate::naming::{ident, pascal_case, unique_names};
use crate::GeneratedFile;
use pgbind_core::EnumDef;
use proc_macro2::{Literal, TokenStream};
use quote::quote;

/// Emit a Rust enum for a catalog enum.
///
/// Values cross the wire as labels, so the server's sort order and any
/// later label additions do not affect the generated discriminants.
pub(crate) fn emit_enum(def: &EnumDef, entity: &EntityPath) -> Result<GeneratedFile> {
    let ty = ident(&entity.type_name);
    let type_name = lit(&def.name.to_string());
    let schema = lit(&def.name.schema);
    let name = lit(&def.name.name);
    let sql_name = lit(&def.name.to_sql());
    let array_name = lit(&format!("{}[]", def.name.to_sql()));
    let doc = inner_doc(&format!("Enum `{}`.", def.name));

    let variants: Vec<_> = unique_names(def.labels.iter().map(|l| pascal_case(l)))
        .iter()
        .map(|v| ident(v))
        .collect();
    let labels: Vec<_> = def.labels.iter().map(|l| lit(l)).collect();
    let label_docs: Vec<String> = def.labels.iter().map(|l| format!(" `{l}`")).collect();
    let count = Literal::usize_unsuffixed(def.labels.len());

    let tokens: TokenStream = quote! {
        #doc

        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum #ty {
            #(
                #[doc = #label_docs]
                #variants,
            )*
        }

        impl #ty {
            /// Qualified catalog name.
            pub const TYPE_NAME: &'static str = #type_name;

            /// Every variant, in catalog order.
            pub const ALL: [#ty; #count] = [#(#ty::#variants),*];

            /// Catalog label of this variant.
            pub fn label(&self) -> &'static str {
                match *self {
                    #(#ty::#variants => #labels,)*
                }
            }

            /// Variant for a catalog label.
            pub fn from_label(label: &str) -> ::std::result::Result<Self, ::pgbind_runtime::Error> {
                match label {
                    #(#labels => Ok(#ty::#variants),)*
                    _ => Err(::pgbind_runtime::Error::UnknownLabel {
                        type_name: Self::TYPE_NAME,
                        label: label.to_string(),
                    }),
                }
            }
        }

        impl ::std::fmt::Display for #ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl ::std::str::FromStr for #ty {
            type Err = ::pgbind_runtime::Error;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                Self::from_label(s)
            }
        }

        impl ::pgbind_runtime::TextCodec for #ty {
            fn encode_text(&self) -> ::std::string::String {
                self.label().to_string()
            }

            fn decode_text(text: &str) -> ::pgbind_runtime::Result<Self> {
                Self::from_label(text)
            }
        }

        impl ::pgbind_runtime::ToValue for #ty {
            fn to_value(&self) -> ::pgbind_runtime::Value {
                ::pgbind_runtime::Value::Text(self.label().to_string())
            }
        }

        impl ::sqlx::Type<::sqlx::Postgres> for #ty {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                ::sqlx::postgres::PgTypeInfo::with_name(#sql_name)
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                ::pgbind_runtime::pg::type_matches(ty, #schema, #name)
            }
        }

        impl ::sqlx::postgres::PgHasArrayType for #ty {
            fn array_type_info() -> ::sqlx::postgres::PgTypeInfo {
                ::sqlx::postgres::PgTypeInfo::with_name(#array_name)
            }

            fn array_compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                ::pgbind_runtime::pg::array_type_matches(ty, #schema, #name)
            }
        }

        impl<'q> ::sqlx::Encode<'q, ::sqlx::Postgres> for #ty {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <&str as ::sqlx::Encode<'q, ::sqlx::Postgres>>::encode_by_ref(&self.label(), buf)
            }
        }

        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for #ty {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::std::result::Result<Self, ::sqlx::error::BoxDynError> {
                let label = <&'r str as ::sqlx::Decode<'r, ::sqlx::Postgres>>::decode(value)?;
                Ok(Self::from_label(label)?)
            }
        }
    };

    render_file(entity.file(), tokens)
}
