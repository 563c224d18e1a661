use super::{inner_doc, lit, render_file};
use crate::error::Result;
use crate::layout::EntityPath;
use crate::naming::{ident, snake_case, unique_names};
use crate::types::TypeMap;
use crate::GeneratedFile;
use pgbind_core::CompositeDef;
use proc_macro2::{Literal, TokenStream};
use quote::quote;

/// Emit a struct for a composite type, with text and binary record codecs.
pub(crate) fn emit_composite(
    def: &CompositeDef,
    entity: &EntityPath,
    types: &TypeMap<'_>,
) -> Result<GeneratedFile> {
    let ty = ident(&entity.type_name);
    let type_name = lit(&def.name.to_string());
    let schema = lit(&def.name.schema);
    let name = lit(&def.name.name);
    let sql_name = lit(&def.name.to_sql());
    let array_name = lit(&format!("{}[]", def.name.to_sql()));
    let doc = inner_doc(&format!("Composite type `{}`.", def.name));

    let names: Vec<String> = unique_names(def.fields.iter().map(|f| snake_case(&f.name)));
    let fields: Vec<_> = names.iter().map(|n| ident(n)).collect();
    let count = Literal::usize_unsuffixed(def.fields.len());

    let mut declarations = Vec::new();
    let mut encodes = Vec::new();
    let mut decodes = Vec::new();
    let mut binary_decodes = Vec::new();
    for (field, ident) in def.fields.iter().zip(&fields) {
        let value_type = types.value_type(&field.column_type, field.nullable)?;
        let field_name = lit(&field.name);
        declarations.push(quote! { pub #ident: #value_type });
        binary_decodes.push(quote! { let #ident = decoder.try_decode::<#value_type>()?; });
        if field.nullable {
            encodes.push(quote! {
                self.#ident.as_ref().map(::pgbind_runtime::TextCodec::encode_text)
            });
            decodes.push(quote! {
                let #ident = ::pgbind_runtime::literal::decode_optional(#ident)?;
            });
        } else {
            encodes.push(quote! {
                ::std::option::Option::Some(::pgbind_runtime::TextCodec::encode_text(&self.#ident))
            });
            decodes.push(quote! {
                let #ident = ::pgbind_runtime::literal::decode_required(Self::TYPE_NAME, #field_name, #ident)?;
            });
        }
    }

    let tokens: TokenStream = quote! {
        #doc

        #[derive(Debug, Clone, PartialEq)]
        pub struct #ty {
            #(#declarations,)*
        }

        impl #ty {
            /// Qualified catalog name.
            pub const TYPE_NAME: &'static str = #type_name;
        }

        impl ::std::fmt::Display for #ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                let fields: [::std::option::Option<::std::string::String>; #count] = [#(#encodes),*];
                f.write_str(&::pgbind_runtime::literal::format_record(&fields))
            }
        }

        impl ::std::str::FromStr for #ty {
            type Err = ::pgbind_runtime::Error;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                let [#(#fields),*] = ::pgbind_runtime::literal::parse_record_exact::<#count>(Self::TYPE_NAME, s)?;
                #(#decodes)*
                Ok(Self { #(#fields),* })
            }
        }

        impl ::pgbind_runtime::TextCodec for #ty {
            fn encode_text(&self) -> ::std::string::String {
                self.to_string()
            }

            fn decode_text(text: &str) -> ::pgbind_runtime::Result<Self> {
                text.parse()
            }
        }

        impl ::pgbind_runtime::ToValue for #ty {
            fn to_value(&self) -> ::pgbind_runtime::Value {
                ::pgbind_runtime::Value::Text(self.to_string())
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
                let mut encoder = ::sqlx::postgres::types::PgRecordEncoder::new(buf);
                #(encoder.encode(&self.#fields)?;)*
                encoder.finish();
                Ok(::sqlx::encode::IsNull::No)
            }
        }

        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for #ty {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::std::result::Result<Self, ::sqlx::error::BoxDynError> {
                let mut decoder = ::sqlx::postgres::types::PgRecordDecoder::new(value)?;
                #(#binary_decodes)*
                Ok(Self { #(#fields),* })
            }
        }
    };

    render_file(entity.file(), tokens)
}
