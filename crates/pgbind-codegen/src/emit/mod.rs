//! Per-entity emitters and file rendering.

mod composite;
mod domain;
mod enums;
mod modules;
mod statement;
mod table;

pub(crate) use composite::emit_composite;
pub(crate) use domain::emit_domain;
pub(crate) use enums::emit_enum;
pub(crate) use modules::emit_module;
pub(crate) use statement::emit_statement;
pub(crate) use table::emit_table;

use crate::error::{Error, Result};
use crate::GeneratedFile;
use proc_macro2::TokenStream;
use quote::quote;

/// First line of every generated file.
pub const HEADER: &str = "// @generated by pgbind. Do not edit by hand.";

/// Render a token stream as a formatted file.
pub(crate) fn render_file(path: String, tokens: TokenStream) -> Result<GeneratedFile> {
    let file: syn::File = syn::parse2(tokens).map_err(|e| Error::Syntax {
        path: path.clone(),
        message: e.to_string(),
    })?;
    let content = format!("{HEADER}\n\n{}", prettyplease::unparse(&file));
    Ok(GeneratedFile { path, content })
}

/// Inner doc attributes, one per line of `text`.
pub(crate) fn inner_doc(text: &str) -> TokenStream {
    let lines = text.lines().map(|line| format!(" {line}").trim_end().to_string());
    quote! { #(#![doc = #lines])* }
}

/// Outer doc attribute.
pub(crate) fn doc(text: &str) -> TokenStream {
    let text = format!(" {text}");
    quote! { #[doc = #text] }
}

/// A string literal token.
pub(crate) fn lit(value: &str) -> syn::LitStr {
    syn::LitStr::new(value, proc_macro2::Span::call_site())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_file_has_header() {
        let doc = inner_doc("Example.");
        let file = render_file(
            "x.rs".to_string(),
            quote! {
                #doc
                pub const X: i32 = 1;
            },
        )
        .unwrap();
        assert!(file.content.starts_with(HEADER));
        assert!(file.content.contains("//! Example."));
        assert!(file.content.contains("pub const X: i32 = 1;"));
    }

    #[test]
    fn test_render_rejects_invalid_tokens() {
        let err = render_file("bad.rs".to_string(), quote!(pub fn)).unwrap_err();
        assert!(matches!(err, Error::Syntax { ref path, .. } if path == "bad.rs"));
    }
}
