use super::{inner_doc, render_file};
use crate::error::Result;
use crate::naming::ident;
use crate::GeneratedFile;

/// Emit a `mod.rs` declaring `children`, which are emitted in the order
/// given.
pub(crate) fn emit_module(dir: &str, doc: &str, children: &[&str]) -> Result<GeneratedFile> {
    let doc = inner_doc(doc);
    let children = children.iter().map(|c| ident(c));
    let path = if dir.is_empty() {
        "mod.rs".to_string()
    } else {
        format!("{dir}/mod.rs")
    };
    render_file(
        path,
        quote::quote! {
            #doc

            #(pub mod #children;)*
        },
    )
}
