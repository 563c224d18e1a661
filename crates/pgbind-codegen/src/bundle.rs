//! Single-file rendering of a generated tree.
//!
//! A build script can synthesize into `OUT_DIR` and pull the bindings in
//! with `include!`, which cannot follow `mod x;` declarations to sibling
//! files. [`bundle`] inlines every declared module instead:
//!
//! ```ignore
//! pub mod db {
//!     include!(concat!(env!("OUT_DIR"), "/db.rs"));
//! }
//! ```

use crate::emit::HEADER;
use crate::error::{Error, Result};
use crate::GeneratedFile;
use std::collections::BTreeMap;
use syn::ext::IdentExt;
use syn::Item;

/// Render `files` as one source file, starting from the root `mod.rs`.
///
/// Inner attributes of the root file are dropped, since `include!` rejects
/// them; the surrounding module carries its own docs.
pub fn bundle(files: &[GeneratedFile]) -> Result<String> {
    let files: BTreeMap<&str, &str> = files
        .iter()
        .map(|f| (f.path.as_str(), f.content.as_str()))
        .collect();
    let mut root = parse(&files, "mod.rs")?;
    root.attrs.clear();
    root.items = inline(&files, "", root.items)?;
    Ok(format!("{HEADER}\n\n{}", prettyplease::unparse(&root)))
}

fn parse(files: &BTreeMap<&str, &str>, path: &str) -> Result<syn::File> {
    let content = files
        .get(path)
        .ok_or_else(|| Error::MissingModule(path.to_string()))?;
    syn::parse_file(content).map_err(|e| Error::Syntax {
        path: path.to_string(),
        message: e.to_string(),
    })
}

fn inline(files: &BTreeMap<&str, &str>, dir: &str, items: Vec<Item>) -> Result<Vec<Item>> {
    items
        .into_iter()
        .map(|item| match item {
            Item::Mod(mut module) if module.content.is_none() => {
                let name = module.ident.unraw().to_string();
                let child = if dir.is_empty() {
                    name
                } else {
                    format!("{dir}/{name}")
                };
                let nested = format!("{child}/mod.rs");
                let path = if files.contains_key(nested.as_str()) {
                    nested
                } else {
                    format!("{child}.rs")
                };
                let file = parse(files, &path)?;
                module.attrs.extend(file.attrs);
                module.content = Some((Default::default(), inline(files, &child, file.items)?));
                module.semi = None;
                Ok(Item::Mod(module))
            }
            other => Ok(other),
        })
        .collect()
}
