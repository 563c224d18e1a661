//! pgbind Codegen - deterministic Rust bindings from a spec model.
//!
//! [`synthesize`] turns one database's [`DatabaseSpec`](pgbind_core::DatabaseSpec)
//! into a module tree of [`GeneratedFile`]s; [`OutputDir`] keeps an output
//! directory equal to that tree across regenerations. [`bundle`] renders the
//! tree as one file for build scripts.
//!
//! Tokens are built with `quote` and rendered with `prettyplease`, so the
//! same model and configuration always produce byte-identical files.

pub mod bundle;
mod emit;
pub mod error;
mod layout;
pub mod naming;
pub mod output;
mod synth;
mod types;

pub use bundle::bundle;
pub use emit::HEADER;
pub use error::{Error, Result};
pub use output::{write_tree, OutputDir, SyncMode, SyncReport, SyncSession};
pub use synth::synthesize;

/// A rendered source file, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// `/`-separated relative path.
    pub path: String,
    /// File content, including the `@generated` header.
    pub content: String,
}
