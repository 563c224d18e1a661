//! Code generation error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for code generation.
pub type Result<T> = std::result::Result<T, Error>;

/// Code generation errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Model or configuration error.
    #[error(transparent)]
    Core(#[from] pgbind_core::Error),

    /// Synthesized tokens did not form a valid Rust file.
    #[error("generated {path} is not valid Rust: {message}")]
    Syntax {
        /// Relative path of the file.
        path: String,
        /// Parser message.
        message: String,
    },

    /// A declared module has no generated file.
    #[error("module file {0} was not generated")]
    MissingModule(String),

    /// Reading or writing the output directory failed.
    #[error("io error at {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// IO error.
        #[source]
        source: std::io::Error,
    },

    /// The same path was synced twice with different content.
    #[error("{path} was synced twice with different content")]
    Conflict {
        /// Relative path.
        path: String,
    },

    /// A relative path escapes the output root.
    #[error("invalid output path '{0}': must be relative and stay inside the output directory")]
    InvalidPath(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Error::Core(pgbind_core::Error::Configuration(message.into()))
    }

    /// Whether this error is a configuration problem.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Core(e) if e.is_configuration())
    }
}
