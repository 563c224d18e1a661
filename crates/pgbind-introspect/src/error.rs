//! Introspection error types.

use pgbind_lang::ParseError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result alias for introspection.
pub type Result<T> = std::result::Result<T, Error>;

/// Introspection errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Connecting to the database failed.
    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// A catalog query failed.
    #[error("catalog query for {context} failed: {source}")]
    Query {
        /// What was being read.
        context: &'static str,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },

    /// Describing a statement failed.
    #[error("cannot describe statement {statement}: {source}")]
    Describe {
        /// Statement name.
        statement: String,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },

    /// A statement script could not be parsed.
    #[error("{}:{line}:{column}: {message}\n{report}", path.display())]
    Script {
        /// Script path.
        path: PathBuf,
        /// Line of the error.
        line: usize,
        /// Column of the error.
        column: usize,
        /// Parse error message.
        message: String,
        /// Offending source line and hint.
        report: String,
    },

    /// A statement script could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Script path.
        path: PathBuf,
        /// IO error.
        #[source]
        source: std::io::Error,
    },

    /// The private async runtime could not be started.
    #[error("cannot start runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// Model or configuration error.
    #[error(transparent)]
    Core(#[from] pgbind_core::Error),
}

impl Error {
    /// Create a script error with the offending source line.
    pub fn script(path: &Path, source: &str, err: &ParseError) -> Self {
        let (line, column) = err.location(source);
        Error::Script {
            path: path.to_path_buf(),
            line,
            column,
            message: err.message.clone(),
            report: err.format_with_source(source),
        }
    }

    /// Create a query error.
    pub fn query(context: &'static str, source: sqlx::Error) -> Self {
        Error::Query { context, source }
    }

    /// Convert into a core error, keeping core errors intact.
    pub fn into_core(self) -> pgbind_core::Error {
        match self {
            Error::Core(err) => err,
            other => pgbind_core::Error::Introspection(other.to_string()),
        }
    }

    /// Whether this error is a configuration problem.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Core(err) if err.is_configuration())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgbind_lang::Span;

    #[test]
    fn test_into_core_keeps_core_errors() {
        let err = Error::Core(pgbind_core::Error::EmptyFilter).into_core();
        assert!(matches!(err, pgbind_core::Error::EmptyFilter));

        let err = Error::query("tables", sqlx::Error::RowNotFound).into_core();
        assert!(matches!(err, pgbind_core::Error::Introspection(ref m) if m.contains("tables")));
    }

    #[test]
    fn test_script_error_display() {
        let source = "-- name: a :one\nSELECT 1;\n-- name: b :some\nSELECT 2;\n";
        let parse = ParseError::new("unknown cardinality", Span::new(37, 42))
            .with_hint("use :one, :many or :exec");
        let err = Error::script(Path::new("sql/users.sql"), source, &parse);

        let text = err.to_string();
        assert!(text.starts_with("sql/users.sql:3:12: unknown cardinality\n"));
        assert!(text.contains("  3| -- name: b :some"));
        assert!(text.contains("= hint: use :one, :many or :exec"));
    }
}
