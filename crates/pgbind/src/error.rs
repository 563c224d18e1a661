//! Pipeline error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for the pipeline.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Model or configuration error.
    #[error(transparent)]
    Core(#[from] pgbind_core::Error),

    /// A configuration or spec file could not be read or written.
    #[error("io error at {}: {source}", path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`Config`](crate::Config).
    #[error("invalid configuration {}: {source}", path.display())]
    Toml {
        /// Configuration path.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: toml::de::Error,
    },

    /// Introspecting a database failed.
    #[error("database {database}: {source}")]
    Introspect {
        /// Configuration key.
        database: String,
        /// Introspection error.
        #[source]
        source: pgbind_introspect::Error,
    },

    /// Generating or syncing a database's bindings failed.
    #[error("database {database}: {source}")]
    Codegen {
        /// Configuration key.
        database: String,
        /// Code generation error.
        #[source]
        source: pgbind_codegen::Error,
    },

    /// Check mode found generated files that would change.
    #[error("generated bindings are out of date for: {}", databases.join(", "))]
    OutOfDate {
        /// Configuration keys of the stale databases.
        databases: Vec<String>,
    },
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
        match self {
            Error::Core(e) => e.is_configuration(),
            Error::Codegen { source, .. } => source.is_configuration(),
            Error::Introspect {
                source: pgbind_introspect::Error::Core(e),
                ..
            } => e.is_configuration(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_date_display() {
        let err = Error::OutOfDate {
            databases: vec!["main".to_string(), "audit".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "generated bindings are out of date for: main, audit"
        );
    }

    #[test]
    fn test_configuration_through_layers() {
        assert!(Error::configuration("x").is_configuration());
        let nested = Error::Introspect {
            database: "main".to_string(),
            source: pgbind_introspect::Error::Core(pgbind_core::Error::Configuration(
                "no url".to_string(),
            )),
        };
        assert!(nested.is_configuration());
        assert!(nested.to_string().starts_with("database main: "));
    }
}
