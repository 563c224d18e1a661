//! Core error types.

use crate::catalog::QualifiedName;
use thiserror::Error;

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of catalog object, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Table,
    Enum,
    Composite,
    Domain,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectKind::Table => write!(f, "table"),
            ObjectKind::Enum => write!(f, "enum"),
            ObjectKind::Composite => write!(f, "composite type"),
            ObjectKind::Domain => write!(f, "domain"),
        }
    }
}

/// Core errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or incomplete configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Explicitly requested objects were not found in the catalog.
    #[error("{kind} not found: {}", names.join(", "))]
    MissingObjects {
        /// Kind of the missing objects.
        kind: ObjectKind,
        /// Requested names that were not found.
        names: Vec<String>,
    },

    /// A foreign key points at a table that is not part of the model.
    #[error("table {table} has a foreign key to {target}, which is missing from the model")]
    MissingForeignKeyTarget {
        /// Table owning the foreign key.
        table: QualifiedName,
        /// Referenced table.
        target: QualifiedName,
    },

    /// The same table appears twice in a model.
    #[error("duplicate table {0}")]
    DuplicateTable(QualifiedName),

    /// A statement declares the same variable twice.
    #[error("statement {statement} declares variable {variable} more than once")]
    DuplicateVariable {
        /// Statement name.
        statement: String,
        /// Variable name.
        variable: String,
    },

    /// Column positions of a table are not contiguous from 1.
    #[error("column positions of {0} are not contiguous")]
    ColumnPositions(QualifiedName),

    /// An empty filter was rendered to SQL.
    #[error("cannot render an empty object filter")]
    EmptyFilter,

    /// A name could not be parsed as `schema.name`.
    #[error("invalid qualified name '{0}': expected schema.name")]
    InvalidName(String),

    /// A catalog base type has no primitive counterpart and no custom mapping.
    #[error("unsupported type {0}: configure a custom type mapping for it")]
    UnsupportedType(QualifiedName),

    /// Catalog metadata is missing or inconsistent.
    #[error("introspection error: {0}")]
    Introspection(String),

    /// The persisted spec document has an unknown version.
    #[error("unsupported spec document version {found} (expected {expected})")]
    UnsupportedSpecVersion {
        /// Version found in the document.
        found: u32,
        /// Version this build understands.
        expected: u32,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is a configuration problem (fatal, never retried).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_)
                | Error::MissingObjects { .. }
                | Error::InvalidName(_)
                | Error::UnsupportedType(_)
        )
    }
}
