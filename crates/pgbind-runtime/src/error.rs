//! Runtime error types.

use std::fmt;
use thiserror::Error;

/// Result alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Number of rows a single-row statement actually returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowCount {
    /// No row.
    Zero,
    /// More than one row.
    Many,
}

impl fmt::Display for RowCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowCount::Zero => write!(f, "no rows"),
            RowCount::Many => write!(f, "more than one row"),
        }
    }
}

/// Runtime errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Error reported by the driver or the server.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An enum label that the generated type does not know.
    #[error("unknown label '{label}' for enum {type_name}")]
    UnknownLabel {
        /// Catalog name of the enum.
        type_name: &'static str,
        /// Label received.
        label: String,
    },

    /// A single-row statement returned zero or several rows.
    #[error("statement {statement} expected exactly one row, got {count}")]
    RowCount {
        /// Statement name.
        statement: &'static str,
        /// What was returned instead.
        count: RowCount,
    },

    /// Rows passed to one call do not share the same column set.
    #[error("rows for {table} do not share the same columns")]
    InconsistentColumns {
        /// Qualified table name.
        table: String,
    },

    /// A row lacks a key column.
    #[error("row for {table} is missing key column {column}")]
    MissingKeyColumn {
        /// Qualified table name.
        table: String,
        /// Missing column.
        column: String,
    },

    /// A row's key value differs from the partition being synced.
    #[error("row for {table} has {column} outside the synced partition")]
    RowOutsidePartition {
        /// Qualified table name.
        table: String,
        /// Key column whose value differs.
        column: String,
    },

    /// Text that is not a valid literal for the target type.
    #[error("invalid {type_name} literal: {message}")]
    InvalidLiteral {
        /// Target type.
        type_name: &'static str,
        /// What went wrong.
        message: String,
    },

    /// An update with nothing to set.
    #[error("update of {table} sets no columns")]
    EmptyUpdate {
        /// Qualified table name.
        table: String,
    },

    /// A batch update without key columns to scope each row.
    #[error("batch update of {table} names no key columns")]
    NoKeyColumns {
        /// Qualified table name.
        table: String,
    },

    /// A batch update whose rows carry only key columns.
    #[error("batch update of {table} has no columns besides the key")]
    NoUpdatableColumns {
        /// Qualified table name.
        table: String,
    },

    /// A change lacks the row image its kind requires.
    #[error("{kind} change for {table} carries no row image")]
    MissingPayload {
        /// Qualified table name.
        table: String,
        /// Change kind.
        kind: &'static str,
    },

    /// A change payload lacks a column the event type needs.
    #[error("change payload for {table} is missing column {column}")]
    MissingPayloadColumn {
        /// Qualified table name.
        table: String,
        /// Missing column.
        column: String,
    },
}

impl Error {
    /// Create an invalid literal error.
    pub fn invalid_literal(type_name: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidLiteral {
            type_name,
            message: message.into(),
        }
    }

    /// Classify a database error by its SQLSTATE, if this is one.
    pub fn db_error_kind(&self) -> Option<DbErrorKind> {
        match self {
            Error::Database(err) => err
                .as_database_error()
                .map(|db| DbErrorKind::from_code(db.code().as_deref())),
            _ => None,
        }
    }
}

/// Integrity-violation category of a database error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    /// `23502 not_null_violation`
    NotNull,
    /// `23503 foreign_key_violation`
    ForeignKey,
    /// `23505 unique_violation`
    Unique,
    /// `23514 check_violation`
    Check,
    /// `23P01 exclusion_violation`
    Exclusion,
    /// `23001 restrict_violation`
    Restrict,
    /// Any other or missing code.
    Other,
}

impl DbErrorKind {
    /// Map a SQLSTATE code.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("23502") => DbErrorKind::NotNull,
            Some("23503") => DbErrorKind::ForeignKey,
            Some("23505") => DbErrorKind::Unique,
            Some("23514") => DbErrorKind::Check,
            Some("23P01") => DbErrorKind::Exclusion,
            Some("23001") => DbErrorKind::Restrict,
            _ => DbErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlstate_mapping() {
        assert_eq!(DbErrorKind::from_code(Some("23505")), DbErrorKind::Unique);
        assert_eq!(DbErrorKind::from_code(Some("23503")), DbErrorKind::ForeignKey);
        assert_eq!(DbErrorKind::from_code(Some("23P01")), DbErrorKind::Exclusion);
        assert_eq!(DbErrorKind::from_code(Some("42P01")), DbErrorKind::Other);
        assert_eq!(DbErrorKind::from_code(None), DbErrorKind::Other);
    }

    #[test]
    fn test_non_database_error_has_no_kind() {
        let err = Error::EmptyUpdate {
            table: "public.users".to_string(),
        };
        assert_eq!(err.db_error_kind(), None);
        assert_eq!(err.to_string(), "update of public.users sets no columns");
    }
}
