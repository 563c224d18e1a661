//! Per-database configuration.
//!
//! One [`DatabaseConfig`] drives both phases for a single database: the
//! object filters and statement scripts scope introspection, the overrides
//! and event settings shape code generation.

use crate::catalog::QualifiedName;
use crate::error::{Error, Result};
use crate::filter::ObjectFilter;
use crate::resolver::TypeMappings;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Default Rust path of the generated root module.
pub const DEFAULT_MODULE: &str = "crate::db";

/// A custom mapping from a catalog type to a Rust type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeOverride {
    /// Path of the Rust type, e.g. `crate::Email`.
    pub rust: String,
}

/// Configuration of one database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection URL.
    pub url: Option<String>,
    /// Environment variable holding the connection URL.
    pub url_env: Option<String>,
    /// Output directory of the generated module tree.
    pub output: PathBuf,
    /// Rust path of the generated root module.
    pub module: Option<String>,
    /// Schemas whose tables are all included.
    pub schemas: BTreeSet<String>,
    /// Explicitly included tables.
    pub tables: BTreeSet<QualifiedName>,
    /// Temporary tables, by bare name.
    pub temp_tables: BTreeSet<String>,
    /// Explicitly requested enums.
    pub enums: BTreeSet<QualifiedName>,
    /// Explicitly requested composite types.
    pub composites: BTreeSet<QualifiedName>,
    /// Explicitly requested domains.
    pub domains: BTreeSet<QualifiedName>,
    /// Statement script paths.
    pub statements: Vec<PathBuf>,
    /// Tables that emit change events.
    pub events: BTreeSet<QualifiedName>,
    /// Custom catalog type mappings.
    pub types: TypeMappings,
    /// Per-column Rust type overrides, keyed by `schema.table.column`.
    pub columns: BTreeMap<String, String>,
    /// Rust types replacing generated enums.
    pub enum_overrides: BTreeMap<QualifiedName, String>,
    /// Rust types replacing generated domain wrappers.
    pub domain_overrides: BTreeMap<QualifiedName, String>,
    /// Event column lists per table; defaults to key columns.
    pub event_columns: BTreeMap<QualifiedName, Vec<String>>,
}

impl DatabaseConfig {
    /// Create an empty configuration writing to `output`.
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            ..Self::default()
        }
    }

    /// Set the connection URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Include every table of a schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schemas.insert(schema.into());
        self
    }

    /// Include a table.
    pub fn with_table(mut self, table: QualifiedName) -> Self {
        self.tables.insert(table);
        self
    }

    /// Mark a table as emitting change events.
    pub fn with_events(mut self, table: QualifiedName) -> Self {
        self.events.insert(table);
        self
    }

    /// Add a custom type mapping.
    pub fn with_type(mut self, name: QualifiedName, rust: impl Into<String>) -> Self {
        self.types.insert(name, TypeOverride { rust: rust.into() });
        self
    }

    /// Rust path of the generated root module.
    pub fn module_path(&self) -> &str {
        self.module.as_deref().unwrap_or(DEFAULT_MODULE)
    }

    /// Object filter selecting the configured tables.
    pub fn table_filter(&self) -> ObjectFilter {
        ObjectFilter::Schemas(self.schemas.clone())
            .or(ObjectFilter::Objects(self.tables.clone()))
            .or(ObjectFilter::TempTable(self.temp_tables.clone()))
    }

    /// Resolve the connection URL, preferring an explicit `url`.
    pub fn connection_url(&self) -> Result<String> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }
        match &self.url_env {
            Some(var) => std::env::var(var).map_err(|_| {
                Error::Configuration(format!("environment variable {var} is not set"))
            }),
            None => Err(Error::Configuration(
                "no connection configured: set url or url_env".to_string(),
            )),
        }
    }

    /// Custom type mappings.
    pub fn type_mappings(&self) -> &TypeMappings {
        &self.types
    }

    /// Rust type override for a column.
    pub fn column_override(&self, table: &QualifiedName, column: &str) -> Option<&str> {
        self.columns
            .get(&format!("{table}.{column}"))
            .map(String::as_str)
    }

    /// Check if a table emits change events.
    pub fn is_event_table(&self, table: &QualifiedName) -> bool {
        self.events.contains(table)
    }

    /// Check the configuration for inconsistencies that do not need a database.
    pub fn validate(&self) -> Result<()> {
        for key in self.columns.keys() {
            if key.splitn(3, '.').filter(|p| !p.is_empty()).count() != 3 {
                return Err(Error::Configuration(format!(
                    "column override '{key}' must be schema.table.column"
                )));
            }
        }
        for table in self.event_columns.keys() {
            if !self.events.contains(table) {
                return Err(Error::Configuration(format!(
                    "event columns configured for {table}, which does not emit events"
                )));
            }
        }
        Ok(())
    }
}
