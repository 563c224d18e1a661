//! The `pgbind.toml` configuration file.
//!
//! ```toml
//! spec_path = "pgbind.spec.json"
//!
//! [databases.main]
//! url_env = "DATABASE_URL"
//! output = "src/db"
//! schemas = ["public"]
//! statements = ["sql/queries.sql"]
//! events = ["public.users"]
//!
//! [databases.main.types]
//! "public.email" = { rust = "crate::Email" }
//! ```
//!
//! Relative paths are relative to the directory holding the file.

use crate::error::{Error, Result};
use pgbind_core::DatabaseConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file name.
pub const DEFAULT_CONFIG: &str = "pgbind.toml";

/// Default spec document name.
pub const DEFAULT_SPEC: &str = "pgbind.spec.json";

/// Configuration of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the spec document is persisted.
    pub spec_path: PathBuf,
    /// Databases keyed by name.
    pub databases: BTreeMap<String, DatabaseConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spec_path: PathBuf::from(DEFAULT_SPEC),
            databases: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Parse configuration text. Paths are left as written.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self> {
        let config: Config = toml::from_str(text).map_err(|source| Error::Toml {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file and resolve its relative paths.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut config = Self::from_toml(&text, path)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        debug!(
            path = %path.display(),
            databases = config.databases.len(),
            "loaded configuration"
        );
        Ok(config)
    }

    /// Add a database.
    pub fn with_database(mut self, key: impl Into<String>, database: DatabaseConfig) -> Self {
        self.databases.insert(key.into(), database);
        self
    }

    /// Make relative paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        self.spec_path = base.join(&self.spec_path);
        for database in self.databases.values_mut() {
            database.output = base.join(&database.output);
            for script in &mut database.statements {
                *script = base.join(&*script);
            }
        }
    }

    /// Check every database configuration.
    pub fn validate(&self) -> Result<()> {
        if self.databases.is_empty() {
            return Err(Error::configuration("no databases configured"));
        }
        for (key, database) in &self.databases {
            if database.output.as_os_str().is_empty() {
                return Err(Error::configuration(format!(
                    "database {key} has no output directory"
                )));
            }
            database.validate()?;
        }
        Ok(())
    }

    /// Databases to process, in key order. An empty `only` selects all.
    pub fn select(&self, only: &[String]) -> Result<Vec<(&str, &DatabaseConfig)>> {
        if let Some(unknown) = only.iter().find(|k| !self.databases.contains_key(*k)) {
            return Err(Error::configuration(format!("unknown database '{unknown}'")));
        }
        Ok(self
            .databases
            .iter()
            .filter(|(key, _)| only.is_empty() || only.contains(key))
            .map(|(key, database)| (key.as_str(), database))
            .collect())
    }
}
