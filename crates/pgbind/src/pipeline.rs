//! The two-phase pipeline: spec generation, then code generation.
//!
//! The spec phase needs live connections and persists a [`SpecModel`]
//! document. The code phase reads only that document, so bindings can be
//! regenerated without a database.

use crate::config::Config;
use crate::error::{Error, Result};
use pgbind_codegen::{synthesize, write_tree, SyncMode, SyncReport};
use pgbind_core::SpecModel;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::info;

/// Read a persisted spec document.
pub fn load_spec(path: &Path) -> Result<SpecModel> {
    let json = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(SpecModel::from_json(&json)?)
}

/// Persist a spec document. Returns false when the file already matched.
pub fn write_spec(path: &Path, model: &SpecModel) -> Result<bool> {
    let json = model.to_json()?;
    if fs::read_to_string(path).is_ok_and(|existing| existing == json) {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(path, json).map_err(|e| Error::io(path, e))?;
    Ok(true)
}

/// Runs the pipeline phases for a configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
    only: Vec<String>,
    mode: SyncMode,
}

impl Pipeline {
    /// Pipeline over every configured database, writing output.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            only: Vec::new(),
            mode: SyncMode::Write,
        }
    }

    /// Restrict the run to these database keys.
    pub fn with_databases(mut self, keys: Vec<String>) -> Self {
        self.only = keys;
        self
    }

    /// Set write or check mode.
    pub fn with_mode(mut self, mode: SyncMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Introspect the selected databases, one after another in key order.
    ///
    /// The first failure stops the run; later databases are not read.
    pub fn generate_spec(&self) -> Result<SpecModel> {
        let mut model = SpecModel::new();
        for (key, database) in self.config.select(&self.only)? {
            info!(database = key, "reading database");
            let spec = pgbind_introspect::read_database(database).map_err(|source| {
                Error::Introspect {
                    database: key.to_string(),
                    source,
                }
            })?;
            info!(
                database = key,
                tables = spec.tables.len(),
                statements = spec.statements.len(),
                "read database"
            );
            model.databases.insert(key.to_string(), spec);
        }
        Ok(model)
    }

    /// Run the spec phase and persist the document.
    ///
    /// A restricted run replaces only the selected databases of an existing
    /// document. In check mode nothing is written.
    pub fn spec(&self) -> Result<SpecModel> {
        let fresh = self.generate_spec()?;
        let path = &self.config.spec_path;
        let model = if self.only.is_empty() || !path.exists() {
            fresh
        } else {
            let mut model = load_spec(path)?;
            model.databases.extend(fresh.databases);
            model
        };
        if self.mode == SyncMode::Write {
            let written = write_spec(path, &model)?;
            info!(path = %path.display(), written, "spec phase complete");
        }
        Ok(model)
    }

    /// Generate and sync bindings for the selected databases from `model`.
    ///
    /// The configured databases and the document must name the same keys.
    pub fn generate_code(&self, model: &SpecModel) -> Result<BTreeMap<String, SyncReport>> {
        let configured: BTreeSet<&str> = self.config.databases.keys().map(String::as_str).collect();
        let persisted: BTreeSet<&str> = model.databases.keys().map(String::as_str).collect();
        if configured != persisted {
            return Err(Error::configuration(format!(
                "configured databases ({}) do not match the spec document ({})",
                join(&configured),
                join(&persisted)
            )));
        }

        let mut reports = BTreeMap::new();
        for (key, database) in self.config.select(&self.only)? {
            let spec = &model.databases[key];
            let codegen = |source| Error::Codegen {
                database: key.to_string(),
                source,
            };
            let files = synthesize(spec, database).map_err(codegen)?;
            let report = write_tree(&database.output, &files, self.mode).map_err(codegen)?;
            info!(
                database = key,
                output = %database.output.display(),
                files = files.len(),
                changes = report.changes(),
                "generated bindings"
            );
            reports.insert(key.to_string(), report);
        }
        Ok(reports)
    }

    /// Run the code phase from the persisted document.
    pub fn generate(&self) -> Result<BTreeMap<String, SyncReport>> {
        let model = load_spec(&self.config.spec_path)?;
        self.finish(self.generate_code(&model)?)
    }

    /// Run both phases.
    pub fn run(&self) -> Result<BTreeMap<String, SyncReport>> {
        let model = self.spec()?;
        self.finish(self.generate_code(&model)?)
    }

    fn finish(
        &self,
        reports: BTreeMap<String, SyncReport>,
    ) -> Result<BTreeMap<String, SyncReport>> {
        if self.mode == SyncMode::Check {
            let stale: Vec<String> = reports
                .iter()
                .filter(|(_, report)| !report.is_clean())
                .map(|(key, _)| key.clone())
                .collect();
            if !stale.is_empty() {
                return Err(Error::OutOfDate { databases: stale });
            }
        }
        Ok(reports)
    }
}

fn join(keys: &BTreeSet<&str>) -> String {
    keys.iter().copied().collect::<Vec<_>>().join(", ")
}
