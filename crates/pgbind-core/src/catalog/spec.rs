//! Spec model - versioned snapshot of one or more introspected databases.

use super::name::QualifiedName;
use super::statement::StatementDef;
use super::table::TableDef;
use super::user_type::{CompositeDef, DomainDef, EnumDef};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Version of the persisted spec document format.
pub const SPEC_VERSION: u32 = 1;

/// Persisted spec document covering every configured database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecModel {
    /// Document format version.
    pub version: u32,
    /// Per-database specs keyed by configuration key.
    pub databases: BTreeMap<String, DatabaseSpec>,
}

impl SpecModel {
    /// Create an empty spec model at the current version.
    pub fn new() -> Self {
        Self {
            version: SPEC_VERSION,
            databases: BTreeMap::new(),
        }
    }

    /// Add a database spec.
    pub fn with_database(mut self, key: impl Into<String>, spec: DatabaseSpec) -> Self {
        self.databases.insert(key.into(), spec);
        self
    }

    /// Get a database spec by key.
    pub fn database(&self, key: &str) -> Option<&DatabaseSpec> {
        self.databases.get(key)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Deserialize from JSON, rejecting unknown versions and invalid models.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let found = value.get("version").and_then(|v| v.as_u64()).unwrap_or(0);
        if found != u64::from(SPEC_VERSION) {
            return Err(Error::UnsupportedSpecVersion {
                found: u32::try_from(found).unwrap_or(u32::MAX),
                expected: SPEC_VERSION,
            });
        }

        let model: SpecModel = serde_json::from_value(value)?;
        for spec in model.databases.values() {
            spec.validate()?;
        }
        Ok(model)
    }
}

impl Default for SpecModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Introspected schema of a single database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSpec {
    /// Tables, sorted by name.
    #[serde(default)]
    pub tables: Vec<TableDef>,
    /// Enums, sorted by name.
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    /// Composite types, sorted by name.
    #[serde(default)]
    pub composites: Vec<CompositeDef>,
    /// Domains, sorted by name.
    #[serde(default)]
    pub domains: Vec<DomainDef>,
    /// Named statements, sorted by name.
    #[serde(default)]
    pub statements: Vec<StatementDef>,
}

impl DatabaseSpec {
    /// Create an empty database spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table.
    pub fn with_table(mut self, table: TableDef) -> Self {
        self.tables.push(table);
        self
    }

    /// Add an enum.
    pub fn with_enum(mut self, def: EnumDef) -> Self {
        self.enums.push(def);
        self
    }

    /// Add a composite type.
    pub fn with_composite(mut self, def: CompositeDef) -> Self {
        self.composites.push(def);
        self
    }

    /// Add a domain.
    pub fn with_domain(mut self, def: DomainDef) -> Self {
        self.domains.push(def);
        self
    }

    /// Add a statement.
    pub fn with_statement(mut self, def: StatementDef) -> Self {
        self.statements.push(def);
        self
    }

    /// Get a table by name.
    pub fn table(&self, name: &QualifiedName) -> Option<&TableDef> {
        self.tables.iter().find(|t| &t.name == name)
    }

    /// Get an enum by name.
    pub fn enum_def(&self, name: &QualifiedName) -> Option<&EnumDef> {
        self.enums.iter().find(|e| &e.name == name)
    }

    /// Get a composite by name.
    pub fn composite(&self, name: &QualifiedName) -> Option<&CompositeDef> {
        self.composites.iter().find(|c| &c.name == name)
    }

    /// Get a domain by name.
    pub fn domain(&self, name: &QualifiedName) -> Option<&DomainDef> {
        self.domains.iter().find(|d| &d.name == name)
    }

    /// Schemas that own at least one table or user-defined type.
    pub fn schemas(&self) -> BTreeSet<&str> {
        self.tables
            .iter()
            .map(|t| &t.name)
            .chain(self.enums.iter().map(|e| &e.name))
            .chain(self.composites.iter().map(|c| &c.name))
            .chain(self.domains.iter().map(|d| &d.name))
            .map(|n| n.schema.as_str())
            .collect()
    }

    /// Sort every entity collection by name.
    pub fn normalize(&mut self) {
        for table in &mut self.tables {
            table.normalize();
        }
        for composite in &mut self.composites {
            composite.fields.sort_by_key(|f| f.position);
        }
        for domain in &mut self.domains {
            domain.checks.sort_by(|a, b| a.name.cmp(&b.name));
        }
        self.tables.sort_by(|a, b| a.name.cmp(&b.name));
        self.enums.sort_by(|a, b| a.name.cmp(&b.name));
        self.composites.sort_by(|a, b| a.name.cmp(&b.name));
        self.domains.sort_by(|a, b| a.name.cmp(&b.name));
        self.statements.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Check the model invariants.
    ///
    /// Table names are unique, every foreign-key target is present, statement
    /// variables are unique per statement and column positions are contiguous.
    pub fn validate(&self) -> Result<()> {
        let mut names = BTreeSet::new();
        for table in &self.tables {
            if !names.insert(&table.name) {
                return Err(Error::DuplicateTable(table.name.clone()));
            }
        }

        for table in &self.tables {
            if !table.has_contiguous_positions() {
                return Err(Error::ColumnPositions(table.name.clone()));
            }
            for target in table.foreign_key_targets() {
                if !names.contains(target) {
                    return Err(Error::MissingForeignKeyTarget {
                        table: table.name.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        for composite in &self.composites {
            let contiguous = composite
                .fields
                .iter()
                .enumerate()
                .all(|(i, f)| f.position as usize == i + 1);
            if !contiguous {
                return Err(Error::ColumnPositions(composite.name.clone()));
            }
        }

        for statement in &self.statements {
            if let Some(variable) = statement.duplicate_variable() {
                return Err(Error::DuplicateVariable {
                    statement: statement.name.clone(),
                    variable: variable.to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnDef, ColumnType, ForeignKey, PrimaryKey, PrimitiveType};

    fn users() -> TableDef {
        TableDef::new(QualifiedName::new("public", "users"))
            .with_column(ColumnDef::new(1, "id", ColumnType::Primitive(PrimitiveType::Int8)))
            .with_primary_key(PrimaryKey::new("users_pkey", ["id"]))
    }

    fn posts() -> TableDef {
        TableDef::new(QualifiedName::new("public", "posts"))
            .with_column(ColumnDef::new(1, "id", ColumnType::Primitive(PrimitiveType::Int8)))
            .with_column(ColumnDef::new(
                2,
                "author_id",
                ColumnType::Primitive(PrimitiveType::Int8),
            ))
            .with_foreign_key(ForeignKey::new(
                "posts_author_id_fkey",
                ["author_id"],
                QualifiedName::new("public", "users"),
                ["id"],
            ))
    }

    #[test]
    fn test_validate_accepts_closed_model() {
        let spec = DatabaseSpec::new().with_table(users()).with_table(posts());
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_fk_target() {
        let spec = DatabaseSpec::new().with_table(posts());
        let err = spec.validate().unwrap_err();
        assert!(matches!(err, Error::MissingForeignKeyTarget { .. }));
    }

    #[test]
    fn test_validate_duplicate_table() {
        let spec = DatabaseSpec::new().with_table(users()).with_table(users());
        assert!(matches!(spec.validate(), Err(Error::DuplicateTable(_))));
    }

    #[test]
    fn test_normalize_sorts_tables() {
        let mut spec = DatabaseSpec::new().with_table(users()).with_table(posts());
        spec.normalize();
        assert_eq!(spec.tables[0].name.name, "posts");
        assert_eq!(spec.tables[1].name.name, "users");
    }

    #[test]
    fn test_unknown_version_rejected() {
        let json = r#"{"version": 7, "databases": {}}"#;
        let err = SpecModel::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedSpecVersion { found: 7, expected: 1 }
        ));
    }

    #[test]
    fn test_schemas() {
        let spec = DatabaseSpec::new()
            .with_table(users())
            .with_enum(EnumDef::new(QualifiedName::new("billing", "plan"), ["free"]));
        let schemas: Vec<_> = spec.schemas().into_iter().collect();
        assert_eq!(schemas, ["billing", "public"]);
    }
}
