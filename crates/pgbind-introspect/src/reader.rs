//! The spec-generation phase for one database.

use crate::catalog::PgCatalog;
use crate::error::{Error, Result};
use pgbind_core::{
    closure, ColumnType, DatabaseConfig, DatabaseSpec, ObjectFilter, ObjectKind, QualifiedName,
    StatementDef, TypeResolver,
};
use pgbind_lang::parse_script;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// User-defined type names referenced by a model.
#[derive(Debug, Default)]
struct TypeRefs {
    enums: BTreeSet<QualifiedName>,
    composites: BTreeSet<QualifiedName>,
    domains: BTreeSet<QualifiedName>,
}

impl TypeRefs {
    fn add(&mut self, ty: &ColumnType) {
        ty.walk(&mut |t| match t {
            ColumnType::Enum(name) => {
                self.enums.insert(name.clone());
            }
            ColumnType::Composite(name) => {
                self.composites.insert(name.clone());
            }
            ColumnType::Domain { name, .. } => {
                self.domains.insert(name.clone());
            }
            _ => {}
        });
    }
}

/// Read every script and parse its statements.
fn load_statements(catalog: &mut PgCatalog, paths: &[impl AsRef<Path>]) -> Result<Vec<StatementDef>> {
    let mut statements = Vec::new();
    let mut names = BTreeSet::new();
    for path in paths {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = parse_script(&source).map_err(|err| Error::script(path, &source, &err))?;
        for statement in &parsed {
            if !names.insert(statement.name.clone()) {
                return Err(pgbind_core::Error::Configuration(format!(
                    "statement {} is declared more than once",
                    statement.name
                ))
                .into());
            }
            statements.push(catalog.describe_statement(statement)?);
        }
        debug!(path = %path.display(), statements = parsed.len(), "loaded statement script");
    }
    Ok(statements)
}

fn check_found(kind: ObjectKind, requested: &BTreeSet<QualifiedName>, found: &BTreeSet<QualifiedName>) -> Result<()> {
    let names: Vec<String> = requested.difference(found).map(ToString::to_string).collect();
    if names.is_empty() {
        Ok(())
    } else {
        Err(pgbind_core::Error::MissingObjects { kind, names }.into())
    }
}

/// Introspect one database: tables and their foreign-key closure, the
/// user-defined types they reach, requested types and described statements.
pub fn read_spec(catalog: &mut PgCatalog, config: &DatabaseConfig) -> Result<DatabaseSpec> {
    config.validate()?;

    let filter = config.table_filter();
    let tables = closure(catalog, &filter)?;
    let missing = filter.missing(tables.iter().map(|t| &t.name));
    if !missing.is_empty() {
        return Err(pgbind_core::Error::MissingObjects {
            kind: ObjectKind::Table,
            names: missing,
        }
        .into());
    }
    info!(tables = tables.len(), "introspected tables");

    let statements = load_statements(catalog, &config.statements)?;

    let mut refs = TypeRefs {
        enums: config.enums.clone(),
        composites: config.composites.clone(),
        domains: config.domains.clone(),
    };
    for table in &tables {
        for column in &table.columns {
            refs.add(&column.column_type);
        }
    }
    for statement in &statements {
        for variable in &statement.variables {
            refs.add(&variable.column_type);
        }
        for column in &statement.columns {
            refs.add(&column.column_type);
        }
    }

    // Composites and domains may reach further types.
    let mut composites = Vec::new();
    let mut domains = Vec::new();
    let mut seen_composites = BTreeSet::new();
    let mut seen_domains = BTreeSet::new();
    let mut round = 0usize;
    loop {
        round += 1;
        let new_composites: BTreeSet<_> = refs.composites.difference(&seen_composites).cloned().collect();
        let new_domains: BTreeSet<_> = refs.domains.difference(&seen_domains).cloned().collect();
        if new_composites.is_empty() && new_domains.is_empty() {
            break;
        }
        debug!(
            round,
            composites = new_composites.len(),
            domains = new_domains.len(),
            "type discovery round"
        );

        for composite in catalog.composites(&ObjectFilter::Objects(new_composites.clone()))? {
            for field in &composite.fields {
                refs.add(&field.column_type);
            }
            composites.push(composite);
        }
        for domain in catalog.domains(&ObjectFilter::Objects(new_domains.clone()))? {
            refs.add(&domain.base);
            domains.push(domain);
        }
        seen_composites.extend(new_composites);
        seen_domains.extend(new_domains);
    }
    let enums = catalog.enums(&ObjectFilter::Objects(refs.enums.clone()))?;

    check_found(
        ObjectKind::Enum,
        &refs.enums,
        &enums.iter().map(|e| e.name.clone()).collect(),
    )?;
    check_found(
        ObjectKind::Composite,
        &refs.composites,
        &composites.iter().map(|c| c.name.clone()).collect(),
    )?;
    check_found(
        ObjectKind::Domain,
        &refs.domains,
        &domains.iter().map(|d| d.name.clone()).collect(),
    )?;

    let mut spec = DatabaseSpec {
        tables,
        enums,
        composites,
        domains,
        statements,
    };
    spec.normalize();
    spec.validate()?;
    info!(
        enums = spec.enums.len(),
        composites = spec.composites.len(),
        domains = spec.domains.len(),
        statements = spec.statements.len(),
        "introspected database"
    );
    Ok(spec)
}

/// Connect with `config` and read its spec.
pub fn read_database(config: &DatabaseConfig) -> Result<DatabaseSpec> {
    let url = config.connection_url()?;
    let resolver = TypeResolver::new(config.type_mappings().clone());
    let mut catalog = PgCatalog::connect(&url, resolver)?;
    read_spec(&mut catalog, config)
}
