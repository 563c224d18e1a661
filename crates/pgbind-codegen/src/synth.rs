//! The code-generation phase for one database.

use crate::emit::{
    emit_composite, emit_domain, emit_enum, emit_module, emit_statement, emit_table,
};
use crate::error::{Error, Result};
use crate::layout::{Category, EntityPath, Layout, STATEMENTS};
use crate::types::TypeMap;
use crate::GeneratedFile;
use pgbind_core::{DatabaseConfig, DatabaseSpec, QualifiedName};
use tracing::{debug, info, warn};

/// Log configured overrides that match nothing in the model.
fn warn_unmatched(spec: &DatabaseSpec, config: &DatabaseConfig) {
    for name in config.enum_overrides.keys() {
        if spec.enum_def(name).is_none() {
            warn!(enum_type = %name, "enum override matches no enum");
        }
    }
    for name in config.domain_overrides.keys() {
        if spec.domain(name).is_none() {
            warn!(domain = %name, "domain override matches no domain");
        }
    }
    for name in &config.events {
        if spec.table(name).is_none() {
            warn!(table = %name, "event table is not part of the model");
        }
    }
    for key in config.columns.keys() {
        let matched = spec.tables.iter().any(|table| {
            table
                .columns
                .iter()
                .any(|column| *key == format!("{}.{}", table.name, column.name))
        });
        if !matched {
            warn!(column = %key, "column override matches no column");
        }
    }
}

fn entity<'a>(
    layout: &'a Layout,
    category: Category,
    name: &QualifiedName,
) -> Result<&'a EntityPath> {
    layout.entity(category, name).ok_or_else(|| {
        Error::configuration(format!("{name} has no place in the generated {}", category.dir()))
    })
}

/// Generate the module tree for one database.
///
/// Output is a pure function of `spec` and `config`: files are sorted by
/// path and every collection is emitted in name order.
pub fn synthesize(spec: &DatabaseSpec, config: &DatabaseConfig) -> Result<Vec<GeneratedFile>> {
    config.validate()?;
    let mut spec = spec.clone();
    spec.normalize();
    warn_unmatched(&spec, config);

    let layout = Layout::new(&spec, config)?;
    let types = TypeMap::new(&layout, config);
    let mut files = Vec::new();

    for table in &spec.tables {
        let path = entity(&layout, Category::Tables, &table.name)?;
        files.push(emit_table(table, path, config, &types)?);
        debug!(table = %table.name, "emitted table");
    }
    for def in &spec.enums {
        match layout.entity(Category::Enums, &def.name) {
            Some(path) => files.push(emit_enum(def, path)?),
            None => debug!(enum_type = %def.name, "enum replaced by override"),
        }
    }
    for def in &spec.composites {
        let path = entity(&layout, Category::Composites, &def.name)?;
        files.push(emit_composite(def, path, &types)?);
    }
    for def in &spec.domains {
        match layout.entity(Category::Domains, &def.name) {
            Some(path) => files.push(emit_domain(def, path, &types)?),
            None => debug!(domain = %def.name, "domain replaced by custom type"),
        }
    }
    for def in &spec.statements {
        let module = layout.statement(&def.name).ok_or_else(|| {
            Error::configuration(format!("statement {} has no module", def.name))
        })?;
        files.push(emit_statement(def, module, &types)?);
    }

    let mut root_children: Vec<&str> = layout.schemas().values().map(String::as_str).collect();
    for (schema, module) in layout.schemas() {
        let mut categories = Vec::new();
        for category in Category::ALL {
            let entities = layout.entities_in(module, category);
            if entities.is_empty() {
                continue;
            }
            let children: Vec<&str> = entities.iter().map(|e| e.module.as_str()).collect();
            files.push(emit_module(
                &format!("{module}/{}", category.dir()),
                &format!("{} of schema `{schema}`.", capitalized(category.dir())),
                &children,
            )?);
            categories.push(category.dir());
        }
        files.push(emit_module(module, &format!("Schema `{schema}`."), &categories)?);
    }
    let statements = layout.statement_modules();
    if !statements.is_empty() {
        files.push(emit_module(STATEMENTS, "Named statements.", &statements)?);
        root_children.push(STATEMENTS);
    }
    root_children.sort_unstable();
    files.push(emit_module("", "Database bindings generated by pgbind.", &root_children)?);

    files.sort_by(|a, b| a.path.cmp(&b.path));
    info!(
        tables = spec.tables.len(),
        statements = spec.statements.len(),
        files = files.len(),
        "synthesized bindings"
    );
    Ok(files)
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
