//! Blocking catalog reader.

use crate::error::{Error, Result};
use crate::queries;
use pgbind_core::{
    CatalogType, CheckConstraint, ColumnDef, ColumnType, CompositeDef, DomainDef, EnumDef,
    ForeignKey, ObjectFilter, PrimaryKey, QualifiedName, TableDef, TableSource, TypeKind,
    TypeResolver, UniqueConstraint,
};
use sqlx::postgres::types::Oid;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::BTreeMap;
use tokio::runtime::Runtime;
use tracing::debug;

/// Nesting limit for domain and array type chains.
const MAX_TYPE_DEPTH: usize = 16;

#[derive(sqlx::FromRow)]
struct ColumnRow {
    schema_name: String,
    table_name: String,
    position: i32,
    column_name: String,
    type_oid: Oid,
    not_null: bool,
    default_expr: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ConstraintRow {
    schema_name: String,
    table_name: String,
    constraint_name: String,
    kind: String,
    columns: Vec<String>,
    target_schema: Option<String>,
    target_table: Option<String>,
    target_columns: Vec<String>,
    definition: String,
}

#[derive(sqlx::FromRow)]
struct EnumRow {
    schema_name: String,
    type_name: String,
    label: Option<String>,
}

#[derive(sqlx::FromRow)]
struct FieldRow {
    schema_name: String,
    type_name: String,
    position: i32,
    field_name: String,
    type_oid: Oid,
    not_null: bool,
}

#[derive(sqlx::FromRow)]
struct DomainRow {
    schema_name: String,
    type_name: String,
    type_oid: Oid,
    not_null: bool,
    default_expr: Option<String>,
    check_name: Option<String>,
    check_definition: Option<String>,
}

#[derive(sqlx::FromRow)]
struct TypeRow {
    schema_name: String,
    type_name: String,
    typtype: String,
    typcategory: String,
    element_oid: Oid,
    base_oid: Oid,
}

/// Reads catalog metadata over one connection.
///
/// Queries run on a private runtime, so every method blocks.
pub struct PgCatalog {
    pool: PgPool,
    rt: Runtime,
    resolver: TypeResolver,
    types: BTreeMap<u32, CatalogType>,
}

impl PgCatalog {
    /// Connect to `url`.
    pub fn connect(url: &str, resolver: TypeResolver) -> Result<Self> {
        let rt = Runtime::new().map_err(Error::Runtime)?;
        let pool = rt
            .block_on(PgPoolOptions::new().max_connections(1).connect(url))
            .map_err(Error::Connection)?;
        Ok(Self {
            pool,
            rt,
            resolver,
            types: BTreeMap::new(),
        })
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run a future on the private runtime.
    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.rt.block_on(future)
    }

    fn fetch<T>(&self, context: &'static str, sql: &str) -> Result<Vec<T>>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        debug!(context, "catalog query");
        self.rt
            .block_on(sqlx::query_as::<_, T>(sql).fetch_all(&self.pool))
            .map_err(|e| Error::query(context, e))
    }

    /// Describe a type by OID, following element and base types.
    pub fn catalog_type(&mut self, oid: Oid) -> Result<CatalogType> {
        self.catalog_type_at(oid, 0)
    }

    fn catalog_type_at(&mut self, oid: Oid, depth: usize) -> Result<CatalogType> {
        if let Some(ty) = self.types.get(&oid.0) {
            return Ok(ty.clone());
        }
        if depth > MAX_TYPE_DEPTH {
            return Err(pgbind_core::Error::Introspection(format!(
                "type {} nests too deeply",
                oid.0
            ))
            .into());
        }

        let row: TypeRow = self
            .rt
            .block_on(
                sqlx::query_as::<_, TypeRow>(queries::TYPE_BY_OID)
                    .bind(oid)
                    .fetch_optional(&self.pool),
            )
            .map_err(|e| Error::query("type", e))?
            .ok_or_else(|| {
                pgbind_core::Error::Introspection(format!("type {} not found", oid.0))
            })?;

        let kind = TypeKind::classify(&row.typtype, &row.typcategory, row.element_oid.0 != 0);
        let mut ty = CatalogType::new(QualifiedName::new(row.schema_name, row.type_name), kind);
        match kind {
            TypeKind::Array => ty = ty.with_element(self.catalog_type_at(row.element_oid, depth + 1)?),
            TypeKind::Domain => ty = ty.with_base(self.catalog_type_at(row.base_oid, depth + 1)?),
            _ => {}
        }
        self.types.insert(oid.0, ty.clone());
        Ok(ty)
    }

    /// Resolve a type by OID.
    pub fn resolve(&mut self, oid: Oid) -> Result<ColumnType> {
        let ty = self.catalog_type(oid)?;
        Ok(self.resolver.resolve(&ty)?)
    }

    /// Tables matching `filter`, with columns and constraints.
    pub fn load_tables(&mut self, filter: &ObjectFilter) -> Result<Vec<TableDef>> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }

        let sql = queries::with_filter(queries::TABLE_COLUMNS, filter, "c.relname")?;
        let rows: Vec<ColumnRow> = self.fetch("table columns", &sql)?;
        let mut tables: BTreeMap<QualifiedName, TableDef> = BTreeMap::new();
        for row in rows {
            let name = QualifiedName::new(row.schema_name, row.table_name);
            let column_type = self.resolve(row.type_oid)?;
            let mut column = ColumnDef::new(row.position as u32, row.column_name, column_type);
            if !row.not_null {
                column = column.nullable();
            }
            if let Some(default) = row.default_expr {
                column = column.with_default(default);
            }
            tables
                .entry(name.clone())
                .or_insert_with(|| TableDef::new(name))
                .columns
                .push(column);
        }

        let sql = queries::with_filter(queries::TABLE_CONSTRAINTS, filter, "c.relname")?;
        let rows: Vec<ConstraintRow> = self.fetch("table constraints", &sql)?;
        for row in rows {
            let name = QualifiedName::new(row.schema_name, row.table_name);
            let Some(table) = tables.get_mut(&name) else {
                continue;
            };
            match row.kind.as_str() {
                "p" => table.primary_key = Some(PrimaryKey::new(row.constraint_name, row.columns)),
                "u" => table
                    .unique_constraints
                    .push(UniqueConstraint::new(row.constraint_name, row.columns)),
                "c" => table
                    .check_constraints
                    .push(CheckConstraint::new(row.constraint_name, row.definition)),
                "f" => {
                    let (Some(schema), Some(target)) = (row.target_schema, row.target_table) else {
                        return Err(pgbind_core::Error::Introspection(format!(
                            "foreign key {} of {name} has no target",
                            row.constraint_name
                        ))
                        .into());
                    };
                    table.foreign_keys.push(ForeignKey::new(
                        row.constraint_name,
                        row.columns,
                        QualifiedName::new(schema, target),
                        row.target_columns,
                    ));
                }
                _ => {}
            }
        }

        debug!(tables = tables.len(), "loaded tables");
        Ok(tables
            .into_values()
            .map(|mut table| {
                table.normalize();
                table
            })
            .collect())
    }

    /// Enums matching `filter`.
    pub fn enums(&mut self, filter: &ObjectFilter) -> Result<Vec<EnumDef>> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }
        let sql = queries::with_filter(queries::ENUM_LABELS, filter, "t.typname")?;
        let rows: Vec<EnumRow> = self.fetch("enums", &sql)?;

        let mut enums: BTreeMap<QualifiedName, Vec<String>> = BTreeMap::new();
        for row in rows {
            let labels = enums
                .entry(QualifiedName::new(row.schema_name, row.type_name))
                .or_default();
            labels.extend(row.label);
        }
        Ok(enums
            .into_iter()
            .map(|(name, labels)| EnumDef::new(name, labels))
            .collect())
    }

    /// Composite types matching `filter`.
    pub fn composites(&mut self, filter: &ObjectFilter) -> Result<Vec<CompositeDef>> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }
        let sql = queries::with_filter(queries::COMPOSITE_FIELDS, filter, "t.typname")?;
        let rows: Vec<FieldRow> = self.fetch("composite types", &sql)?;

        let mut composites: BTreeMap<QualifiedName, CompositeDef> = BTreeMap::new();
        for row in rows {
            let name = QualifiedName::new(row.schema_name, row.type_name);
            let field_type = self.resolve(row.type_oid)?;
            let mut field = ColumnDef::new(row.position as u32, row.field_name, field_type);
            if !row.not_null {
                field = field.nullable();
            }
            composites
                .entry(name.clone())
                .or_insert_with(|| CompositeDef::new(name))
                .fields
                .push(field);
        }
        Ok(composites.into_values().collect())
    }

    /// Domains matching `filter`.
    ///
    /// The base type is resolved on its own, so a custom mapping of the
    /// domain itself does not hide it.
    pub fn domains(&mut self, filter: &ObjectFilter) -> Result<Vec<DomainDef>> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }
        let sql = queries::with_filter(queries::DOMAINS, filter, "t.typname")?;
        let rows: Vec<DomainRow> = self.fetch("domains", &sql)?;

        let mut domains: BTreeMap<QualifiedName, DomainDef> = BTreeMap::new();
        for row in rows {
            let name = QualifiedName::new(row.schema_name, row.type_name);
            if !domains.contains_key(&name) {
                let ty = self.catalog_type(row.type_oid)?;
                let base = ty.base.as_deref().ok_or_else(|| {
                    pgbind_core::Error::Introspection(format!("domain {name} has no base type"))
                })?;
                let mut domain = DomainDef::new(name.clone(), self.resolver.resolve(base)?);
                if row.not_null {
                    domain = domain.not_null();
                }
                domain.default = row.default_expr.clone();
                domains.insert(name.clone(), domain);
            }
            if let (Some(check), Some(definition), Some(domain)) =
                (row.check_name, row.check_definition, domains.get_mut(&name))
            {
                domain.checks.push(CheckConstraint::new(check, definition));
            }
        }
        Ok(domains.into_values().collect())
    }
}

impl TableSource for PgCatalog {
    fn tables(&mut self, filter: &ObjectFilter) -> pgbind_core::Result<Vec<TableDef>> {
        self.load_tables(filter).map_err(Error::into_core)
    }
}
