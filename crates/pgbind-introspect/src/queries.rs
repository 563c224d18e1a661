//! Catalog queries.
//!
//! Each query has a `{filter}` placeholder replaced by a rendered
//! [`ObjectFilter`] over [`SCHEMA_EXPR`] and the object name column.
//! This session's temporary schema is reported as `pg_temp`; temporary
//! schemas of other sessions are never matched.

use pgbind_core::{ObjectFilter, Result};

/// Schema of an object, with this session's temporary schema as `pg_temp`.
pub const SCHEMA_EXPR: &str =
    "(CASE WHEN n.oid = pg_catalog.pg_my_temp_schema() THEN 'pg_temp' ELSE n.nspname::text END)";

/// Excludes the temporary schemas of other sessions.
pub const OWN_NAMESPACE: &str = r"(n.oid = pg_catalog.pg_my_temp_schema() OR (n.nspname NOT LIKE 'pg\_temp\_%' AND n.nspname NOT LIKE 'pg\_toast\_temp\_%'))";

/// Table columns, renumbered from 1 so dropped columns leave no gaps.
pub const TABLE_COLUMNS: &str = r#"
SELECT
    (CASE WHEN n.oid = pg_catalog.pg_my_temp_schema() THEN 'pg_temp' ELSE n.nspname::text END) AS schema_name,
    c.relname::text AS table_name,
    (row_number() OVER (PARTITION BY c.oid ORDER BY a.attnum))::int4 AS position,
    a.attname::text AS column_name,
    a.atttypid AS type_oid,
    a.attnotnull AS not_null,
    pg_catalog.pg_get_expr(d.adbin, d.adrelid) AS default_expr
FROM pg_catalog.pg_class c
JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
JOIN pg_catalog.pg_attribute a ON a.attrelid = c.oid AND a.attnum > 0 AND NOT a.attisdropped
LEFT JOIN pg_catalog.pg_attrdef d ON d.adrelid = c.oid AND d.adnum = a.attnum
WHERE c.relkind IN ('r', 'p') AND ({filter})
ORDER BY 1, 2, 3
"#;

/// Primary key, foreign key, unique and check constraints of tables.
pub const TABLE_CONSTRAINTS: &str = r#"
SELECT
    (CASE WHEN n.oid = pg_catalog.pg_my_temp_schema() THEN 'pg_temp' ELSE n.nspname::text END) AS schema_name,
    c.relname::text AS table_name,
    con.conname::text AS constraint_name,
    con.contype::text AS kind,
    ARRAY(
        SELECT a.attname::text
        FROM unnest(con.conkey) WITH ORDINALITY AS k(attnum, ord)
        JOIN pg_catalog.pg_attribute a ON a.attrelid = con.conrelid AND a.attnum = k.attnum
        ORDER BY k.ord
    ) AS columns,
    (CASE WHEN fn.oid = pg_catalog.pg_my_temp_schema() THEN 'pg_temp' ELSE fn.nspname::text END) AS target_schema,
    fc.relname::text AS target_table,
    ARRAY(
        SELECT a.attname::text
        FROM unnest(con.confkey) WITH ORDINALITY AS k(attnum, ord)
        JOIN pg_catalog.pg_attribute a ON a.attrelid = con.confrelid AND a.attnum = k.attnum
        ORDER BY k.ord
    ) AS target_columns,
    pg_catalog.pg_get_constraintdef(con.oid) AS definition
FROM pg_catalog.pg_constraint con
JOIN pg_catalog.pg_class c ON c.oid = con.conrelid
JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
LEFT JOIN pg_catalog.pg_class fc ON fc.oid = con.confrelid
LEFT JOIN pg_catalog.pg_namespace fn ON fn.oid = fc.relnamespace
WHERE con.contype IN ('p', 'f', 'u', 'c') AND c.relkind IN ('r', 'p') AND ({filter})
ORDER BY 1, 2, 3
"#;

/// Enum labels in sort order. Enums without labels yield one NULL label row.
pub const ENUM_LABELS: &str = r#"
SELECT
    n.nspname::text AS schema_name,
    t.typname::text AS type_name,
    e.enumlabel::text AS label
FROM pg_catalog.pg_type t
JOIN pg_catalog.pg_namespace n ON n.oid = t.typnamespace
LEFT JOIN pg_catalog.pg_enum e ON e.enumtypid = t.oid
WHERE t.typtype = 'e' AND ({filter})
ORDER BY 1, 2, e.enumsortorder
"#;

/// Fields of standalone composite types.
pub const COMPOSITE_FIELDS: &str = r#"
SELECT
    n.nspname::text AS schema_name,
    t.typname::text AS type_name,
    (row_number() OVER (PARTITION BY t.oid ORDER BY a.attnum))::int4 AS position,
    a.attname::text AS field_name,
    a.atttypid AS type_oid,
    a.attnotnull AS not_null
FROM pg_catalog.pg_type t
JOIN pg_catalog.pg_namespace n ON n.oid = t.typnamespace
JOIN pg_catalog.pg_class c ON c.oid = t.typrelid AND c.relkind = 'c'
JOIN pg_catalog.pg_attribute a ON a.attrelid = c.oid AND a.attnum > 0 AND NOT a.attisdropped
WHERE t.typtype = 'c' AND ({filter})
ORDER BY 1, 2, 3
"#;

/// Domains with their check constraints; one row per check.
pub const DOMAINS: &str = r#"
SELECT
    n.nspname::text AS schema_name,
    t.typname::text AS type_name,
    t.oid AS type_oid,
    t.typnotnull AS not_null,
    t.typdefault AS default_expr,
    con.conname::text AS check_name,
    pg_catalog.pg_get_constraintdef(con.oid) AS check_definition
FROM pg_catalog.pg_type t
JOIN pg_catalog.pg_namespace n ON n.oid = t.typnamespace
LEFT JOIN pg_catalog.pg_constraint con ON con.contypid = t.oid AND con.contype = 'c'
WHERE t.typtype = 'd' AND ({filter})
ORDER BY 1, 2, 6
"#;

/// One type by OID.
pub const TYPE_BY_OID: &str = r#"
SELECT
    n.nspname::text AS schema_name,
    t.typname::text AS type_name,
    t.typtype::text AS typtype,
    t.typcategory::text AS typcategory,
    t.typelem AS element_oid,
    t.typbasetype AS base_oid
FROM pg_catalog.pg_type t
JOIN pg_catalog.pg_namespace n ON n.oid = t.typnamespace
WHERE t.oid = $1
"#;

/// Substitute the rendered filter into a query.
pub fn with_filter(query: &str, filter: &ObjectFilter, name_expr: &str) -> Result<String> {
    let predicate = filter.render(SCHEMA_EXPR, name_expr)?;
    Ok(query.replace("{filter}", &format!("{OWN_NAMESPACE} AND ({predicate})")))
}
