//! Introspection against a live PostgreSQL.
//!
//! Set DATABASE_URL to run; the tests return early otherwise. Each test
//! works in its own schema and drops it afterwards.

use pgbind_core::{
    Cardinality, ColumnType, DatabaseConfig, ObjectFilter, PrimitiveType, QualifiedName,
    TableSource, TypeResolver,
};
use pgbind_introspect::{read_spec, PgCatalog};
use pretty_assertions::assert_eq;
use std::io::Write;

fn qn(s: &str) -> QualifiedName {
    s.parse().unwrap()
}

fn catalog(resolver: TypeResolver) -> Option<PgCatalog> {
    let url = std::env::var("DATABASE_URL").ok()?;
    Some(PgCatalog::connect(&url, resolver).expect("Failed to connect to PostgreSQL"))
}

fn execute(catalog: &PgCatalog, sql: &str) {
    catalog
        .block_on(sqlx::raw_sql(sql).execute(catalog.pool()))
        .unwrap();
}

fn blog_schema(catalog: &PgCatalog, schema: &str) {
    execute(
        catalog,
        &format!(
            r#"
            DROP SCHEMA IF EXISTS {schema} CASCADE;
            CREATE SCHEMA {schema};
            CREATE TYPE {schema}.mood AS ENUM ('sad', 'ok', 'happy');
            CREATE TYPE {schema}.address AS (street text, city text, zip int4);
            CREATE DOMAIN {schema}.email AS text CHECK (VALUE LIKE '%@%');
            CREATE TABLE {schema}.teams (id int8 PRIMARY KEY, name text NOT NULL);
            CREATE TABLE {schema}.users (
                id int8 PRIMARY KEY,
                dropped int4,
                team_id int8 REFERENCES {schema}.teams (id),
                email {schema}.email NOT NULL UNIQUE,
                mood {schema}.mood[] NOT NULL DEFAULT '{{}}',
                home {schema}.address
            );
            ALTER TABLE {schema}.users DROP COLUMN dropped;
            "#
        ),
    );
}

#[test]
fn test_tables_and_types() {
    let Some(mut catalog) = catalog(TypeResolver::default()) else {
        return;
    };
    blog_schema(&catalog, "pgbind_it_tables");

    let tables = catalog
        .tables(&ObjectFilter::objects([qn("pgbind_it_tables.users")]))
        .unwrap();
    assert_eq!(tables.len(), 1);
    let users = &tables[0];
    assert!(users.has_contiguous_positions());
    assert_eq!(users.primary_key_columns(), ["id".to_string()]);
    assert_eq!(
        users.foreign_key_targets().into_iter().cloned().collect::<Vec<_>>(),
        vec![qn("pgbind_it_tables.teams")]
    );

    let email = users.column("email").unwrap();
    assert!(!email.nullable);
    assert_eq!(
        email.column_type,
        ColumnType::domain(
            qn("pgbind_it_tables.email"),
            ColumnType::Primitive(PrimitiveType::Text)
        )
    );
    let mood = users.column("mood").unwrap();
    assert_eq!(
        mood.column_type,
        ColumnType::array(ColumnType::Enum(qn("pgbind_it_tables.mood")))
    );
    assert!(mood.has_default());

    execute(&catalog, "DROP SCHEMA pgbind_it_tables CASCADE");
}

#[test]
fn test_read_spec_closure_and_statements() {
    let Some(mut catalog) = catalog(TypeResolver::default()) else {
        return;
    };
    blog_schema(&catalog, "pgbind_it_spec");

    let mut script = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        script,
        "-- name: user_by_email :one\n\
         SELECT id, mood FROM pgbind_it_spec.users WHERE email = :email;"
    )
    .unwrap();

    let mut config = DatabaseConfig::new("src/db").with_table(qn("pgbind_it_spec.users"));
    config.statements.push(script.path().to_path_buf());
    let spec = read_spec(&mut catalog, &config).unwrap();

    let names: Vec<String> = spec.tables.iter().map(|t| t.name.to_string()).collect();
    assert_eq!(names, ["pgbind_it_spec.teams", "pgbind_it_spec.users"]);
    assert_eq!(spec.enums[0].labels, ["sad", "ok", "happy"]);
    assert_eq!(spec.composites[0].fields.len(), 3);
    assert_eq!(spec.domains[0].checks.len(), 1);

    let statement = &spec.statements[0];
    assert_eq!(statement.cardinality, Cardinality::One);
    assert_eq!(statement.variables[0].name, "email");
    assert_eq!(statement.columns.len(), 2);

    execute(&catalog, "DROP SCHEMA pgbind_it_spec CASCADE");
}

#[test]
fn test_missing_requested_enum() {
    let Some(mut catalog) = catalog(TypeResolver::default()) else {
        return;
    };
    let mut config = DatabaseConfig::new("src/db");
    config.enums.insert(qn("public.pgbind_no_such_enum"));
    let err = read_spec(&mut catalog, &config).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("public.pgbind_no_such_enum"));
}

#[test]
fn test_temp_tables_of_other_sessions_are_ignored() {
    let Some(other) = catalog(TypeResolver::default()) else {
        return;
    };
    let Some(mut catalog) = catalog(TypeResolver::default()) else {
        return;
    };
    execute(
        &other,
        "CREATE TEMP TABLE pgbind_scratch (foreign_col int4, other_col text)",
    );
    execute(&catalog, "CREATE TEMP TABLE pgbind_scratch (mine int8 NOT NULL)");

    let tables = catalog
        .tables(&ObjectFilter::temp_tables(["pgbind_scratch"]))
        .unwrap();
    assert_eq!(tables.len(), 1);
    let scratch = &tables[0];
    assert_eq!(scratch.name, qn("pg_temp.pgbind_scratch"));
    let columns: Vec<(u32, &str)> = scratch
        .columns
        .iter()
        .map(|c| (c.position, c.name.as_str()))
        .collect();
    assert_eq!(columns, [(1, "mine")]);
}
