//! Code-generation phase tests driven from a persisted spec document.

use pgbind::{write_spec, Config, DatabaseConfig, Error, Pipeline, SpecModel, SyncMode};
use pgbind_core::{
    ColumnDef, ColumnType, DatabaseSpec, EnumDef, PrimaryKey, PrimitiveType, QualifiedName,
    TableDef,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn qn(s: &str) -> QualifiedName {
    s.parse().unwrap()
}

fn main_spec() -> DatabaseSpec {
    DatabaseSpec::new()
        .with_enum(EnumDef::new(qn("public.mood"), ["happy", "sad"]))
        .with_table(
            TableDef::new(qn("public.users"))
                .with_column(ColumnDef::new(1, "id", ColumnType::Primitive(PrimitiveType::Int8)))
                .with_column(
                    ColumnDef::new(2, "mood", ColumnType::Enum(qn("public.mood"))).nullable(),
                )
                .with_primary_key(PrimaryKey::new("users_pkey", ["id"])),
        )
}

fn reporting_spec() -> DatabaseSpec {
    DatabaseSpec::new().with_table(
        TableDef::new(qn("public.daily"))
            .with_column(ColumnDef::new(1, "day", ColumnType::Primitive(PrimitiveType::Date))),
    )
}

fn setup(dir: &Path) -> Config {
    let mut config = Config::default()
        .with_database("main", DatabaseConfig::new("src/db"))
        .with_database(
            "reporting",
            DatabaseConfig {
                module: Some("crate::reporting".to_string()),
                ..DatabaseConfig::new("src/reporting")
            },
        );
    config.resolve_paths(dir);

    let model = SpecModel::new()
        .with_database("main", main_spec())
        .with_database("reporting", reporting_spec());
    assert!(write_spec(&config.spec_path, &model).unwrap());
    config
}

#[test]
fn test_generate_writes_every_database() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());

    let reports = Pipeline::new(config).generate().unwrap();

    let keys: Vec<&str> = reports.keys().map(String::as_str).collect();
    assert_eq!(keys, ["main", "reporting"]);
    assert!(dir.path().join("src/db/public/tables/users.rs").exists());
    assert!(dir.path().join("src/db/public/enums/mood.rs").exists());
    assert!(dir.path().join("src/reporting/public/tables/daily.rs").exists());
    let users = fs::read_to_string(dir.path().join("src/db/public/tables/users.rs")).unwrap();
    assert!(users.contains("crate::db::public::enums::mood::Mood"));
}

#[test]
fn test_second_generate_is_clean() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());

    Pipeline::new(config.clone()).generate().unwrap();
    let reports = Pipeline::new(config).generate().unwrap();

    assert!(reports.values().all(|r| r.is_clean()));
}

#[test]
fn test_check_mode_detects_drift() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());
    Pipeline::new(config.clone()).generate().unwrap();

    let users = dir.path().join("src/db/public/tables/users.rs");
    fs::write(&users, "// edited by hand\n").unwrap();

    let err = Pipeline::new(config.clone())
        .with_mode(SyncMode::Check)
        .generate()
        .unwrap_err();
    match err {
        Error::OutOfDate { databases } => assert_eq!(databases, ["main"]),
        other => panic!("expected out of date, got {other}"),
    }
    assert_eq!(fs::read_to_string(&users).unwrap(), "// edited by hand\n");

    Pipeline::new(config.clone()).generate().unwrap();
    Pipeline::new(config)
        .with_mode(SyncMode::Check)
        .generate()
        .unwrap();
}

#[test]
fn test_restricted_generate() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());

    let reports = Pipeline::new(config)
        .with_databases(vec!["reporting".to_string()])
        .generate()
        .unwrap();

    assert_eq!(reports.len(), 1);
    assert!(!dir.path().join("src/db").exists());
    assert!(dir.path().join("src/reporting/mod.rs").exists());
}

#[test]
fn test_database_keys_must_match() {
    let dir = TempDir::new().unwrap();
    let mut config = setup(dir.path());
    config.databases.remove("reporting");

    let err = Pipeline::new(config).generate().unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("reporting"));
}

#[test]
fn test_unknown_spec_version_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());
    fs::write(&config.spec_path, r#"{ "version": 99, "databases": {} }"#).unwrap();

    let err = Pipeline::new(config).generate().unwrap_err();
    assert!(matches!(err, Error::Core(_)));
}

#[test]
fn test_write_spec_skips_identical_content() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());
    let model = SpecModel::new()
        .with_database("main", main_spec())
        .with_database("reporting", reporting_spec());

    assert!(!write_spec(&config.spec_path, &model).unwrap());
}

#[test]
fn test_load_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("pgbind.toml");
    fs::write(
        &path,
        "spec_path = \"pgbind.spec.json\"\n\n[databases.main]\noutput = \"src/db\"\n",
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.spec_path, dir.path().join("pgbind.spec.json"));
    assert_eq!(config.databases["main"].output, dir.path().join("src/db"));
}
