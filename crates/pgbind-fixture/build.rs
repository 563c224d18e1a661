//! Build script for pgbind-fixture
//!
//! Synthesizes bindings for the schema in `src/schema.sql` and bundles them
//! into `$OUT_DIR/db.rs`. The model below mirrors that script; keep the two
//! in step.

use pgbind_core::{
    Cardinality, CheckConstraint, ColumnDef, ColumnType, CompositeDef, DatabaseConfig,
    DatabaseSpec, DomainDef, EnumDef, ForeignKey, PrimaryKey, PrimitiveType, QualifiedName,
    ResultColumn, StatementDef, TableDef, Variable,
};
use std::env;
use std::path::PathBuf;

const SCHEMA: &str = "pgbind_fixture";

fn qn(name: &str) -> QualifiedName {
    QualifiedName::new(SCHEMA, name)
}

fn primitive(p: PrimitiveType) -> ColumnType {
    ColumnType::Primitive(p)
}

fn model() -> DatabaseSpec {
    let users = TableDef::new(qn("users"))
        .with_column(ColumnDef::new(1, "id", primitive(PrimitiveType::Int8)))
        .with_column(ColumnDef::new(
            2,
            "email",
            ColumnType::domain(qn("email"), primitive(PrimitiveType::Text)),
        ))
        .with_column(ColumnDef::new(3, "mood", ColumnType::Enum(qn("mood"))).nullable())
        .with_column(ColumnDef::new(4, "home", ColumnType::Composite(qn("address"))).nullable())
        .with_column(
            ColumnDef::new(5, "created_at", primitive(PrimitiveType::Timestamptz))
                .with_default("now()"),
        )
        .with_primary_key(PrimaryKey::new("users_pkey", ["id"]));

    let tags = TableDef::new(qn("tags"))
        .with_column(ColumnDef::new(1, "user_id", primitive(PrimitiveType::Int8)))
        .with_column(ColumnDef::new(2, "tag", primitive(PrimitiveType::Text)))
        .with_column(ColumnDef::new(3, "note", primitive(PrimitiveType::Text)).nullable())
        .with_foreign_key(ForeignKey::new(
            "tags_user_id_fkey",
            ["user_id"],
            qn("users"),
            ["id"],
        ));

    DatabaseSpec::new()
        .with_table(users)
        .with_table(tags)
        .with_enum(EnumDef::new(qn("mood"), ["happy", "so-so", "sad"]))
        .with_composite(
            CompositeDef::new(qn("address"))
                .with_field(ColumnDef::new(1, "street", primitive(PrimitiveType::Text)).nullable())
                .with_field(ColumnDef::new(2, "city", primitive(PrimitiveType::Text)).nullable()),
        )
        .with_domain(
            DomainDef::new(qn("email"), primitive(PrimitiveType::Text))
                .with_check(CheckConstraint::new("email_check", "CHECK (VALUE ~~ '%@%'::text)")),
        )
        .with_statement(
            StatementDef::new(
                "user_by_id",
                Cardinality::One,
                "SELECT id, mood FROM pgbind_fixture.users WHERE id = :id",
                "SELECT id, mood FROM pgbind_fixture.users WHERE id = $1",
            )
            .with_variable(Variable::new("id", primitive(PrimitiveType::Int8)))
            .with_column(ResultColumn::new("id", primitive(PrimitiveType::Int8), false))
            .with_column(ResultColumn::new("mood", ColumnType::Enum(qn("mood")), true)),
        )
        .with_statement(
            StatementDef::new(
                "tags_of_user",
                Cardinality::Many,
                "SELECT tag, note FROM pgbind_fixture.tags WHERE user_id = :user_id ORDER BY tag",
                "SELECT tag, note FROM pgbind_fixture.tags WHERE user_id = $1 ORDER BY tag",
            )
            .with_variable(Variable::new("user_id", primitive(PrimitiveType::Int8)))
            .with_column(ResultColumn::new("tag", primitive(PrimitiveType::Text), false))
            .with_column(ResultColumn::new("note", primitive(PrimitiveType::Text), true)),
        )
        .with_statement(
            StatementDef::new(
                "clear_mood",
                Cardinality::Exec,
                "UPDATE pgbind_fixture.users SET mood = NULL WHERE id = :id",
                "UPDATE pgbind_fixture.users SET mood = NULL WHERE id = $1",
            )
            .with_variable(Variable::new("id", primitive(PrimitiveType::Int8))),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let config = DatabaseConfig {
        module: Some("crate::db".to_string()),
        ..DatabaseConfig::new(out_dir.clone())
    }
    .with_events(qn("tags"));

    let files = pgbind_codegen::synthesize(&model(), &config)
        .unwrap_or_else(|e| panic!("synthesis failed: {e}"));
    let source =
        pgbind_codegen::bundle(&files).unwrap_or_else(|e| panic!("bundling failed: {e}"));
    std::fs::write(out_dir.join("db.rs"), source)
        .unwrap_or_else(|e| panic!("cannot write db.rs: {e}"));
}
