//! End-to-end synthesis tests over an in-memory spec model.

use pgbind_codegen::{bundle, synthesize, GeneratedFile, HEADER};
use pgbind_core::{
    Cardinality, CheckConstraint, ColumnDef, ColumnType, CompositeDef, DatabaseConfig,
    DatabaseSpec, DomainDef, EnumDef, ForeignKey, PrimaryKey, PrimitiveType, QualifiedName,
    ResultColumn, StatementDef, TableDef, Variable,
};
use pretty_assertions::assert_eq;

fn qn(s: &str) -> QualifiedName {
    s.parse().unwrap()
}

fn text() -> ColumnType {
    ColumnType::Primitive(PrimitiveType::Text)
}

fn users() -> TableDef {
    TableDef::new(qn("public.users"))
        .with_column(ColumnDef::new(1, "id", ColumnType::Primitive(PrimitiveType::Int8)))
        .with_column(ColumnDef::new(
            2,
            "email",
            ColumnType::domain(qn("public.email"), ColumnType::Primitive(PrimitiveType::Citext)),
        ))
        .with_column(ColumnDef::new(3, "mood", ColumnType::Enum(qn("public.mood"))).nullable())
        .with_column(
            ColumnDef::new(4, "home", ColumnType::Composite(qn("public.address"))).nullable(),
        )
        .with_column(
            ColumnDef::new(5, "createdAt", ColumnType::Primitive(PrimitiveType::Timestamptz))
                .with_default("now()"),
        )
        .with_primary_key(PrimaryKey::new("users_pkey", ["id"]))
}

fn posts() -> TableDef {
    TableDef::new(qn("public.posts"))
        .with_column(ColumnDef::new(1, "id", ColumnType::Primitive(PrimitiveType::Uuid)))
        .with_column(ColumnDef::new(2, "author_id", ColumnType::Primitive(PrimitiveType::Int8)))
        .with_column(ColumnDef::new(3, "body", text()))
        .with_primary_key(PrimaryKey::new("posts_pkey", ["id"]))
        .with_foreign_key(ForeignKey::new(
            "posts_author_id_fkey",
            ["author_id"],
            qn("public.users"),
            ["id"],
        ))
}

fn audit_log() -> TableDef {
    TableDef::new(qn("audit.log"))
        .with_column(ColumnDef::new(1, "type", text()))
        .with_column(ColumnDef::new(2, "detail", ColumnType::Primitive(PrimitiveType::Jsonb)).nullable())
}

fn sample_spec() -> DatabaseSpec {
    DatabaseSpec::new()
        .with_table(users())
        .with_table(posts())
        .with_table(audit_log())
        .with_enum(EnumDef::new(qn("public.mood"), ["happy", "so-so", "sad"]))
        .with_composite(
            CompositeDef::new(qn("public.address"))
                .with_field(ColumnDef::new(1, "street", text()).nullable())
                .with_field(ColumnDef::new(2, "city", text()).nullable()),
        )
        .with_domain(
            DomainDef::new(qn("public.email"), ColumnType::Primitive(PrimitiveType::Citext))
                .not_null()
                .with_check(CheckConstraint::new("email_check", "CHECK (VALUE ~ '@')")),
        )
        .with_statement(
            StatementDef::new(
                "posts_by_author",
                Cardinality::Many,
                "SELECT id, body FROM posts WHERE author_id = :author",
                "SELECT id, body FROM posts WHERE author_id = $1",
            )
            .with_variable(Variable::new("author", ColumnType::Primitive(PrimitiveType::Int8)))
            .with_column(ResultColumn::new("id", ColumnType::Primitive(PrimitiveType::Uuid), false))
            .with_column(ResultColumn::new("body", text(), false)),
        )
        .with_statement(
            StatementDef::new(
                "touch_user",
                Cardinality::Exec,
                "UPDATE users SET mood = NULL WHERE id = :id",
                "UPDATE users SET mood = NULL WHERE id = $1",
            )
            .with_variable(Variable::new("id", ColumnType::Primitive(PrimitiveType::Int8))),
        )
}

fn config() -> DatabaseConfig {
    DatabaseConfig::new("src/db").with_events(qn("public.posts"))
}

fn file<'a>(files: &'a [GeneratedFile], path: &str) -> &'a str {
    files
        .iter()
        .find(|f| f.path == path)
        .map(|f| f.content.as_str())
        .unwrap_or_else(|| panic!("{path} was not generated"))
}

#[test]
fn test_output_tree() {
    let files = synthesize(&sample_spec(), &config()).unwrap();
    let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        [
            "audit/mod.rs",
            "audit/tables/log.rs",
            "audit/tables/mod.rs",
            "mod.rs",
            "public/composites/address.rs",
            "public/composites/mod.rs",
            "public/domains/email.rs",
            "public/domains/mod.rs",
            "public/enums/mod.rs",
            "public/enums/mood.rs",
            "public/mod.rs",
            "public/tables/mod.rs",
            "public/tables/posts.rs",
            "public/tables/users.rs",
            "statements/mod.rs",
            "statements/posts_by_author.rs",
            "statements/touch_user.rs",
        ]
    );
    for f in &files {
        assert!(f.content.starts_with(HEADER), "{} has no header", f.path);
    }
}

#[test]
fn test_module_files() {
    let files = synthesize(&sample_spec(), &config()).unwrap();

    let root = file(&files, "mod.rs");
    assert!(root.contains("pub mod audit;"));
    assert!(root.contains("pub mod public;"));
    assert!(root.contains("pub mod statements;"));

    let public = file(&files, "public/mod.rs");
    for category in ["tables", "enums", "composites", "domains"] {
        assert!(public.contains(&format!("pub mod {category};")));
    }
    let audit = file(&files, "audit/mod.rs");
    assert!(audit.contains("pub mod tables;"));
    assert!(!audit.contains("pub mod enums;"));

    let tables = file(&files, "public/tables/mod.rs");
    assert!(tables.contains("pub mod posts;\npub mod users;"));
}

#[test]
fn test_table_bindings() {
    let files = synthesize(&sample_spec(), &config()).unwrap();
    let users = file(&files, "public/tables/users.rs");

    assert!(users.contains("pub const TABLE: ::pgbind_runtime::Table"));
    assert!(users.contains("pub mod columns"));
    assert!(users.contains(r#".read_as("text")"#));
    assert!(users.contains("pub struct Users {"));
    assert!(users.contains("pub struct UsersCreate {"));
    assert!(users.contains("pub struct UsersUpdate {"));
    assert!(users.contains("crate::db::public::enums::mood::Mood"));
    assert!(users.contains("crate::db::public::composites::address::Address"));
    assert!(users.contains("crate::db::public::domains::email::Email"));
    assert!(users.contains(r#"#[sqlx(rename = "createdAt")]"#));
    assert!(users.contains("pub created_at:"));
    assert!(users.contains("pub async fn find_by_pk"));
    assert!(users.contains("pub async fn update_by_pk"));
    assert!(users.contains("pub async fn delete_by_pk"));
    assert!(users.contains("pub async fn batch_update"));
    assert!(users.contains("pub fn to_row"));
    assert!(!users.contains("UsersEvent"));
}

#[test]
fn test_table_without_primary_key() {
    let files = synthesize(&sample_spec(), &config()).unwrap();
    let log = file(&files, "audit/tables/log.rs");

    assert!(log.contains("pub r#type:"));
    assert!(log.contains("pub async fn sync"));
    assert!(log.contains("pub async fn insert"));
    assert!(!log.contains("find_by_pk"));
    assert!(!log.contains("update_by_pk"));
    assert!(!log.contains("batch_update"));
}

#[test]
fn test_event_type_uses_key_columns() {
    let files = synthesize(&sample_spec(), &config()).unwrap();
    let posts = file(&files, "public/tables/posts.rs");

    assert!(posts.contains("pub struct PostsEvent {"));
    assert!(posts.contains("impl ::pgbind_runtime::EventEntity for PostsEvent"));
    let event = &posts[posts.find("pub struct PostsEvent").unwrap()..];
    let event = &event[..event.find('}').unwrap()];
    assert!(event.contains("pub id:"));
    assert!(event.contains("pub author_id:"));
    assert!(!event.contains("pub body:"));
}

#[test]
fn test_configured_event_columns() {
    let mut config = config();
    config
        .event_columns
        .insert(qn("public.posts"), vec!["body".to_string()]);
    let files = synthesize(&sample_spec(), &config).unwrap();
    let posts = file(&files, "public/tables/posts.rs");
    let event = &posts[posts.find("pub struct PostsEvent").unwrap()..];
    let event = &event[..event.find('}').unwrap()];
    assert!(event.contains("pub body:"));
    assert!(!event.contains("pub id:"));

    config
        .event_columns
        .insert(qn("public.posts"), vec!["missing".to_string()]);
    let err = synthesize(&sample_spec(), &config).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("missing"));
}

#[test]
fn test_enum_bindings() {
    let files = synthesize(&sample_spec(), &config()).unwrap();
    let mood = file(&files, "public/enums/mood.rs");

    assert!(mood.contains("pub enum Mood {"));
    assert!(mood.contains("SoSo,"));
    assert!(mood.contains(r#"Mood::SoSo => "so-so""#));
    assert!(mood.contains("pub fn from_label"));
    assert!(mood.contains("pub const ALL: [Mood; 3]"));
    assert!(mood.contains("impl ::sqlx::Type<::sqlx::Postgres> for Mood"));
}

#[test]
fn test_composite_and_domain_bindings() {
    let files = synthesize(&sample_spec(), &config()).unwrap();

    let address = file(&files, "public/composites/address.rs");
    assert!(address.contains("pub struct Address {"));
    assert!(address.contains("impl ::std::fmt::Display for Address"));
    assert!(address.contains("impl ::std::str::FromStr for Address"));

    let email = file(&files, "public/domains/email.rs");
    assert!(email.contains("pub struct Email(pub ::std::string::String);"));
    assert!(email.contains("#[sqlx(transparent)]"));
    assert!(email.contains("email_check"));
}

#[test]
fn test_statement_bindings() {
    let files = synthesize(&sample_spec(), &config()).unwrap();

    let many = file(&files, "statements/posts_by_author.rs");
    assert!(many.contains("pub struct PostsByAuthorRow {"));
    assert!(many.contains("pub fn posts_by_author<'e, E>"));
    assert!(many.contains("::futures::stream::BoxStream<'e"));
    assert!(many.contains(r#"pub const SQL: &str = "SELECT id, body FROM posts WHERE author_id = $1";"#));

    let exec = file(&files, "statements/touch_user.rs");
    assert!(exec.contains("pub async fn touch_user"));
    assert!(exec.contains("::pgbind_runtime::Result<u64>"));
    assert!(!exec.contains("Row {"));
}

#[test]
fn test_output_is_deterministic() {
    let first = synthesize(&sample_spec(), &config()).unwrap();

    let mut shuffled = sample_spec();
    shuffled.tables.reverse();
    shuffled.statements.reverse();
    shuffled.tables[0].columns.reverse();
    let second = synthesize(&shuffled, &config()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_domain_with_custom_mapping_is_skipped() {
    let config = config().with_type(qn("public.email"), "crate::Email");
    let files = synthesize(&sample_spec(), &config).unwrap();

    assert!(files.iter().all(|f| !f.path.starts_with("public/domains")));
    assert!(!file(&files, "public/mod.rs").contains("pub mod domains;"));
    assert!(file(&files, "public/tables/users.rs").contains("crate::Email"));
}

#[test]
fn test_enum_override() {
    let mut config = config();
    config
        .enum_overrides
        .insert(qn("public.mood"), "crate::Mood".to_string());
    let files = synthesize(&sample_spec(), &config).unwrap();

    assert!(files.iter().all(|f| f.path != "public/enums/mood.rs"));
    assert!(file(&files, "public/tables/users.rs").contains("crate::Mood"));
}

#[test]
fn test_column_override_keeps_nullability() {
    let mut config = config();
    config
        .columns
        .insert("audit.log.detail".to_string(), "crate::Detail".to_string());
    let files = synthesize(&sample_spec(), &config).unwrap();
    let log = file(&files, "audit/tables/log.rs");
    assert!(log.contains("::std::option::Option<crate::Detail>"));
}

#[test]
fn test_unknown_reference_is_a_configuration_error() {
    let spec = DatabaseSpec::new().with_table(
        TableDef::new(qn("public.points"))
            .with_column(ColumnDef::new(1, "at", ColumnType::Reference(qn("public.geometry")))),
    );
    let err = synthesize(&spec, &DatabaseConfig::new("src/db")).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("public.geometry"));
}

#[test]
fn test_reference_resolves_to_model_type() {
    let spec = DatabaseSpec::new()
        .with_enum(EnumDef::new(qn("public.mood"), ["ok"]))
        .with_table(
            TableDef::new(qn("public.feelings"))
                .with_column(ColumnDef::new(1, "mood", ColumnType::Reference(qn("public.mood")))),
        );
    let files = synthesize(&spec, &DatabaseConfig::new("src/db")).unwrap();
    assert!(file(&files, "public/tables/feelings.rs").contains("crate::db::public::enums::mood::Mood"));
}

#[test]
fn test_custom_module_path() {
    let mut config = config();
    config.module = Some("crate::generated::pg".to_string());
    let files = synthesize(&sample_spec(), &config).unwrap();
    assert!(file(&files, "public/tables/users.rs")
        .contains("crate::generated::pg::public::enums::mood::Mood"));
}

#[test]
fn test_empty_model() {
    let files = synthesize(&DatabaseSpec::new(), &DatabaseConfig::new("src/db")).unwrap();
    let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, ["mod.rs"]);
}

#[test]
fn test_bundle_sample_tree() {
    let files = synthesize(&sample_spec(), &config()).unwrap();
    let text = bundle(&files).unwrap();

    assert!(text.starts_with(HEADER));
    assert!(!text.contains("#!["));
    for module in ["pub mod audit {", "pub mod tables {", "pub mod users {", "pub mod touch_user {"] {
        assert!(text.contains(module), "{module} is not inlined");
    }
    assert!(text.contains("pub struct PostsEvent {"));
    assert!(!text.contains("pub mod tables;"));
    assert_eq!(bundle(&files).unwrap(), text);
}
