//! Sync and batch update against a live PostgreSQL.
//!
//! Set DATABASE_URL to run; the tests return early otherwise.

use pgbind_runtime::{batch_update, sync, Column, Row, SyncOutcome, Table};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

const TAGS: Table = Table::new("pg_temp", "pgbind_tags");
const POST: Column = Column::new("post_id", "int8");
const TAG: Column = Column::new("tag", "text");
const NOTE: Column = Column::new("note", "text");

async fn connect() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .expect("Failed to connect to PostgreSQL");
    Some(pool)
}

async fn setup(pool: &PgPool) -> Transaction<'static, Postgres> {
    let mut tx = pool.begin().await.unwrap();
    sqlx::query(
        "CREATE TEMP TABLE pgbind_tags (post_id int8 NOT NULL, tag text NOT NULL, note text) \
         ON COMMIT DROP",
    )
    .execute(&mut *tx)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO pgbind_tags VALUES (1, 'a', NULL), (1, 'b', NULL), (1, 'c', 'x'), (2, 'a', NULL)",
    )
    .execute(&mut *tx)
    .await
    .unwrap();
    tx
}

fn tag(post: i64, name: &str, note: Option<&str>) -> Row {
    Row::new()
        .with(POST, &post)
        .with(TAG, name)
        .with(NOTE, &note.map(str::to_string))
}

async fn tags(tx: &mut Transaction<'static, Postgres>, post: i64) -> Vec<(String, Option<String>)> {
    sqlx::query_as("SELECT tag, note FROM pgbind_tags WHERE post_id = $1 ORDER BY tag")
        .bind(post)
        .fetch_all(&mut **tx)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_sync_reconciles_partition() {
    let Some(pool) = connect().await else {
        return;
    };
    let mut tx = setup(&pool).await;
    let partition = Row::new().with(POST, &1i64);
    let rows = [tag(1, "b", None), tag(1, "c", Some("x")), tag(1, "d", None)];

    let outcome = sync(&mut *tx, &TAGS, &partition, &rows).await.unwrap();
    assert_eq!(
        outcome,
        SyncOutcome {
            inserted: 1,
            deleted: 1
        }
    );
    assert_eq!(
        tags(&mut tx, 1).await,
        vec![
            ("b".to_string(), None),
            ("c".to_string(), Some("x".to_string())),
            ("d".to_string(), None),
        ]
    );
    // Other partitions are untouched.
    assert_eq!(tags(&mut tx, 2).await.len(), 1);

    let again = sync(&mut *tx, &TAGS, &partition, &rows).await.unwrap();
    assert_eq!(again, SyncOutcome::default());
}

#[tokio::test]
async fn test_sync_with_no_rows_clears_partition() {
    let Some(pool) = connect().await else {
        return;
    };
    let mut tx = setup(&pool).await;
    let partition = Row::new().with(POST, &1i64);

    let outcome = sync(&mut *tx, &TAGS, &partition, &[]).await.unwrap();
    assert_eq!(
        outcome,
        SyncOutcome {
            inserted: 0,
            deleted: 3
        }
    );
    assert!(tags(&mut tx, 1).await.is_empty());
    assert_eq!(tags(&mut tx, 2).await.len(), 1);
}

#[tokio::test]
async fn test_batch_update_two_rows() {
    let Some(pool) = connect().await else {
        return;
    };
    let mut tx = setup(&pool).await;
    let rows = [
        Row::new().with(POST, &1i64).with(NOTE, "first"),
        Row::new().with(POST, &2i64).with(NOTE, "second"),
    ];

    let updated = batch_update(&mut tx, &TAGS, &[POST], &rows).await.unwrap();
    assert_eq!(updated, 4);
    assert_eq!(tags(&mut tx, 2).await, vec![("a".to_string(), Some("second".to_string()))]);

    let none = batch_update(&mut tx, &TAGS, &[POST], &[]).await.unwrap();
    assert_eq!(none, 0);
}
