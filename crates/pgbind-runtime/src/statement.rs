//! Cardinality helpers for generated named statements.

use crate::error::{Error, Result, RowCount};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::{Query, QueryAs};
use sqlx::{FromRow, PgExecutor, Postgres};
use tracing::debug;

/// Run a `:one` statement, failing unless it yields exactly one row.
pub async fn fetch_exactly_one<'q, 'c, T, E>(
    statement: &'static str,
    query: QueryAs<'q, Postgres, T, PgArguments>,
    executor: E,
) -> Result<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    E: PgExecutor<'c>,
{
    debug!(statement, "fetch exactly one");
    let mut rows = query.fetch(executor);
    let first = rows.try_next().await?.ok_or(Error::RowCount {
        statement,
        count: RowCount::Zero,
    })?;
    if rows.try_next().await?.is_some() {
        return Err(Error::RowCount {
            statement,
            count: RowCount::Many,
        });
    }
    Ok(first)
}

/// Run a `:many` statement as a lazy stream of rows.
///
/// Nothing is sent until the stream is polled; each call runs the statement
/// again.
pub fn fetch_many<'e, T, E>(
    statement: &'static str,
    query: QueryAs<'e, Postgres, T, PgArguments>,
    executor: E,
) -> BoxStream<'e, Result<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'e,
    E: PgExecutor<'e> + 'e,
{
    debug!(statement, "fetch many");
    query.fetch(executor).map_err(Error::from).boxed()
}

/// Run an `:exec` statement and return the affected row count.
pub async fn execute<'q, 'c, E>(
    statement: &'static str,
    query: Query<'q, Postgres, PgArguments>,
    executor: E,
) -> Result<u64>
where
    E: PgExecutor<'c>,
{
    debug!(statement, "execute");
    let result = query.execute(executor).await?;
    Ok(result.rows_affected())
}
