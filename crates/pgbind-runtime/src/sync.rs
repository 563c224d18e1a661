//! Reconcile a table partition against a set of rows in one statement.
//!
//! The partition is the set of rows whose key columns equal the given
//! values. After a sync the partition holds exactly the given rows: rows
//! missing from the table are inserted, rows missing from the input are
//! deleted, and identical rows are left alone. Rows are compared on every
//! column with `IS NOT DISTINCT FROM`, so `json` columns (which have no
//! equality operator) cannot take part in a sync.

use crate::error::{Error, Result};
use crate::query::SqlStatement;
use crate::table::{Column, Row, Table};
use crate::value::Value;
use sqlx::PgExecutor;
use tracing::debug;

/// Row counts changed by a sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub inserted: u64,
    pub deleted: u64,
}

/// A built sync statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatement {
    /// No input rows: delete the whole partition.
    Delete(SqlStatement),
    /// Insert and delete through data-modifying CTEs; selects both counts.
    Reconcile(SqlStatement),
}

impl SyncStatement {
    /// Build the statement for `rows` within `partition`.
    pub fn build(table: &Table, partition: &Row, rows: &[Row]) -> Result<Self> {
        let Some(first) = rows.first() else {
            let mut statement = SqlStatement::new(format!("DELETE FROM {}", table.to_sql()));
            let predicate = partition_predicate(&mut statement, partition, None);
            statement.push_sql(&format!(" WHERE {predicate}"));
            return Ok(SyncStatement::Delete(statement));
        };

        let columns: Vec<Column> = first.columns().copied().collect();
        if columns.is_empty() {
            return Err(Error::InconsistentColumns {
                table: table.to_string(),
            });
        }
        let names = first.column_names();
        for row in rows {
            check_partition(table, partition, row)?;
            if row.column_names() != names {
                return Err(Error::InconsistentColumns {
                    table: table.to_string(),
                });
            }
        }

        let quoted: Vec<String> = columns.iter().map(Column::quoted).collect();
        let column_list = quoted.join(", ");
        let matches = |left: &str, right: &str| {
            quoted
                .iter()
                .map(|c| format!("{left}.{c} IS NOT DISTINCT FROM {right}.{c}"))
                .collect::<Vec<_>>()
                .join(" AND ")
        };

        let mut statement = SqlStatement::new("WITH source (");
        statement.push_sql(&column_list);
        statement.push_sql(") AS (VALUES ");
        let mut tuples = Vec::with_capacity(rows.len());
        for row in rows {
            let params: Vec<String> = row
                .iter()
                .map(|(column, value)| statement.bind(column, value.clone()))
                .collect();
            tuples.push(format!("({})", params.join(", ")));
        }
        statement.push_sql(&tuples.join(", "));
        statement.push_sql("), ");

        let predicate = partition_predicate(&mut statement, partition, Some("target"));
        statement.push_sql(&format!(
            "removed AS (DELETE FROM {table} AS target WHERE {predicate} AND NOT EXISTS \
             (SELECT 1 FROM source WHERE {source_match}) RETURNING 1), \
             added AS (INSERT INTO {table} ({column_list}) SELECT DISTINCT {column_list} \
             FROM source WHERE NOT EXISTS (SELECT 1 FROM {table} AS target WHERE {predicate} \
             AND {target_match}) RETURNING 1) \
             SELECT (SELECT count(*) FROM added)::int8, (SELECT count(*) FROM removed)::int8",
            table = table.to_sql(),
            source_match = matches("source", "target"),
            target_match = matches("target", "source"),
        ));
        Ok(SyncStatement::Reconcile(statement))
    }

    /// The underlying statement.
    pub fn statement(&self) -> &SqlStatement {
        match self {
            SyncStatement::Delete(statement) | SyncStatement::Reconcile(statement) => statement,
        }
    }

    /// Run the statement.
    pub async fn execute<'e, E: PgExecutor<'e>>(&self, executor: E) -> Result<SyncOutcome> {
        match self {
            SyncStatement::Delete(statement) => {
                let deleted = statement.execute(executor).await?;
                Ok(SyncOutcome {
                    inserted: 0,
                    deleted,
                })
            }
            SyncStatement::Reconcile(statement) => {
                let (inserted, deleted): (i64, i64) = statement.fetch_one_as(executor).await?;
                Ok(SyncOutcome {
                    inserted: inserted.max(0) as u64,
                    deleted: deleted.max(0) as u64,
                })
            }
        }
    }
}

/// Make the `partition` rows of `table` equal `rows`.
///
/// Runs as one statement inside whatever transaction `executor` belongs to.
pub async fn sync<'e, E: PgExecutor<'e>>(
    executor: E,
    table: &Table,
    partition: &Row,
    rows: &[Row],
) -> Result<SyncOutcome> {
    let statement = SyncStatement::build(table, partition, rows)?;
    let outcome = statement.execute(executor).await?;
    debug!(
        table = %table,
        rows = rows.len(),
        inserted = outcome.inserted,
        deleted = outcome.deleted,
        "synced partition"
    );
    Ok(outcome)
}

fn check_partition(table: &Table, partition: &Row, row: &Row) -> Result<()> {
    for (column, expected) in partition.iter() {
        match row.get(column.name) {
            None => {
                return Err(Error::MissingKeyColumn {
                    table: table.to_string(),
                    column: column.name.to_string(),
                })
            }
            Some(actual) if actual != expected => {
                return Err(Error::RowOutsidePartition {
                    table: table.to_string(),
                    column: column.name.to_string(),
                })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn partition_predicate(statement: &mut SqlStatement, partition: &Row, alias: Option<&str>) -> String {
    if partition.is_empty() {
        return "TRUE".to_string();
    }
    let prefix = alias.map(|a| format!("{a}.")).unwrap_or_default();
    partition
        .iter()
        .map(|(column, value)| {
            let param = statement.bind(column, value.clone());
            if matches!(value, Value::Null) {
                format!("{prefix}{} IS NOT DISTINCT FROM {param}", column.quoted())
            } else {
                format!("{prefix}{} = {param}", column.quoted())
            }
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TAGS: Table = Table::new("public", "post_tags");
    const POST: Column = Column::new("post_id", "int8");
    const TAG: Column = Column::new("tag", "text");

    fn partition() -> Row {
        Row::new().with(POST, &1i64)
    }

    fn tag(name: &str) -> Row {
        partition().with(TAG, name)
    }

    #[test]
    fn test_empty_rows_delete_partition() {
        let statement = SyncStatement::build(&TAGS, &partition(), &[]).unwrap();
        assert!(matches!(statement, SyncStatement::Delete(_)));
        assert_eq!(
            statement.statement().sql(),
            "DELETE FROM \"public\".\"post_tags\" WHERE \"post_id\" = $1::int8"
        );
    }

    #[test]
    fn test_reconcile_statement() {
        let statement = SyncStatement::build(&TAGS, &partition(), &[tag("a"), tag("b")]).unwrap();
        let sql = statement.statement().sql();
        assert!(sql.starts_with(
            "WITH source (\"post_id\", \"tag\") AS (VALUES ($1::int8, $2::text), ($3::int8, $4::text)), "
        ));
        assert!(sql.contains(
            "removed AS (DELETE FROM \"public\".\"post_tags\" AS target WHERE target.\"post_id\" = $5::int8"
        ));
        assert!(sql.contains("source.\"tag\" IS NOT DISTINCT FROM target.\"tag\""));
        assert!(sql.ends_with("(SELECT count(*) FROM removed)::int8"));
        assert_eq!(statement.statement().values().len(), 5);
    }

    #[test]
    fn test_inconsistent_columns() {
        let err = SyncStatement::build(&TAGS, &partition(), &[tag("a"), partition()]).unwrap_err();
        assert!(matches!(err, Error::InconsistentColumns { .. }));
    }

    #[test]
    fn test_row_outside_partition() {
        let stray = Row::new().with(POST, &2i64).with(TAG, "a");
        let err = SyncStatement::build(&TAGS, &partition(), &[stray]).unwrap_err();
        assert!(matches!(err, Error::RowOutsidePartition { ref column, .. } if column == "post_id"));
    }

    #[test]
    fn test_missing_key_column() {
        let bare = Row::new().with(TAG, "a");
        let err = SyncStatement::build(&TAGS, &partition(), &[bare]).unwrap_err();
        assert!(matches!(err, Error::MissingKeyColumn { .. }));
    }

    #[test]
    fn test_whole_table_partition() {
        let statement = SyncStatement::build(&TAGS, &Row::new(), &[]).unwrap();
        assert_eq!(
            statement.statement().sql(),
            "DELETE FROM \"public\".\"post_tags\" WHERE TRUE"
        );
    }
}
