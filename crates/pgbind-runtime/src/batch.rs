//! Keyed batch updates sharing one statement template.

use crate::error::{Error, Result};
use crate::query::arguments;
use crate::table::{Column, Row, Table};
use crate::value::Value;
use sqlx::PgConnection;
use tracing::debug;

/// One `UPDATE` template and the per-row parameter values.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchUpdate {
    sql: String,
    params: Vec<Vec<Value>>,
}

impl BatchUpdate {
    /// Build the template from the first row's non-key columns.
    ///
    /// Every row must carry all key columns plus the same set of data
    /// columns. Returns `None` when there are no rows.
    pub fn build(table: &Table, key_columns: &[Column], rows: &[Row]) -> Result<Option<Self>> {
        if key_columns.is_empty() {
            return Err(Error::NoKeyColumns {
                table: table.to_string(),
            });
        }
        let Some(first) = rows.first() else {
            return Ok(None);
        };

        for key in key_columns {
            if first.get(key.name).is_none() {
                return Err(Error::MissingKeyColumn {
                    table: table.to_string(),
                    column: key.name.to_string(),
                });
            }
        }
        let is_key = |column: &Column| key_columns.iter().any(|k| k.name == column.name);
        let data: Vec<Column> = first.columns().filter(|c| !is_key(c)).copied().collect();
        if data.is_empty() {
            return Err(Error::NoUpdatableColumns {
                table: table.to_string(),
            });
        }

        let mut index = 0;
        let mut next = |column: &Column| {
            index += 1;
            column.param(index)
        };
        let sets: Vec<String> = data
            .iter()
            .map(|c| format!("{} = {}", c.quoted(), next(c)))
            .collect();
        let conditions: Vec<String> = key_columns
            .iter()
            .map(|c| format!("{} = {}", c.quoted(), next(c)))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            table.to_sql(),
            sets.join(", "),
            conditions.join(" AND ")
        );

        let expected = first.column_names();
        let mut params = Vec::with_capacity(rows.len());
        for row in rows {
            if row.column_names() != expected {
                return Err(Error::InconsistentColumns {
                    table: table.to_string(),
                });
            }
            let values = data
                .iter()
                .chain(key_columns)
                .map(|c| row.get(c.name).cloned().unwrap_or(Value::Null))
                .collect();
            params.push(values);
        }

        Ok(Some(Self { sql, params }))
    }

    /// Get the statement template.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Get the parameter values of each row.
    pub fn params(&self) -> &[Vec<Value>] {
        &self.params
    }

    /// Execute once per row on `conn` and sum the affected counts.
    pub async fn execute(&self, conn: &mut PgConnection) -> Result<u64> {
        debug!(sql = %self.sql, rows = self.params.len(), "batch update");
        let mut total = 0;
        for values in &self.params {
            let result = sqlx::query_with(&self.sql, arguments(values)?)
                .execute(&mut *conn)
                .await?;
            total += result.rows_affected();
        }
        Ok(total)
    }
}

/// Update `rows` of `table` by `key_columns`; returns total affected rows.
///
/// Zero rows return 0 without touching the database.
pub async fn batch_update(
    conn: &mut PgConnection,
    table: &Table,
    key_columns: &[Column],
    rows: &[Row],
) -> Result<u64> {
    match BatchUpdate::build(table, key_columns, rows)? {
        Some(batch) => batch.execute(conn).await,
        None => Ok(0),
    }
}
