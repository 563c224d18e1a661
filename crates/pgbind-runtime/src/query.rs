//! Dynamically built statements over table descriptors.
//!
//! Every parameter is written as `$n::<column type>`, and result columns
//! use [`Column::select_expr`], so rows decode into the generated row types.

use crate::error::{Error, Result};
use crate::table::{select_list, Column, Table};
use crate::value::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{FromRow, PgExecutor};
use tracing::debug;

/// SQL text with its parameter values.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    sql: String,
    values: Vec<Value>,
}

impl SqlStatement {
    /// Create a statement without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            values: Vec::new(),
        }
    }

    /// Get the SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Get the parameter values, in `$n` order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Add a parameter value and return its cast placeholder.
    pub fn bind(&mut self, column: &Column, value: Value) -> String {
        self.values.push(value);
        column.param(self.values.len())
    }

    /// Append SQL text.
    pub fn push_sql(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Encode the parameter values.
    pub fn arguments(&self) -> Result<PgArguments> {
        arguments(&self.values)
    }

    /// Execute and return the number of affected rows.
    pub async fn execute<'e, E: PgExecutor<'e>>(&self, executor: E) -> Result<u64> {
        debug!(sql = %self.sql, params = self.values.len(), "execute");
        let result = sqlx::query_with(&self.sql, self.arguments()?)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Fetch exactly one row.
    pub async fn fetch_one_as<'e, T, E>(&self, executor: E) -> Result<T>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
        E: PgExecutor<'e>,
    {
        debug!(sql = %self.sql, params = self.values.len(), "fetch one");
        let row = sqlx::query_as_with::<_, T, _>(&self.sql, self.arguments()?)
            .fetch_one(executor)
            .await?;
        Ok(row)
    }

    /// Fetch at most one row.
    pub async fn fetch_optional_as<'e, T, E>(&self, executor: E) -> Result<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
        E: PgExecutor<'e>,
    {
        debug!(sql = %self.sql, params = self.values.len(), "fetch optional");
        let row = sqlx::query_as_with::<_, T, _>(&self.sql, self.arguments()?)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    /// Fetch all rows.
    pub async fn fetch_all_as<'e, T, E>(&self, executor: E) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
        E: PgExecutor<'e>,
    {
        debug!(sql = %self.sql, params = self.values.len(), "fetch all");
        let rows = sqlx::query_as_with::<_, T, _>(&self.sql, self.arguments()?)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }
}

/// Encode values as statement arguments.
pub fn arguments(values: &[Value]) -> Result<PgArguments> {
    let mut args = PgArguments::default();
    for value in values {
        value.add_to(&mut args)?;
    }
    Ok(args)
}

fn where_clause(statement: &mut SqlStatement, key: &[(Column, Value)]) {
    if key.is_empty() {
        statement.push_sql(" WHERE TRUE");
        return;
    }
    let mut conditions = Vec::with_capacity(key.len());
    for (column, value) in key {
        let param = statement.bind(column, value.clone());
        conditions.push(format!("{} = {}", column.quoted(), param));
    }
    statement.push_sql(" WHERE ");
    statement.push_sql(&conditions.join(" AND "));
}

/// `INSERT ... RETURNING`. With no assignments every column takes its default.
pub fn insert(table: &Table, returning: &[Column], assignments: &[(Column, Value)]) -> SqlStatement {
    let mut statement = SqlStatement::new(format!("INSERT INTO {}", table.to_sql()));
    if assignments.is_empty() {
        statement.push_sql(" DEFAULT VALUES");
    } else {
        let mut names = Vec::with_capacity(assignments.len());
        let mut params = Vec::with_capacity(assignments.len());
        for (column, value) in assignments {
            names.push(column.quoted());
            params.push(statement.bind(column, value.clone()));
        }
        statement.push_sql(&format!(
            " ({}) VALUES ({})",
            names.join(", "),
            params.join(", ")
        ));
    }
    statement.push_sql(&format!(" RETURNING {}", select_list(returning)));
    statement
}

/// `UPDATE ... SET ... WHERE <key> RETURNING`.
pub fn update(
    table: &Table,
    returning: &[Column],
    assignments: &[(Column, Value)],
    key: &[(Column, Value)],
) -> Result<SqlStatement> {
    if assignments.is_empty() {
        return Err(Error::EmptyUpdate {
            table: table.to_string(),
        });
    }
    let mut statement = SqlStatement::new(format!("UPDATE {} SET ", table.to_sql()));
    let mut sets = Vec::with_capacity(assignments.len());
    for (column, value) in assignments {
        let param = statement.bind(column, value.clone());
        sets.push(format!("{} = {}", column.quoted(), param));
    }
    statement.push_sql(&sets.join(", "));
    where_clause(&mut statement, key);
    statement.push_sql(&format!(" RETURNING {}", select_list(returning)));
    Ok(statement)
}

/// `SELECT ... WHERE <key>`.
pub fn select_by_key(table: &Table, columns: &[Column], key: &[(Column, Value)]) -> SqlStatement {
    let mut statement = SqlStatement::new(format!(
        "SELECT {} FROM {}",
        select_list(columns),
        table.to_sql()
    ));
    where_clause(&mut statement, key);
    statement
}

/// `DELETE ... WHERE <key>`.
pub fn delete_by_key(table: &Table, key: &[(Column, Value)]) -> SqlStatement {
    let mut statement = SqlStatement::new(format!("DELETE FROM {}", table.to_sql()));
    where_clause(&mut statement, key);
    statement
}
