//! Statement description through the server's prepare step.

use crate::catalog::PgCatalog;
use crate::error::{Error, Result};
use pgbind_core::{ResultColumn, StatementDef, Variable};
use pgbind_lang::ParsedStatement;
use sqlx::{Column, Executor};
use tracing::debug;

impl PgCatalog {
    /// Prepare a parsed statement and read its parameter and result types.
    ///
    /// Result columns whose nullability the server cannot infer are
    /// treated as nullable.
    pub fn describe_statement(&mut self, parsed: &ParsedStatement) -> Result<StatementDef> {
        let described = self
            .block_on(self.pool().describe(&parsed.positional_sql))
            .map_err(|source| Error::Describe {
                statement: parsed.name.clone(),
                source,
            })?;

        let param_oids = described
            .parameters()
            .and_then(|p| p.left())
            .map(|types| types.iter().map(|t| t.oid()).collect::<Vec<_>>())
            .unwrap_or_default();
        if param_oids.len() != parsed.parameters.len() {
            return Err(pgbind_core::Error::Introspection(format!(
                "statement {} declares {} parameters but the server reports {}",
                parsed.name,
                parsed.parameters.len(),
                param_oids.len()
            ))
            .into());
        }

        let columns: Vec<_> = described
            .columns()
            .iter()
            .enumerate()
            .map(|(i, c)| {
                (
                    c.name().to_string(),
                    c.type_info().oid(),
                    described.nullable(i).unwrap_or(true),
                )
            })
            .collect();

        let mut statement = StatementDef::new(
            parsed.name.clone(),
            parsed.cardinality,
            parsed.sql.clone(),
            parsed.positional_sql.clone(),
        );
        for (param, oid) in parsed.parameters.iter().zip(param_oids) {
            let oid = oid.ok_or_else(|| unresolved(&parsed.name, &param.name))?;
            let mut variable = Variable::new(param.name.clone(), self.resolve(oid)?);
            if param.nullable {
                variable = variable.nullable();
            }
            statement = statement.with_variable(variable);
        }
        for (name, oid, nullable) in columns {
            let oid = oid.ok_or_else(|| unresolved(&parsed.name, &name))?;
            statement = statement.with_column(ResultColumn::new(name, self.resolve(oid)?, nullable));
        }

        debug!(
            statement = %parsed.name,
            variables = statement.variables.len(),
            columns = statement.columns.len(),
            "described statement"
        );
        Ok(statement)
    }
}

fn unresolved(statement: &str, item: &str) -> Error {
    pgbind_core::Error::Introspection(format!(
        "statement {statement}: type of {item} has no OID"
    ))
    .into()
}
