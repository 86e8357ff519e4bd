//! Result-shape inference by executing the compiled query once.
//!
//! There is no schema to consult, so the only way to learn what a `select`
//! returns is to run it. Every placeholder is bound to its resolved default.
//! Statements of every kind are executed, so the connection must point at a
//! database where that is acceptable (a schema-only or disposable instance).

use std::future::Future;

use sqlx::postgres::PgColumn;
use sqlx::{Column, Executor, PgConnection, Row, Statement, TypeInfo};

use super::classify::{Classification, StatementKind};
use super::error::{CompilerError, CompilerResult};
use super::params::Parameter;
use super::sql::probe_sql;
use super::types::{decode_type, TypeTag, Value};

/// A column as reported by the driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeColumn {
    pub name: String,
    /// Driver type name, e.g. `INT4` or `TEXT`.
    pub type_name: String,
}

impl ProbeColumn {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    fn from_pg(column: &PgColumn) -> Self {
        Self::new(column.name(), column.type_info().name())
    }
}

/// A connection that can run one statement with positional bindings and
/// report the columns it produced.
pub trait Probe {
    fn probe(
        &mut self,
        sql: &str,
        bindings: &[Value],
    ) -> impl Future<Output = Result<Vec<ProbeColumn>, sqlx::Error>>;
}

impl Probe for PgConnection {
    fn probe(
        &mut self,
        sql: &str,
        bindings: &[Value],
    ) -> impl Future<Output = Result<Vec<ProbeColumn>, sqlx::Error>> {
        async move {
            let query = bindings
                .iter()
                .fold(sqlx::query(sql), |query, value| value.bind(query));

            if let Some(row) = query.fetch_optional(&mut *self).await? {
                return Ok(row.columns().iter().map(ProbeColumn::from_pg).collect());
            }

            // No row came back; the statement description still carries the shape.
            let statement = (&mut *self).prepare(sql).await?;
            Ok(statement.columns().iter().map(ProbeColumn::from_pg).collect())
        }
    }
}

/// One output column of a select.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultField {
    pub name: String,
    pub ty: TypeTag,
    /// Driver type name the column was reported with.
    pub driver_type: String,
    pub index: usize,
    pub total: usize,
}

impl ResultField {
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }

    /// Whether some Rust type decodes this column without a mismatch.
    pub fn decodes_exactly(&self) -> bool {
        decode_type(&self.driver_type).is_some()
    }

    /// Rust type of the generated field. Driver types without an exact
    /// counterpart fall back to the tag's type and only decode once the
    /// query casts the column (e.g. `price::float8`).
    pub fn rust_type(&self) -> &'static str {
        decode_type(&self.driver_type).unwrap_or_else(|| self.ty.rust_type())
    }
}

/// Runs the probe for `compiled_sql` and returns its result fields.
///
/// Non-select statements are still executed but yield no fields.
pub async fn infer_result_fields<P: Probe>(
    probe: &mut P,
    compiled_sql: &str,
    parameters: &[Parameter],
    classification: &Classification,
) -> CompilerResult<Vec<ResultField>> {
    let sql = probe_sql(compiled_sql, classification.limited);
    let bindings: Vec<Value> = parameters.iter().map(|p| p.default.clone()).collect();

    tracing::debug!(%sql, bindings = bindings.len(), "probing query");
    let columns = probe
        .probe(&sql, &bindings)
        .await
        .map_err(|source| CompilerError::probe_failed(sql.clone(), source))?;

    if classification.kind != StatementKind::Select {
        return Ok(Vec::new());
    }

    let total = columns.len();
    let fields: Vec<ResultField> = columns
        .into_iter()
        .enumerate()
        .map(|(index, column)| ResultField {
            ty: TypeTag::from_driver_type(&column.type_name),
            name: column.name,
            driver_type: column.type_name,
            index,
            total,
        })
        .collect();

    for field in fields.iter().filter(|f| !f.decodes_exactly()) {
        tracing::warn!(
            column = %field.name,
            driver_type = %field.driver_type,
            fallback = field.rust_type(),
            "column type has no exact Rust counterpart, cast it in the query"
        );
    }

    Ok(fields)
}
