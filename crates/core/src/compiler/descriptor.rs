//! Assembly of the per-query descriptor.
//!
//! [`prepare`] runs the text-only stages and [`PreparedQuery::infer`] adds
//! the probed result shape. A text error stops a file before it reaches the
//! database.

use super::annotation::{parse_file, Directives};
use super::classify::{classify, Classification, StatementKind};
use super::error::CompilerResult;
use super::params::{extract_parameters, Parameter};
use super::probe::{infer_result_fields, Probe, ResultField};
use super::sql::compile_sql;

/// The generated result type and its fields in column order.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultShape {
    pub name: String,
    pub fields: Vec<ResultField>,
}

impl ResultShape {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Everything the renderer needs to know about one query.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryDescriptor {
    /// File-derived identifier.
    pub name: String,
    /// SQL with positional `$n` markers.
    pub sql: String,
    pub parameters: Vec<Parameter>,
    pub result: ResultShape,
    pub kind: StatementKind,
    pub batch_parameter: bool,
    pub batch_result: bool,
    pub limited: bool,
}

/// A query after the text-only stages, before the probe.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedQuery {
    pub name: String,
    pub directives: Directives,
    pub sql: String,
    pub parameters: Vec<Parameter>,
    pub classification: Classification,
}

/// `findById` becomes `FindByIdResult`.
///
/// Only the first letter of each `_`, `-` or space separated segment is
/// upper-cased; the rest keeps its case, so `findByID` becomes
/// `FindByIDResult`.
pub fn result_type_name(query_name: &str) -> String {
    let mut name = String::with_capacity(query_name.len() + 6);
    for segment in query_name.split(['_', '-', ' ']) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    name.push_str("Result");
    name
}

/// Runs every stage that does not touch the database.
pub fn prepare(name: &str, content: &str) -> CompilerResult<PreparedQuery> {
    let parsed = parse_file(content)?;
    let parameters = extract_parameters(&parsed.sql, &parsed.directives);
    let classification = classify(&parsed.sql, &parsed.directives)?;
    let sql = compile_sql(&parsed.sql);

    tracing::debug!(
        query = name,
        kind = %classification.kind,
        parameters = parameters.len(),
        "prepared query"
    );

    Ok(PreparedQuery {
        name: name.to_string(),
        directives: parsed.directives,
        sql,
        parameters,
        classification,
    })
}

impl PreparedQuery {
    /// Probes the query on `probe` and assembles the descriptor.
    pub async fn infer<P: Probe>(self, probe: &mut P) -> CompilerResult<QueryDescriptor> {
        let fields =
            infer_result_fields(probe, &self.sql, &self.parameters, &self.classification).await?;

        Ok(QueryDescriptor {
            result: ResultShape {
                name: result_type_name(&self.name),
                fields,
            },
            name: self.name,
            sql: self.sql,
            parameters: self.parameters,
            kind: self.classification.kind,
            batch_parameter: self.classification.batch_parameter,
            batch_result: self.classification.batch_result,
            limited: self.classification.limited,
        })
    }
}

/// Compiles one query file into its descriptor.
pub async fn build<P: Probe>(name: &str, content: &str, probe: &mut P) -> CompilerResult<QueryDescriptor> {
    prepare(name, content)?.infer(probe).await
}
