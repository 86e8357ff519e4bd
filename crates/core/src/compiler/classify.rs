//! Statement kind and the execution flags derived from it.

use std::fmt;
use std::str::FromStr;

use super::annotation::Directives;
use super::error::{CompilerError, CompilerResult};

/// `OPTIONS` flag forcing a multi-row result.
pub const BATCH_RESULT: &str = "BATCH_RESULT";

/// `OPTIONS` values containing this marker set the row-limit flag.
pub const LIMIT: &str = "LIMIT";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Select => "select",
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
        }
    }
}

impl FromStr for StatementKind {
    type Err = CompilerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "select" => Ok(StatementKind::Select),
            "insert" => Ok(StatementKind::Insert),
            "update" => Ok(StatementKind::Update),
            "delete" => Ok(StatementKind::Delete),
            _ => Err(CompilerError::UnsupportedStatementKind(s.to_string())),
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a query executes: its kind plus the batch and limit flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub kind: StatementKind,
    /// Accepts multiple parameter sets. Inserts only.
    pub batch_parameter: bool,
    /// Returns a sequence of rows rather than a single outcome.
    pub batch_result: bool,
    /// The probe appends a row limit.
    pub limited: bool,
}

/// Derives the statement kind and flags from `OPTIONS` and the SQL body.
pub fn classify(sql: &str, directives: &Directives) -> CompilerResult<Classification> {
    let kind = statement_kind(sql, directives)?;
    let options = directives.options();

    Ok(Classification {
        kind,
        batch_parameter: kind == StatementKind::Insert,
        batch_result: options.iter().any(|o| o == BATCH_RESULT) || kind == StatementKind::Select,
        limited: options.iter().any(|o| o.contains(LIMIT)),
    })
}

/// An explicit kind keyword in `OPTIONS` wins over the first SQL token.
pub fn statement_kind(sql: &str, directives: &Directives) -> CompilerResult<StatementKind> {
    if let Some(kind) = directives
        .options()
        .iter()
        .find_map(|option| option.parse::<StatementKind>().ok())
    {
        return Ok(kind);
    }

    let token = sql.split_whitespace().next().unwrap_or_default();
    token.parse()
}
