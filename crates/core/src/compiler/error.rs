use thiserror::Error;

/// Result type for compiler operations
pub type CompilerResult<T> = Result<T, CompilerError>;

/// Errors that can occur while compiling a single SQL file into a descriptor
#[derive(Debug, Error)]
pub enum CompilerError {
    /// An annotation line carries the `--` marker but no `#` separator
    #[error("Malformed annotation: '{line}'")]
    MalformedAnnotation { line: String },

    /// Neither `OPTIONS` nor the first SQL token names a supported statement
    #[error("Unsupported statement kind: '{0}'")]
    UnsupportedStatementKind(String),

    /// The probe query could not be executed against the live connection
    #[error("Probe execution failed for `{query}`: {source}")]
    ProbeExecutionFailed {
        query: String,
        #[source]
        source: sqlx::Error,
    },
}

impl CompilerError {
    pub fn malformed_annotation(line: impl Into<String>) -> Self {
        Self::MalformedAnnotation { line: line.into() }
    }

    pub fn probe_failed(query: impl Into<String>, source: sqlx::Error) -> Self {
        Self::ProbeExecutionFailed {
            query: query.into(),
            source,
        }
    }

    pub fn report(&self) -> String {
        match self {
            Self::MalformedAnnotation { line } => {
                format!(
                    "Malformed annotation '{}'\n\
                         Suggestion: Annotations take the form --KEY#value1,value2 (escape literal commas as \\,).",
                    line
                )
            }
            Self::UnsupportedStatementKind(token) => {
                format!(
                    "Unsupported statement kind '{}'\n\
                         Suggestion: Start the query with select/insert/update/delete or name the kind in --OPTIONS#.",
                    token
                )
            }
            Self::ProbeExecutionFailed { query, source } => {
                format!(
                    "Probe execution failed: {}\n  query: {}\n\
                         Suggestion: Check the SQL against the probe database and the --DEFAULT# values.",
                    source, query
                )
            }
        }
    }

    /// Returns true if the failure came from the database rather than the file text
    pub fn is_probe_error(&self) -> bool {
        matches!(self, Self::ProbeExecutionFailed { .. })
    }
}
