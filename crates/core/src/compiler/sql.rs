//! Rewriting named placeholders into positional markers.

use super::params::PLACEHOLDER;

/// Replaces each `${identifier}` with `$n`, `n` being its 1-based occurrence.
///
/// Occurrences are numbered independently, so a repeated name becomes two
/// separate markers.
pub fn compile_sql(sql: &str) -> String {
    let mut ordinal = 0;
    PLACEHOLDER
        .replace_all(sql, |_: &regex::Captures<'_>| {
            ordinal += 1;
            format!("${}", ordinal)
        })
        .into_owned()
}

/// The SQL the probe runs: trailing `;` removed, `limit 1` appended when limited.
pub fn probe_sql(compiled: &str, limited: bool) -> String {
    let base = compiled.trim_end().trim_end_matches(';').trim_end();
    if limited {
        format!("{} limit 1", base)
    } else {
        base.to_string()
    }
}
