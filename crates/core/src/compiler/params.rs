//! Placeholder extraction and per-ordinal type/default resolution.

use std::sync::LazyLock;

use regex::Regex;

use super::annotation::{Directives, DEFAULT, TYPE};
use super::types::{TypeTag, Value};

pub(crate) static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][0-9A-Za-z_]*)\}").expect("placeholder pattern is valid")
});

/// One placeholder occurrence in the SQL body.
///
/// Repeated names are separate parameters with their own ordinals.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// 0-based position among all placeholder occurrences.
    pub index: usize,
    /// Number of parameters in the query.
    pub total: usize,
    pub ty: TypeTag,
    /// Only ever bound by the probe, never exposed to callers.
    pub default: Value,
}

impl Parameter {
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }

    /// The 1-based positional marker this parameter compiles to.
    pub fn marker(&self) -> String {
        format!("${}", self.index + 1)
    }
}

/// Every `${identifier}` in `sql`, left to right, duplicates included.
pub fn placeholder_names(sql: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(sql)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Builds the ordered parameter list for `sql`.
///
/// The type comes from `TYPE` at the same ordinal (string when absent); the
/// default from `DEFAULT` at the same ordinal, converted to that type, or the
/// type's canonical default.
pub fn extract_parameters(sql: &str, directives: &Directives) -> Vec<Parameter> {
    let names = placeholder_names(sql);
    let total = names.len();

    names
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let ty = directives
                .value_at(TYPE, index)
                .map(TypeTag::parse)
                .unwrap_or(TypeTag::String);
            let default = directives
                .value_at(DEFAULT, index)
                .map(|literal| ty.convert(literal))
                .unwrap_or_else(|| ty.default_value());

            Parameter {
                name: name.to_string(),
                index,
                total,
                ty,
                default,
            }
        })
        .collect()
}
