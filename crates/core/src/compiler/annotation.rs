//! Splitting a query file into directives and SQL body.

use std::collections::HashMap;

use super::error::{CompilerError, CompilerResult};

/// Line prefix marking an annotation line.
pub const ANNOTATION_MARKER: &str = "--";

/// Separates a directive key from its value list.
pub const KEY_SEPARATOR: char = '#';

pub const OPTIONS: &str = "OPTIONS";
pub const TYPE: &str = "TYPE";
pub const DEFAULT: &str = "DEFAULT";

/// Directive key to ordered values, one set per SQL file.
///
/// Values keep their written order because `TYPE` and `DEFAULT` line up with
/// parameter ordinals. Unknown keys are kept but nothing reads them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Directives {
    entries: HashMap<String, Vec<String>>,
}

impl Directives {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a directive, replacing any earlier line with the same key.
    pub fn insert(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.entries.insert(key.into(), values);
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// The value at `index` of `key`, if both exist.
    pub fn value_at(&self, key: &str, index: usize) -> Option<&str> {
        self.get(key)
            .and_then(|values| values.get(index))
            .map(String::as_str)
    }

    pub fn options(&self) -> &[String] {
        self.get(OPTIONS).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A query file split into its two halves.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedFile {
    pub directives: Directives,
    /// Every non-annotation line joined with a single space.
    pub sql: String,
}

/// Splits `content` into directives and a single-line SQL body.
///
/// Blank lines are dropped. Fails on the first annotation line without a `#`.
pub fn parse_file(content: &str) -> CompilerResult<ParsedFile> {
    let mut directives = Directives::new();
    let mut body = Vec::new();

    for line in content.split(['\r', '\n']) {
        if line.trim().is_empty() {
            continue;
        }

        match line.strip_prefix(ANNOTATION_MARKER) {
            Some(annotation) => {
                let (key, values) = parse_annotation(annotation)?;
                directives.insert(key, values);
            }
            None => body.push(line),
        }
    }

    Ok(ParsedFile {
        directives,
        sql: body.join(" "),
    })
}

/// Parses `KEY#value1,value2` (marker already stripped).
///
/// Further `#` characters after the first are dropped, so `KEY#a#b` carries
/// the value `ab`.
pub fn parse_annotation(annotation: &str) -> CompilerResult<(String, Vec<String>)> {
    let (key, values) = annotation
        .split_once(KEY_SEPARATOR)
        .ok_or_else(|| CompilerError::malformed_annotation(annotation))?;
    let values: String = values.split(KEY_SEPARATOR).collect();

    Ok((key.to_string(), split_values(&values)))
}

/// Splits on commas not preceded by a backslash, then unescapes `\,`.
fn split_values(values: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut chars = values.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            ',' => result.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    result.push(current);

    result
}
