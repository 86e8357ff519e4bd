use super::rust::{string_literal, HEADER};
use super::{StorageEntry, StorageOption};
use crate::error::{CodegenError, Result};
use syn::{Expr, Item, Lit};

const TABLE: &str = "STORAGE";

/// Renders the qualified-name to SQL table with a `lookup` helper.
pub fn render_storage(option: &StorageOption) -> String {
    let mut content = String::new();
    content.push_str(HEADER);
    content.push('\n');
    content.push_str("/// Qualified method name to compiled SQL.\n");
    content.push_str(&format!("pub static {}: &[(&str, &str)] = &[\n", TABLE));
    for entry in &option.entries {
        content.push_str(&format!(
            "    ({}, {}),\n",
            string_literal(&entry.name),
            string_literal(&entry.sql)
        ));
    }
    content.push_str("];\n\n");
    content.push_str(&format!(
        r#"pub fn lookup(name: &str) -> Option<&'static str> {{
    {}.iter().find(|(key, _)| *key == name).map(|(_, sql)| *sql)
}}
"#,
        TABLE
    ));
    content
}

/// Reads a rendered storage file back into its entries, in order.
pub fn parse_storage(content: &str) -> Result<StorageOption> {
    let file = syn::parse_file(content)?;

    let table = file
        .items
        .iter()
        .find_map(|item| match item {
            Item::Static(item) if item.ident == TABLE => Some(item),
            _ => None,
        })
        .ok_or_else(|| CodegenError::Storage(format!("no `{}` table", TABLE)))?;

    let array = match &*table.expr {
        Expr::Reference(reference) => match &*reference.expr {
            Expr::Array(array) => array,
            _ => return Err(CodegenError::Storage("table is not an array".to_string())),
        },
        _ => return Err(CodegenError::Storage("table is not a reference".to_string())),
    };

    let entries = array
        .elems
        .iter()
        .map(|elem| {
            let Expr::Tuple(tuple) = elem else {
                return Err(CodegenError::Storage("entry is not a tuple".to_string()));
            };
            match (tuple.elems.first(), tuple.elems.get(1), tuple.elems.len()) {
                (Some(name), Some(sql), 2) => Ok(StorageEntry {
                    name: string_value(name)?,
                    sql: string_value(sql)?,
                }),
                _ => Err(CodegenError::Storage("entry is not a pair".to_string())),
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(StorageOption { entries })
}

fn string_value(expr: &Expr) -> Result<String> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(s) => Ok(s.value()),
            _ => Err(CodegenError::Storage("entry is not a string".to_string())),
        },
        _ => Err(CodegenError::Storage("entry is not a literal".to_string())),
    }
}
