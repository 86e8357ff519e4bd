//! Option records and the renderers that turn them into Rust source.
//!
//! The records are the only thing the renderers see: [`MethodOption`] per
//! query, [`DataOption`] per result shape, [`InterfaceOption`] per module
//! and [`StorageOption`] for the qualified-name to SQL table. Rendering is a
//! pure function from a record to text.

mod rust;
mod storage;

pub use rust::{render_interface, render_mod};
pub use storage::{parse_storage, render_storage};

use convert_case::{Case, Casing};
use queryfn_core::compiler::types::TypeTag;
use queryfn_core::compiler::QueryDescriptor;
use std::collections::HashMap;

/// File name (without extension) of the storage module.
pub const STORAGE_MODULE: &str = "storage";

/// A parameter or result field as the templates see it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOption {
    /// Rust identifier.
    pub name: String,
    /// Placeholder or column name as written in SQL.
    pub source: String,
    pub ty: TypeTag,
    /// Rust type of the field or of the owned argument.
    pub rust_type: &'static str,
    /// Marks the final element, for separator placement.
    pub last: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnMode {
    /// Every row, as a `Vec`.
    Rows,
    /// At most one row, as an `Option`.
    Row,
    /// No result shape; the execution summary.
    Affected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodOption {
    pub name: String,
    pub qualified_name: String,
    pub sql_const: String,
    pub sql: String,
    pub parameters: Vec<FieldOption>,
    pub return_type: String,
    pub returns: ReturnMode,
    /// Also emit a `<name>_batch` method taking many parameter sets.
    pub batch_parameter: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataOption {
    pub name: String,
    pub fields: Vec<FieldOption>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceOption {
    /// Mapper struct name, e.g. `UserMapper`.
    pub name: String,
    /// Rust module (and file) name, e.g. `user_mapper`.
    pub module: String,
    /// Query directory the module came from.
    pub source: String,
    pub methods: Vec<MethodOption>,
    pub data: Vec<DataOption>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub name: String,
    pub sql: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageOption {
    pub entries: Vec<StorageEntry>,
}

impl InterfaceOption {
    /// Builds the records for one module from its descriptors, in order.
    pub fn from_descriptors(package: &str, source: &str, descriptors: &[QueryDescriptor]) -> Self {
        let module = format!("{}_mapper", rust_ident(source, Case::Snake));
        let name = format!("{}Mapper", rust_ident(source, Case::Pascal));

        let methods = descriptors
            .iter()
            .map(|descriptor| MethodOption::from_descriptor(package, &module, &name, descriptor))
            .collect();
        let data = descriptors
            .iter()
            .filter(|descriptor| !descriptor.result.is_empty())
            .map(DataOption::from_descriptor)
            .collect();

        Self {
            name,
            module,
            source: source.to_string(),
            methods,
            data,
        }
    }

    pub fn storage_entries(&self) -> impl Iterator<Item = StorageEntry> + '_ {
        self.methods.iter().map(|method| StorageEntry {
            name: method.qualified_name.clone(),
            sql: method.sql.clone(),
        })
    }
}

impl MethodOption {
    fn from_descriptor(package: &str, module: &str, mapper: &str, descriptor: &QueryDescriptor) -> Self {
        let name = rust_ident(&descriptor.name, Case::Snake);
        let returns = if descriptor.result.is_empty() {
            ReturnMode::Affected
        } else if descriptor.batch_result {
            ReturnMode::Rows
        } else {
            ReturnMode::Row
        };

        let parameters = fields(
            descriptor
                .parameters
                .iter()
                .map(|p| (p.name.as_str(), p.ty, p.ty.rust_type())),
        );

        Self {
            qualified_name: format!("{}::{}::{}::{}", package, module, mapper, name),
            sql_const: format!("{}_SQL", rust_ident(&descriptor.name, Case::UpperSnake)),
            sql: descriptor.sql.clone(),
            return_type: type_ident(&descriptor.result.name),
            batch_parameter: descriptor.batch_parameter && !parameters.is_empty(),
            parameters,
            returns,
            name,
        }
    }
}

impl DataOption {
    fn from_descriptor(descriptor: &QueryDescriptor) -> Self {
        Self {
            name: type_ident(&descriptor.result.name),
            fields: fields(
                descriptor
                    .result
                    .fields
                    .iter()
                    .map(|f| (f.name.as_str(), f.ty, f.rust_type())),
            ),
        }
    }
}

/// Turns `(source name, type)` pairs into field options with unique
/// identifiers. Names that occur more than once get their 1-based position
/// appended, so a repeated `${id}` becomes `id_1` and `id_2`.
fn fields<'a>(items: impl Iterator<Item = (&'a str, TypeTag, &'static str)>) -> Vec<FieldOption> {
    let items: Vec<(&str, TypeTag, &'static str, String)> = items
        .map(|(source, ty, rust_type)| (source, ty, rust_type, rust_ident(source, Case::Snake)))
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (_, _, _, ident) in &items {
        *counts.entry(ident.as_str()).or_default() += 1;
    }

    let total = items.len();
    items
        .iter()
        .enumerate()
        .map(|(index, (source, ty, rust_type, ident))| FieldOption {
            name: if counts[ident.as_str()] > 1 {
                format!("{}_{}", ident, index + 1)
            } else {
                ident.clone()
            },
            source: source.to_string(),
            ty: *ty,
            rust_type: *rust_type,
            last: index + 1 == total,
        })
        .collect()
}

/// Converts `raw` to `case` and makes it a valid, non-keyword identifier.
pub fn rust_ident(raw: &str, case: Case) -> String {
    let fallback = match case {
        Case::Pascal | Case::UpperCamel => "Unnamed",
        Case::UpperSnake => "UNNAMED",
        _ => "unnamed",
    };
    sanitize(&raw.to_case(case), fallback)
}

/// Makes an already-cased type name a valid identifier, keeping its case.
pub fn type_ident(raw: &str) -> String {
    sanitize(raw, "Unnamed")
}

fn sanitize(raw: &str, fallback: &str) -> String {
    let mut ident: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if ident.trim_matches('_').is_empty() {
        ident = fallback.to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if syn::parse_str::<syn::Ident>(&ident).is_err() {
        ident.push('_');
    }
    ident
}
