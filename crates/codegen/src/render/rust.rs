use super::{DataOption, FieldOption, InterfaceOption, MethodOption, ReturnMode};
use queryfn_core::compiler::types::TypeTag;

pub(super) const HEADER: &str = "// Generated by queryfn. Do not edit.\n";

/// Renders a string as a Rust string literal.
pub(super) fn string_literal(value: &str) -> String {
    proc_macro2::Literal::string(value).to_string()
}

/// Type of a generated method argument.
fn argument_type(parameter: &FieldOption) -> &'static str {
    match parameter.ty {
        TypeTag::String => "&str",
        _ => parameter.rust_type,
    }
}

fn join_fields(fields: &[FieldOption], render: impl Fn(&FieldOption) -> String) -> String {
    let mut out = String::new();
    for field in fields {
        out.push_str(&render(field));
        if !field.last {
            out.push_str(", ");
        }
    }
    out
}

/// Renders one mapper module: SQL constants, result structs and the mapper.
pub fn render_interface(option: &InterfaceOption) -> String {
    let mut content = String::new();
    content.push_str(HEADER);
    content.push_str(&format!("//! Queries from `{}`.\n\n", option.source));
    content.push_str("use sqlx::PgConnection;\n\n");

    for method in &option.methods {
        content.push_str(&format!(
            "pub const {}: &str = {};\n",
            method.sql_const,
            string_literal(&method.sql)
        ));
    }
    content.push('\n');

    for data in &option.data {
        content.push_str(&render_data(data));
        content.push('\n');
    }

    content.push_str(&format!(
        "pub struct {}<'c> {{\n    conn: &'c mut PgConnection,\n}}\n\n",
        option.name
    ));
    content.push_str(&format!("impl<'c> {}<'c> {{\n", option.name));
    content.push_str("    pub fn new(conn: &'c mut PgConnection) -> Self {\n        Self { conn }\n    }\n");

    for method in &option.methods {
        content.push('\n');
        content.push_str(&render_method(method));
        if method.batch_parameter {
            content.push('\n');
            content.push_str(&render_batch_method(method));
        }
    }
    content.push_str("}\n");

    content
}

fn render_data(data: &DataOption) -> String {
    let mut content = String::new();
    content.push_str("#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]\n");
    content.push_str(&format!("pub struct {} {{\n", data.name));
    for field in &data.fields {
        if field.name != field.source {
            content.push_str(&format!(
                "    #[sqlx(rename = {})]\n",
                string_literal(&field.source)
            ));
        }
        content.push_str(&format!(
            "    pub {}: Option<{}>,\n",
            field.name, field.rust_type
        ));
    }
    content.push_str("}\n");
    content
}

fn render_binds(arguments: impl Iterator<Item = String>, indent: &str) -> String {
    arguments
        .map(|argument| format!("{}.bind({})\n", indent, argument))
        .collect()
}

fn render_method(method: &MethodOption) -> String {
    let arguments = join_fields(&method.parameters, |p| {
        format!("{}: {}", p.name, argument_type(p))
    });
    let separator = if arguments.is_empty() { "" } else { ", " };

    let (return_type, query, fetch) = match method.returns {
        ReturnMode::Rows => (
            format!("Vec<{}>", method.return_type),
            format!("sqlx::query_as::<_, {}>", method.return_type),
            "fetch_all",
        ),
        ReturnMode::Row => (
            format!("Option<{}>", method.return_type),
            format!("sqlx::query_as::<_, {}>", method.return_type),
            "fetch_optional",
        ),
        ReturnMode::Affected => (
            "sqlx::postgres::PgQueryResult".to_string(),
            "sqlx::query".to_string(),
            "execute",
        ),
    };

    let mut content = String::new();
    content.push_str(&format!("    /// `{}`\n", method.qualified_name));
    content.push_str(&format!(
        "    pub async fn {}(&mut self{}{}) -> sqlx::Result<{}> {{\n",
        method.name, separator, arguments, return_type
    ));
    content.push_str(&format!("        {}({})\n", query, method.sql_const));
    content.push_str(&render_binds(
        method.parameters.iter().map(|p| p.name.clone()),
        "            ",
    ));
    content.push_str(&format!("            .{}(&mut *self.conn)\n", fetch));
    content.push_str("            .await\n");
    content.push_str("    }\n");
    content
}

/// Executes the statement once per parameter set and sums the affected rows.
///
/// Parameter sets are bound by tuple position, so placeholder names never
/// meet the generated locals.
fn render_batch_method(method: &MethodOption) -> String {
    let tuple_type = join_fields(&method.parameters, |p| p.rust_type.to_string());
    let tuple_type = if method.parameters.len() == 1 {
        format!("({},)", tuple_type)
    } else {
        format!("({})", tuple_type)
    };

    let mut content = String::new();
    content.push_str(&format!(
        "    /// Runs `{}` once per item of `rows`.\n",
        method.name
    ));
    content.push_str(&format!(
        "    pub async fn {}_batch<I>(&mut self, rows: I) -> sqlx::Result<u64>\n",
        method.name
    ));
    content.push_str("    where\n");
    content.push_str(&format!("        I: IntoIterator<Item = {}>,\n", tuple_type));
    content.push_str("    {\n");
    content.push_str("        let mut affected = 0;\n");
    content.push_str("        for row in rows {\n");
    content.push_str(&format!("            affected += sqlx::query({})\n", method.sql_const));
    content.push_str(&render_binds(
        (0..method.parameters.len()).map(|index| format!("row.{}", index)),
        "                ",
    ));
    content.push_str("                .execute(&mut *self.conn)\n");
    content.push_str("                .await?\n");
    content.push_str("                .rows_affected();\n");
    content.push_str("        }\n");
    content.push_str("        Ok(affected)\n");
    content.push_str("    }\n");
    content
}

/// Renders the `mod.rs` declaring every generated module.
pub fn render_mod(modules: &[String]) -> String {
    let mut content = String::new();
    content.push_str(HEADER);
    content.push('\n');
    for module in modules {
        content.push_str(&format!("pub mod {};\n", module));
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, ty: TypeTag, last: bool) -> FieldOption {
        FieldOption {
            name: name.to_string(),
            source: name.to_string(),
            ty,
            rust_type: ty.rust_type(),
            last,
        }
    }

    #[test]
    fn renders_select_method() {
        let method = MethodOption {
            name: "find_by_id".to_string(),
            qualified_name: "queries::user_mapper::UserMapper::find_by_id".to_string(),
            sql_const: "FIND_BY_ID_SQL".to_string(),
            sql: "select * from users where id = $1".to_string(),
            parameters: vec![field("id", TypeTag::Int, true)],
            return_type: "FindByIdResult".to_string(),
            returns: ReturnMode::Rows,
            batch_parameter: false,
        };

        let rendered = render_method(&method);

        assert!(rendered.contains(
            "pub async fn find_by_id(&mut self, id: i32) -> sqlx::Result<Vec<FindByIdResult>> {"
        ));
        assert!(rendered.contains("sqlx::query_as::<_, FindByIdResult>(FIND_BY_ID_SQL)"));
        assert!(rendered.contains(".bind(id)"));
        assert!(rendered.contains(".fetch_all(&mut *self.conn)"));
    }

    #[test]
    fn renders_batch_insert_with_single_parameter() {
        let method = MethodOption {
            name: "add_tag".to_string(),
            qualified_name: "queries::tag_mapper::TagMapper::add_tag".to_string(),
            sql_const: "ADD_TAG_SQL".to_string(),
            sql: "insert into tags (name) values ($1)".to_string(),
            parameters: vec![field("name", TypeTag::String, true)],
            return_type: "AddTagResult".to_string(),
            returns: ReturnMode::Affected,
            batch_parameter: true,
        };

        let rendered = render_batch_method(&method);

        assert!(rendered.contains("I: IntoIterator<Item = (String,)>,"));
        assert!(rendered.contains("for row in rows {"));
        assert!(rendered.contains(".bind(row.0)"));
    }

    #[test]
    fn batch_locals_do_not_meet_parameter_names() {
        let method = MethodOption {
            name: "add_thing".to_string(),
            qualified_name: "queries::thing_mapper::ThingMapper::add_thing".to_string(),
            sql_const: "ADD_THING_SQL".to_string(),
            sql: "insert into things (affected, rows, row) values ($1, $2, $3)".to_string(),
            parameters: vec![
                field("affected", TypeTag::Int, false),
                field("rows", TypeTag::String, false),
                field("row", TypeTag::Long, true),
            ],
            return_type: "AddThingResult".to_string(),
            returns: ReturnMode::Affected,
            batch_parameter: true,
        };

        let rendered = render_batch_method(&method);

        assert!(rendered.contains("I: IntoIterator<Item = (i32, String, i64)>,"));
        assert!(rendered.contains(".bind(row.0)\n                .bind(row.1)\n                .bind(row.2)\n"));
        assert!(!rendered.contains(".bind(affected)"));
        syn::parse_str::<syn::ImplItemFn>(&rendered).expect("batch method should parse");
    }

    #[test]
    fn renames_fields_that_differ_from_columns() {
        let data = DataOption {
            name: "ListResult".to_string(),
            fields: vec![
                field("id", TypeTag::Long, false),
                FieldOption {
                    name: "created_at".to_string(),
                    source: "createdAt".to_string(),
                    ty: TypeTag::Date,
                    rust_type: "chrono::DateTime<chrono::Utc>",
                    last: true,
                },
            ],
        };

        let rendered = render_data(&data);

        assert!(rendered.contains("    pub id: Option<i64>,\n"));
        assert!(rendered.contains("    #[sqlx(rename = \"createdAt\")]\n    pub created_at: Option<chrono::DateTime<chrono::Utc>>,\n"));
    }
}
