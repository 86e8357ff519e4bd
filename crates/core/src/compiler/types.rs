//! The logical type tags shared by `TYPE` directives, probe results and
//! generated code.
//!
//! The tag set is closed. Every conversion here is total: an unknown tag, an
//! unknown driver type or an unparsable literal falls back to a well-defined
//! value instead of failing the file.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

/// Datetime layout accepted in `DEFAULT` directives.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Portable type identifier decoupling SQL/driver types from generated types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Int,
    Long,
    Double,
    String,
    Date,
}

/// A concrete value of one of the logical types.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i32),
    Long(i64),
    Double(f64),
    String(String),
    Date(NaiveDateTime),
}

static TAGS: LazyLock<HashMap<&'static str, TypeTag>> = LazyLock::new(|| {
    TypeTag::ALL.iter().map(|tag| (tag.as_str(), *tag)).collect()
});

static DRIVER_TYPES: LazyLock<HashMap<&'static str, TypeTag>> = LazyLock::new(|| {
    HashMap::from([
        ("INT2", TypeTag::Int),
        ("INT4", TypeTag::Int),
        ("INT8", TypeTag::Long),
        ("FLOAT4", TypeTag::Double),
        ("FLOAT8", TypeTag::Double),
        ("NUMERIC", TypeTag::Double),
        ("TEXT", TypeTag::String),
        ("VARCHAR", TypeTag::String),
        ("BPCHAR", TypeTag::String),
        ("NAME", TypeTag::String),
        ("TIMESTAMP", TypeTag::Date),
        ("TIMESTAMPTZ", TypeTag::Date),
        ("DATE", TypeTag::Date),
    ])
});

/// Rust types sqlx decodes each driver type into without a type mismatch.
/// A column whose driver type is missing here has no exact counterpart.
static DECODE_TYPES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("BOOL", "bool"),
        ("INT2", "i16"),
        ("INT4", "i32"),
        ("INT8", "i64"),
        ("FLOAT4", "f32"),
        ("FLOAT8", "f64"),
        ("TEXT", "String"),
        ("VARCHAR", "String"),
        ("BPCHAR", "String"),
        ("NAME", "String"),
        ("TIMESTAMP", "chrono::NaiveDateTime"),
        ("TIMESTAMPTZ", "chrono::DateTime<chrono::Utc>"),
        ("DATE", "chrono::NaiveDate"),
        ("TIME", "chrono::NaiveTime"),
    ])
});

/// The Rust type that decodes a column of driver type `name` exactly, if any.
pub fn decode_type(name: &str) -> Option<&'static str> {
    DECODE_TYPES.get(name.to_ascii_uppercase().as_str()).copied()
}

impl TypeTag {
    pub const ALL: [TypeTag; 5] = [
        TypeTag::Int,
        TypeTag::Long,
        TypeTag::Double,
        TypeTag::String,
        TypeTag::Date,
    ];

    /// Looks up a tag written in a `TYPE` directive. Unknown tags resolve to
    /// [`TypeTag::String`].
    pub fn parse(tag: &str) -> TypeTag {
        match TAGS.get(tag.trim()) {
            Some(tag) => *tag,
            None => {
                tracing::warn!(tag, "unresolved placeholder type, falling back to string");
                TypeTag::String
            }
        }
    }

    /// Maps a driver-reported column type name (e.g. `INT4`) onto a tag.
    pub fn from_driver_type(name: &str) -> TypeTag {
        DRIVER_TYPES
            .get(name.to_ascii_uppercase().as_str())
            .copied()
            .unwrap_or(TypeTag::String)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Long => "long",
            TypeTag::Double => "double",
            TypeTag::String => "string",
            TypeTag::Date => "date",
        }
    }

    /// The Rust type the generated code uses for this tag.
    pub fn rust_type(&self) -> &'static str {
        match self {
            TypeTag::Int => "i32",
            TypeTag::Long => "i64",
            TypeTag::Double => "f64",
            TypeTag::String => "String",
            TypeTag::Date => "chrono::NaiveDateTime",
        }
    }

    /// Deterministic placeholder used to probe a query when no `DEFAULT` is given.
    pub fn default_value(&self) -> Value {
        match self {
            TypeTag::Int => Value::Int(1),
            TypeTag::Long => Value::Long(1),
            TypeTag::Double => Value::Double(1.0),
            TypeTag::String => Value::String("1".to_string()),
            TypeTag::Date => Value::Date(NaiveDateTime::UNIX_EPOCH),
        }
    }

    /// Converts a `DEFAULT` literal into a value of this type, falling back to
    /// [`TypeTag::default_value`] when the literal does not parse.
    pub fn convert(&self, literal: &str) -> Value {
        self.try_convert(literal).unwrap_or_else(|| {
            tracing::debug!(tag = self.as_str(), literal, "default literal did not convert");
            self.default_value()
        })
    }

    fn try_convert(&self, literal: &str) -> Option<Value> {
        let trimmed = literal.trim();
        match self {
            TypeTag::Int => trimmed.parse().ok().map(Value::Int),
            TypeTag::Long => trimmed.parse().ok().map(Value::Long),
            TypeTag::Double => trimmed.parse().ok().map(Value::Double),
            TypeTag::String => Some(Value::String(literal.to_string())),
            TypeTag::Date => NaiveDateTime::parse_from_str(trimmed, DATE_FORMAT)
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                })
                .map(Value::Date),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Int(_) => TypeTag::Int,
            Value::Long(_) => TypeTag::Long,
            Value::Double(_) => TypeTag::Double,
            Value::String(_) => TypeTag::String,
            Value::Date(_) => TypeTag::Date,
        }
    }

    /// Appends this value as the next positional argument of `query`.
    pub fn bind<'q>(&self, query: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments> {
        match self {
            Value::Int(v) => query.bind(*v),
            Value::Long(v) => query.bind(*v),
            Value::Double(v) => query.bind(*v),
            Value::String(v) => query.bind(v.clone()),
            Value::Date(v) => query.bind(*v),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v.format(DATE_FORMAT)),
        }
    }
}
