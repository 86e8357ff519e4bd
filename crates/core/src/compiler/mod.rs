//! The SQL-to-typed-API compiler.
//!
//! A query file flows through these stages, each in its own module:
//!
//! - [`annotation`]: splits `--KEY#values` directives from the SQL body
//! - [`params`]: finds `${name}` placeholders and resolves type and default per ordinal
//! - [`classify`]: statement kind plus batch and row-limit flags
//! - [`sql`]: rewrites placeholders into `$n` markers
//! - [`probe`]: executes the query once to learn its result columns
//! - [`descriptor`]: assembles the [`descriptor::QueryDescriptor`] handed to the renderer
//!
//! Everything before [`probe`] is a pure text transform. [`types`] holds the
//! logical type table the other stages share.

pub mod annotation;
pub mod classify;
pub mod descriptor;
pub mod error;
pub mod params;
pub mod probe;
pub mod sql;
pub mod types;

pub use descriptor::{build, prepare, PreparedQuery, QueryDescriptor, ResultShape};
pub use error::{CompilerError, CompilerResult};
