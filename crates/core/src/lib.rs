//! queryfn turns annotated SQL files into typed data-access code.
//!
//! # Overview
//!
//! This crate holds the compiler: it reads one query file, resolves its
//! parameters, classifies the statement, rewrites it into positional form and
//! probes a live database to discover the result columns. The output is a
//! [`QueryDescriptor`](compiler::QueryDescriptor) that a renderer turns into
//! source code.
//!
//! # Query files
//!
//! ```sql
//! --TYPE#int
//! --DEFAULT#5
//! select * from minute_history where id = ${id}
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use queryfn_core::prelude::*;
//!
//! let prepared = prepare(
//!     "byId",
//!     "--TYPE#int\n--DEFAULT#5\nselect * from minute_history where id = ${id}",
//! ).expect("query should prepare");
//!
//! assert_eq!(prepared.sql, "select * from minute_history where id = $1");
//! assert_eq!(prepared.parameters[0].ty, TypeTag::Int);
//! ```

pub mod compiler;
pub mod prelude;
