pub use crate::compiler::classify::{Classification, StatementKind};
pub use crate::compiler::params::Parameter;
pub use crate::compiler::probe::{Probe, ProbeColumn, ResultField};
pub use crate::compiler::types::{TypeTag, Value};
pub use crate::compiler::{
    build, prepare, CompilerError, CompilerResult, PreparedQuery, QueryDescriptor, ResultShape,
};
