#![forbid(unsafe_code)]

mod convert;
mod error;
mod kind;
pub mod response;
pub mod spec;
pub mod wire;

pub use convert::value_from_wire;
pub use error::{CheckError, Error, ExceptionClass, Result};
pub use kind::ResultErrorKind;
pub use response::{Outcome, check_success, resolve, response_bytes_to_map};
pub use spec::{EnumSpec, FieldSpec, FunctionSpec, ResultSpec, SpecError, StructKind, StructSpec, TypeSpec};
