use std::fmt;
use std::sync::Arc;

use crate::ResultErrorKind;
use crate::wire::{DecodeError, Struct, WireValue};

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of full result extraction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot parse Thrift struct from response: {0}")]
    Decode(#[from] DecodeError),

    #[error("got unexpected result for void method: {value:?}")]
    UnexpectedVoidResult { value: WireValue },

    #[error("got unknown exception with ID {id}: {value:?}")]
    UnknownException { id: i16, value: WireValue },

    #[error("failed to parse result field {id}: {message}")]
    Field { id: i16, message: String },

    #[error("expected exactly one field in result, got: {fields}")]
    FieldCount { fields: Struct },
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ResultErrorKind {
        match self {
            Self::Decode(_) => ResultErrorKind::Decode,
            Self::UnexpectedVoidResult { .. } | Self::FieldCount { .. } => {
                ResultErrorKind::ProtocolViolation
            }
            Self::UnknownException { .. } => ResultErrorKind::UnknownException,
            Self::Field { .. } => ResultErrorKind::FieldDecode,
        }
    }
}

/// What the cheap success check could tell about an exception field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExceptionClass {
    Declared { name: Arc<str>, type_name: String },
    NoExceptionsDeclared,
    Unknown,
}

impl fmt::Display for ExceptionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declared { name, type_name } => write!(f, "{name} {type_name}"),
            Self::NoExceptionsDeclared => f.write_str("unknown, method has no exceptions"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Failures of [`crate::check_success`].
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("could not deserialize result: {0}")]
    Deserialize(#[source] DecodeError),

    /// Field 0 or several fields for a void method.
    ///
    /// The message is "void method got unexpected result, fields: ...". It does not contain the
    /// "unexpected result for void method" text of [`Error::UnexpectedVoidResult`]; match on
    /// [`CheckError::kind`] rather than on either string.
    #[error("void method got unexpected result, fields: {fields}")]
    VoidUnexpectedResult { fields: Struct },

    #[error("void method got exception: {class}")]
    VoidException { id: i16, class: ExceptionClass },

    #[error("method with return did not get 1 field in result: {fields}")]
    FieldCount { fields: Struct },

    #[error("method with return got exception: {class}")]
    Exception { id: i16, class: ExceptionClass },
}

impl CheckError {
    #[must_use]
    pub fn kind(&self) -> ResultErrorKind {
        match self {
            Self::Deserialize(_) => ResultErrorKind::Decode,
            Self::VoidUnexpectedResult { .. } | Self::FieldCount { .. } => {
                ResultErrorKind::ProtocolViolation
            }
            Self::VoidException { class, .. } | Self::Exception { class, .. } => match class {
                ExceptionClass::Declared { .. } => ResultErrorKind::DeclaredException,
                _ => ResultErrorKind::UnknownException,
            },
        }
    }

    /// The exception classification, when the envelope carried one.
    #[must_use]
    pub fn exception(&self) -> Option<&ExceptionClass> {
        match self {
            Self::VoidException { class, .. } | Self::Exception { class, .. } => Some(class),
            _ => None,
        }
    }
}
