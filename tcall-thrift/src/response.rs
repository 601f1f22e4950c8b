//! Response envelope decoding and success/exception resolution.
//!
//! Field ID 0 of the envelope carries the return value. Any other ID carries the declared
//! exception with that ID.

use std::sync::Arc;

use bytes::Bytes;
use tcall_value::{ObjectMap, Value};

use crate::convert::value_from_wire;
use crate::spec::FunctionSpec;
use crate::wire::{self, DecodeError, Field, Struct, WireType, WireValue};
use crate::{CheckError, Error, ExceptionClass, Result};

const RESULT_KEY: &str = "result";

/// A decoded response: the return value or one declared exception.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// `None` for a void method.
    Success(Option<Value>),
    Exception {
        id: i16,
        name: Arc<str>,
        value: Value,
    },
}

/// Decodes the response envelope.
///
/// # Panics
///
/// Panics if the codec hands back anything other than a struct for a struct decode. That means
/// the codec broke its contract and there is nothing sensible to recover.
pub fn response_bytes_to_wire(bytes: Bytes) -> std::result::Result<Struct, DecodeError> {
    match wire::decode(bytes, WireType::Struct)? {
        WireValue::Struct(s) => Ok(s),
        other => panic!(
            "internal invariant violation: struct decode returned {}",
            other.wire_type()
        ),
    }
}

enum Slot<'a> {
    Result,
    Exception(&'a Arc<str>),
}

fn decode_field(spec: &FunctionSpec, field: Field) -> Result<(Slot<'_>, Value)> {
    let Field { id, value } = field;

    let (slot, ty) = if id == 0 {
        let Some(ty) = spec.return_type() else {
            return Err(Error::UnexpectedVoidResult { value });
        };
        (Slot::Result, ty)
    } else {
        let Some(ex) = spec.exception(id) else {
            return Err(Error::UnknownException { id, value });
        };
        (Slot::Exception(&ex.name), &ex.ty)
    };

    let value = value_from_wire(ty, value).map_err(|message| Error::Field { id, message })?;
    Ok((slot, value))
}

/// Decodes a response into a map keyed by `"result"` or the declared exception name.
///
/// The map holds at most one entry. Envelopes that break the one-field rule fail with
/// [`Error::FieldCount`], as in [`resolve`].
pub fn response_bytes_to_map(spec: &FunctionSpec, bytes: Bytes) -> Result<ObjectMap> {
    let mut out = ObjectMap::with_capacity(1);
    match resolve(spec, bytes)? {
        Outcome::Success(None) => {}
        Outcome::Success(Some(value)) => {
            out.insert(Arc::from(RESULT_KEY), value);
        }
        Outcome::Exception { name, value, .. } => {
            out.insert(name, value);
        }
    }
    Ok(out)
}

/// Decodes a response into an [`Outcome`].
///
/// A method with a return type needs exactly one field; a void method needs zero or one nonzero
/// field. Anything else fails with [`Error::FieldCount`] before any value is decoded.
pub fn resolve(spec: &FunctionSpec, bytes: Bytes) -> Result<Outcome> {
    let envelope = response_bytes_to_wire(bytes)?;
    tracing::trace!(
        method = spec.name(),
        fields = envelope.len(),
        "decoding response"
    );

    let expects_value = spec.return_type().is_some();
    match envelope.len() {
        0 if !expects_value => return Ok(Outcome::Success(None)),
        1 => {}
        _ => return Err(Error::FieldCount { fields: envelope }),
    }

    let mut fields = envelope.fields;
    let Some(field) = fields.pop() else {
        return Ok(Outcome::Success(None));
    };
    let id = field.id;
    let (slot, value) = decode_field(spec, field)?;
    Ok(match slot {
        Slot::Result => Outcome::Success(Some(value)),
        Slot::Exception(name) => Outcome::Exception {
            id,
            name: name.clone(),
            value,
        },
    })
}

fn classify_exception(spec: &FunctionSpec, id: i16) -> ExceptionClass {
    if spec.exceptions().is_empty() {
        return ExceptionClass::NoExceptionsDeclared;
    }
    match spec.exception(id) {
        Some(ex) => ExceptionClass::Declared {
            name: ex.name.clone(),
            type_name: ex.ty.thrift_name(),
        },
        None => ExceptionClass::Unknown,
    }
}

/// Reports whether the response is a success without decoding field values.
///
/// Successful responses carry only field 0 (for methods with a return type) or no fields at all.
pub fn check_success(spec: &FunctionSpec, bytes: Bytes) -> std::result::Result<(), CheckError> {
    let envelope = response_bytes_to_wire(bytes).map_err(CheckError::Deserialize)?;

    let single = match envelope.fields.as_slice() {
        [only] => Some(only.id),
        _ => None,
    };

    if spec.return_type().is_none() {
        if envelope.is_empty() {
            return Ok(());
        }
        return match single {
            Some(id) if id != 0 => Err(CheckError::VoidException {
                id,
                class: classify_exception(spec, id),
            }),
            _ => Err(CheckError::VoidUnexpectedResult { fields: envelope }),
        };
    }

    match single {
        Some(0) => Ok(()),
        Some(id) => Err(CheckError::Exception {
            id,
            class: classify_exception(spec, id),
        }),
        None => Err(CheckError::FieldCount { fields: envelope }),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::spec::{ResultSpec, TypeSpec};

    fn envelope(fields: Vec<Field>) -> Bytes {
        wire::encode(&WireValue::Struct(Struct::new(fields)))
    }

    #[test]
    fn malformed_bytes_report_decode_errors() {
        let spec = FunctionSpec::new("m", Some(ResultSpec::returning(TypeSpec::I32))).unwrap();
        let bytes = Bytes::from_static(&[8, 0]);

        let err = response_bytes_to_map(&spec, bytes.clone()).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert!(err.to_string().starts_with("cannot parse Thrift struct from response"));

        let err = check_success(&spec, bytes).unwrap_err();
        assert!(err.to_string().starts_with("could not deserialize result: "));
    }

    #[test]
    fn resolve_maps_result_field_to_success() {
        let spec = FunctionSpec::new("m", Some(ResultSpec::returning(TypeSpec::I64))).unwrap();
        let bytes = envelope(vec![Field::new(0, WireValue::I64(9))]);
        assert_eq!(
            resolve(&spec, bytes).unwrap(),
            Outcome::Success(Some(Value::I64(9)))
        );
    }

    #[test]
    fn resolve_rejects_missing_result() {
        let spec = FunctionSpec::new("m", Some(ResultSpec::returning(TypeSpec::I64))).unwrap();
        let err = resolve(&spec, envelope(vec![])).unwrap_err();
        assert!(matches!(err, Error::FieldCount { .. }));

        let err = response_bytes_to_map(&spec, envelope(vec![])).unwrap_err();
        assert!(matches!(err, Error::FieldCount { .. }));
    }

    #[test]
    fn resolve_void_success_has_no_value() {
        let spec = FunctionSpec::new("m", None).unwrap();
        assert_eq!(
            resolve(&spec, envelope(vec![])).unwrap(),
            Outcome::Success(None)
        );
    }

    #[test]
    fn void_method_with_several_fields_lists_them_all() {
        let spec = FunctionSpec::new("m", None).unwrap();
        let bytes = envelope(vec![
            Field::new(1, WireValue::I32(1)),
            Field::new(2, WireValue::I32(2)),
        ]);
        let err = check_success(&spec, bytes).unwrap_err();
        assert_eq!(
            err.to_string(),
            "void method got unexpected result, fields: [{id:1 value:I32(1)} {id:2 value:I32(2)}]"
        );
    }
}
