use std::sync::Arc;

use tcall_value::{MapKey, MapMap, ObjectMap, Value};

use crate::spec::{EnumSpec, StructKind, StructSpec, TypeSpec};
use crate::wire::{MapItems, Struct, ValueList, WireValue};

/// Interprets a wire value according to its declared type.
///
/// Struct fields the type does not declare are skipped. Enum values map to the item name when one
/// is declared and to the raw number otherwise.
pub fn value_from_wire(ty: &TypeSpec, value: WireValue) -> std::result::Result<Value, String> {
    let expected = ty.wire_type();
    let got = value.wire_type();
    if expected != got {
        return Err(format!(
            "type mismatch for {}: expected {expected}, got {got}",
            ty.thrift_name()
        ));
    }

    match (ty, value) {
        (TypeSpec::Bool, WireValue::Bool(v)) => Ok(Value::Bool(v)),
        (TypeSpec::I8, WireValue::I8(v)) => Ok(Value::I64(v.into())),
        (TypeSpec::I16, WireValue::I16(v)) => Ok(Value::I64(v.into())),
        (TypeSpec::I32, WireValue::I32(v)) => Ok(Value::I64(v.into())),
        (TypeSpec::I64, WireValue::I64(v)) => Ok(Value::I64(v)),
        (TypeSpec::Double, WireValue::Double(v)) => Ok(Value::F64(v)),
        (TypeSpec::Binary, WireValue::Binary(v)) => Ok(Value::Bytes(v)),
        (TypeSpec::String, WireValue::Binary(v)) => std::str::from_utf8(&v)
            .map(|s| Value::String(Arc::from(s)))
            .map_err(|err| format!("invalid UTF-8 in string: {err}")),
        (TypeSpec::Enum(spec), WireValue::I32(v)) => Ok(enum_value(spec, v)),
        (TypeSpec::Struct(spec), WireValue::Struct(s)) => struct_value(spec, s),
        (TypeSpec::List(elem), WireValue::List(l)) | (TypeSpec::Set(elem), WireValue::Set(l)) => {
            list_value(elem, l)
        }
        (TypeSpec::Map(k, v), WireValue::Map(m)) => map_value(k, v, m),
        (ty, _) => Err(format!("cannot decode {}", ty.thrift_name())),
    }
}

fn enum_value(spec: &EnumSpec, v: i32) -> Value {
    match spec.item_name(v) {
        Some(name) => Value::String(name.clone()),
        None => Value::I64(v.into()),
    }
}

fn struct_value(spec: &StructSpec, s: Struct) -> std::result::Result<Value, String> {
    if spec.kind == StructKind::Union && s.len() != 1 {
        return Err(format!(
            "union {} must have exactly one field set, got {}",
            spec.name,
            s.len()
        ));
    }

    let mut out = ObjectMap::with_capacity(s.len());
    for field in s.fields {
        let Some(meta) = spec.field(field.id) else {
            continue;
        };
        let v = value_from_wire(&meta.ty, field.value)
            .map_err(|err| format!("{}.{}: {err}", spec.name, meta.name))?;
        out.insert(meta.name.clone(), v);
    }

    if let Some(missing) = spec
        .fields
        .iter()
        .find(|f| f.required && !out.contains_key(&f.name))
    {
        return Err(format!(
            "{} {} is missing required field {}",
            spec.kind, spec.name, missing.name
        ));
    }

    Ok(Value::Object(out))
}

fn list_value(elem: &TypeSpec, l: ValueList) -> std::result::Result<Value, String> {
    let mut out = Vec::with_capacity(l.items.len());
    for item in l.items {
        out.push(value_from_wire(elem, item)?);
    }
    Ok(Value::Array(out))
}

fn map_value(
    key_ty: &TypeSpec,
    value_ty: &TypeSpec,
    m: MapItems,
) -> std::result::Result<Value, String> {
    let mut out = MapMap::with_capacity(m.items.len());
    for (k, v) in m.items {
        let key = map_key(value_from_wire(key_ty, k)?)?;
        out.insert(key, value_from_wire(value_ty, v)?);
    }
    Ok(Value::Map(out))
}

fn map_key(v: Value) -> std::result::Result<MapKey, String> {
    match v {
        Value::Bool(b) => Ok(MapKey::Bool(b)),
        Value::I64(n) => Ok(MapKey::I64(n)),
        Value::String(s) => Ok(MapKey::String(s)),
        Value::Bytes(b) => Ok(MapKey::Bytes(b)),
        other => Err(format!("unsupported map key {other:?}")),
    }
}
