use bytes::{Buf as _, Bytes};

use super::primitives::{read_binary, read_f64, read_i16, read_i32, read_i64, read_size, read_u8};
use super::{DecodeError, Field, MapItems, Struct, ValueList, WireType, WireValue};

/// Maximum nesting of containers and structs accepted by [`decode`].
pub const MAX_DEPTH: usize = 64;

const STOP: u8 = 0;

/// Decodes a single root value of type `ty` from `bytes`.
///
/// The returned value always carries the requested type; the whole input must be consumed.
pub fn decode(bytes: Bytes, ty: WireType) -> Result<WireValue, DecodeError> {
    let mut src = bytes;
    let value = read_value(&mut src, ty, 0)?;
    if src.has_remaining() {
        return Err(DecodeError::TrailingBytes(src.remaining()));
    }
    Ok(value)
}

fn read_value(src: &mut Bytes, ty: WireType, depth: usize) -> Result<WireValue, DecodeError> {
    Ok(match ty {
        WireType::Bool => match read_u8(src)? {
            0 => WireValue::Bool(false),
            1 => WireValue::Bool(true),
            other => return Err(DecodeError::InvalidBool(other)),
        },
        WireType::I8 => WireValue::I8(read_u8(src)? as i8),
        WireType::Double => WireValue::Double(read_f64(src)?),
        WireType::I16 => WireValue::I16(read_i16(src)?),
        WireType::I32 => WireValue::I32(read_i32(src)?),
        WireType::I64 => WireValue::I64(read_i64(src)?),
        WireType::Binary => WireValue::Binary(read_binary(src)?),
        WireType::Struct => WireValue::Struct(read_struct(src, enter(depth)?)?),
        WireType::Map => WireValue::Map(read_map(src, enter(depth)?)?),
        WireType::Set => WireValue::Set(read_list(src, "set", enter(depth)?)?),
        WireType::List => WireValue::List(read_list(src, "list", enter(depth)?)?),
    })
}

fn enter(depth: usize) -> Result<usize, DecodeError> {
    if depth >= MAX_DEPTH {
        return Err(DecodeError::DepthLimit(MAX_DEPTH));
    }
    Ok(depth + 1)
}

fn read_struct(src: &mut Bytes, depth: usize) -> Result<Struct, DecodeError> {
    let mut fields = Vec::new();
    loop {
        let tag = read_u8(src)?;
        if tag == STOP {
            return Ok(Struct::new(fields));
        }
        let ty = WireType::try_from(tag)?;
        let id = read_i16(src)?;
        let value = read_value(src, ty, depth)?;
        fields.push(Field::new(id, value));
    }
}

fn read_map(src: &mut Bytes, depth: usize) -> Result<MapItems, DecodeError> {
    let key_type = WireType::try_from(read_u8(src)?)?;
    let value_type = WireType::try_from(read_u8(src)?)?;
    let min_len = key_type.min_encoded_len() + value_type.min_encoded_len();
    let size = read_size(src, "map", min_len)?;

    let mut items = Vec::with_capacity(size);
    for _ in 0..size {
        let k = read_value(src, key_type, depth)?;
        let v = read_value(src, value_type, depth)?;
        items.push((k, v));
    }
    Ok(MapItems::new(key_type, value_type, items))
}

fn read_list(src: &mut Bytes, what: &'static str, depth: usize) -> Result<ValueList, DecodeError> {
    let elem_type = WireType::try_from(read_u8(src)?)?;
    let size = read_size(src, what, elem_type.min_encoded_len())?;

    let mut items = Vec::with_capacity(size);
    for _ in 0..size {
        items.push(read_value(src, elem_type, depth)?);
    }
    Ok(ValueList::new(elem_type, items))
}
