use bytes::{BufMut as _, Bytes, BytesMut};

use super::primitives::{write_binary, write_size};
use super::{Struct, WireValue};

/// Encodes `value` with the binary protocol.
///
/// # Panics
///
/// Panics if a binary value or container holds more than `i32::MAX` bytes or elements.
pub fn encode(value: &WireValue) -> Bytes {
    let mut out = BytesMut::new();
    write_value(value, &mut out);
    out.freeze()
}

/// Appends the encoding of `value` to `out`. Panics under the same conditions as [`encode`].
pub fn write_value(value: &WireValue, out: &mut BytesMut) {
    match value {
        WireValue::Bool(v) => out.put_u8(u8::from(*v)),
        WireValue::I8(v) => out.put_i8(*v),
        WireValue::Double(v) => out.put_f64(*v),
        WireValue::I16(v) => out.put_i16(*v),
        WireValue::I32(v) => out.put_i32(*v),
        WireValue::I64(v) => out.put_i64(*v),
        WireValue::Binary(v) => write_binary(v, out),
        WireValue::Struct(s) => write_struct(s, out),
        WireValue::Map(m) => {
            out.put_u8(m.key_type.tag());
            out.put_u8(m.value_type.tag());
            write_size(m.items.len(), out);
            for (k, v) in &m.items {
                write_value(k, out);
                write_value(v, out);
            }
        }
        WireValue::Set(l) | WireValue::List(l) => {
            out.put_u8(l.elem_type.tag());
            write_size(l.items.len(), out);
            for item in &l.items {
                write_value(item, out);
            }
        }
    }
}

fn write_struct(s: &Struct, out: &mut BytesMut) {
    for field in &s.fields {
        out.put_u8(field.value.wire_type().tag());
        out.put_i16(field.id);
        write_value(&field.value, out);
    }
    out.put_u8(0);
}
