//! Thrift binary protocol codec.
//!
//! Decoding produces a generic [`WireValue`] tree; interpreting that tree against declared types
//! happens in [`crate::value_from_wire`].

mod decode;
mod encode;
mod primitives;
mod value;

pub use decode::{MAX_DEPTH, decode};
pub use encode::{encode, write_value};
pub use value::{Field, MapItems, Struct, ValueList, WireType, WireValue};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("unexpected end of input: need {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("unknown type tag {0}")]
    UnknownType(u8),

    #[error("invalid bool value {0}")]
    InvalidBool(u8),

    #[error("negative {what} size {size}")]
    NegativeSize { what: &'static str, size: i32 },

    #[error("{what} size {size} exceeds remaining input ({remaining} bytes)")]
    SizeTooLarge {
        what: &'static str,
        size: usize,
        remaining: usize,
    },

    #[error("value nesting exceeds {0} levels")]
    DepthLimit(usize),

    #[error("{0} trailing bytes after root value")]
    TrailingBytes(usize),
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use bytes::{BufMut as _, Bytes, BytesMut};

    fn sample_struct() -> WireValue {
        WireValue::Struct(Struct::new(vec![
            Field::new(1, WireValue::Binary(Bytes::from_static(b"hi"))),
            Field::new(
                2,
                WireValue::List(ValueList::new(
                    WireType::I32,
                    vec![WireValue::I32(1), WireValue::I32(-2)],
                )),
            ),
            Field::new(
                3,
                WireValue::Map(MapItems::new(
                    WireType::Binary,
                    WireType::Bool,
                    vec![(WireValue::Binary(Bytes::from_static(b"k")), WireValue::Bool(true))],
                )),
            ),
            Field::new(4, WireValue::Double(1.5)),
        ]))
    }

    #[test]
    fn decodes_hand_written_struct() {
        let mut buf = BytesMut::new();
        // field 1: i32 = 42
        buf.put_u8(8);
        buf.put_i16(1);
        buf.put_i32(42);
        // field 2: string "ab"
        buf.put_u8(11);
        buf.put_i16(2);
        buf.put_i32(2);
        buf.put_slice(b"ab");
        buf.put_u8(0);

        let got = decode(buf.freeze(), WireType::Struct).unwrap();
        let WireValue::Struct(s) = got else {
            panic!("expected struct");
        };
        assert_eq!(s.fields.len(), 2);
        assert_eq!(s.fields[0].id, 1);
        assert_eq!(s.fields[0].value, WireValue::I32(42));
        assert_eq!(
            s.fields[1].value,
            WireValue::Binary(Bytes::from_static(b"ab"))
        );
    }

    #[test]
    fn encoded_struct_decodes_to_the_same_tree() {
        let v = sample_struct();
        let got = decode(encode(&v), WireType::Struct).unwrap();
        assert_eq!(got, v);
    }

    #[test]
    fn truncated_input_is_rejected() {
        let bytes = encode(&sample_struct());
        let cut = bytes.slice(..bytes.len() - 3);
        assert!(matches!(
            decode(cut, WireType::Struct),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(decode(Bytes::new(), WireType::Struct).is_err());
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut buf = BytesMut::from(&encode(&sample_struct())[..]);
        buf.put_u8(0);
        assert_eq!(
            decode(buf.freeze(), WireType::Struct),
            Err(DecodeError::TrailingBytes(1))
        );
    }

    #[test]
    fn unknown_field_type_is_rejected() {
        let bytes = Bytes::from_static(&[9, 0, 1, 0]);
        assert_eq!(
            decode(bytes, WireType::Struct),
            Err(DecodeError::UnknownType(9))
        );
    }

    #[test]
    fn oversized_list_is_rejected_before_allocating() {
        let mut buf = BytesMut::new();
        buf.put_u8(8);
        buf.put_i32(i32::MAX);
        assert!(matches!(
            decode(buf.freeze(), WireType::List),
            Err(DecodeError::SizeTooLarge { what: "list", .. })
        ));
    }

    #[test]
    fn negative_binary_length_is_rejected() {
        let mut buf = BytesMut::new();
        buf.put_i32(-1);
        assert_eq!(
            decode(buf.freeze(), WireType::Binary),
            Err(DecodeError::NegativeSize {
                what: "binary",
                size: -1
            })
        );
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let mut buf = BytesMut::new();
        for _ in 0..=MAX_DEPTH {
            buf.put_u8(12);
            buf.put_i16(1);
        }
        for _ in 0..=MAX_DEPTH + 1 {
            buf.put_u8(0);
        }
        assert_eq!(
            decode(buf.freeze(), WireType::Struct),
            Err(DecodeError::DepthLimit(MAX_DEPTH))
        );
    }

    #[test]
    fn size_prefix_at_limit_is_written() {
        let mut out = BytesMut::new();
        primitives::write_size(i32::MAX as usize, &mut out);
        assert_eq!(&out[..], &i32::MAX.to_be_bytes());
    }

    #[test]
    #[should_panic(expected = "exceeds the binary protocol limit")]
    fn size_prefix_over_limit_panics() {
        let mut out = BytesMut::new();
        primitives::write_size(i32::MAX as usize + 1, &mut out);
    }

    #[test]
    fn struct_display_lists_fields() {
        let s = Struct::new(vec![Field::new(0, WireValue::I32(5))]);
        assert_eq!(s.to_string(), "[{id:0 value:I32(5)}]");
    }
}
