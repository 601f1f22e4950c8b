use bytes::{Buf as _, BufMut as _, Bytes, BytesMut};

use super::DecodeError;

fn need(src: &Bytes, n: usize) -> Result<(), DecodeError> {
    if src.remaining() < n {
        return Err(DecodeError::Truncated {
            needed: n,
            remaining: src.remaining(),
        });
    }
    Ok(())
}

pub(super) fn read_u8(src: &mut Bytes) -> Result<u8, DecodeError> {
    need(src, 1)?;
    Ok(src.get_u8())
}

pub(super) fn read_i16(src: &mut Bytes) -> Result<i16, DecodeError> {
    need(src, 2)?;
    Ok(src.get_i16())
}

pub(super) fn read_i32(src: &mut Bytes) -> Result<i32, DecodeError> {
    need(src, 4)?;
    Ok(src.get_i32())
}

pub(super) fn read_i64(src: &mut Bytes) -> Result<i64, DecodeError> {
    need(src, 8)?;
    Ok(src.get_i64())
}

pub(super) fn read_f64(src: &mut Bytes) -> Result<f64, DecodeError> {
    need(src, 8)?;
    Ok(src.get_f64())
}

/// Reads an i32 size prefix and checks it against the bytes left, assuming each element
/// occupies at least `min_elem_len` bytes.
pub(super) fn read_size(
    src: &mut Bytes,
    what: &'static str,
    min_elem_len: usize,
) -> Result<usize, DecodeError> {
    let size = read_i32(src)?;
    let Ok(n) = usize::try_from(size) else {
        return Err(DecodeError::NegativeSize { what, size });
    };
    if n.saturating_mul(min_elem_len) > src.remaining() {
        return Err(DecodeError::SizeTooLarge {
            what,
            size: n,
            remaining: src.remaining(),
        });
    }
    Ok(n)
}

pub(super) fn read_binary(src: &mut Bytes) -> Result<Bytes, DecodeError> {
    let len = read_size(src, "binary", 1)?;
    Ok(src.split_to(len))
}

pub(super) fn write_binary(bytes: &Bytes, out: &mut BytesMut) {
    write_size(bytes.len(), out);
    out.put_slice(bytes);
}

/// Writes an i32 size prefix.
///
/// # Panics
///
/// Panics if `len` exceeds `i32::MAX`, the largest size the binary protocol can express.
pub(super) fn write_size(len: usize, out: &mut BytesMut) {
    let Ok(size) = i32::try_from(len) else {
        panic!("size {len} exceeds the binary protocol limit of {}", i32::MAX);
    };
    out.put_i32(size);
}
