//! Variable-length integer encoding used by the index codec.
//!
//! Counts in the persisted index (values per node, children per node) are
//! almost always tiny, so they are written as LEB128 varints: seven payload
//! bits per byte, high bit set on every byte except the last.

use std::io::Write;

use crate::error::{LexidxError, Result};

/// Longest encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

/// Write `value` to `writer` and return the number of bytes written.
pub fn write_u64<W: Write + ?Sized>(writer: &mut W, value: u64) -> std::io::Result<usize> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_u64(value, &mut buf);
    writer.write_all(&buf[..len])?;
    Ok(len)
}

/// Encode `value` into `buf`, returning the encoded length.
pub fn encode_u64(value: u64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut val = value;
    let mut i = 0;

    loop {
        let mut byte = (val & 0x7F) as u8;
        val >>= 7;

        if val != 0 {
            byte |= 0x80;
        }

        buf[i] = byte;
        i += 1;

        if val == 0 {
            return i;
        }
    }
}

/// Decode a varint from the front of `input` and advance it past the bytes read.
pub fn read_u64(input: &mut &[u8]) -> Result<u64> {
    let mut result = 0u64;
    let mut shift = 0u32;

    for (i, &byte) in input.iter().enumerate() {
        if i >= MAX_VARINT_LEN {
            return Err(LexidxError::index_format("varint overflow"));
        }

        let payload = (byte & 0x7F) as u64;
        if shift == 63 && payload > 1 {
            return Err(LexidxError::index_format("varint overflow"));
        }
        result |= payload << shift;

        if (byte & 0x80) == 0 {
            *input = &input[i + 1..];
            return Ok(result);
        }

        shift += 7;
    }

    Err(LexidxError::index_format("incomplete varint"))
}
