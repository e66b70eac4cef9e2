//! Decoding of field values, arrays and tables.
//!
//! Decoding walks a cursor over one frozen frame generation. String and
//! byte values are zero-copy slices of that generation. Containers are
//! built in two phases: entries accumulate in a growable scratch `Vec`
//! (the entry count is unknown until the declared boundary is reached) and
//! the exact-sized result is frozen afterwards.
//!
//! Every nested length field is validated against its parent's declared
//! boundary before it is descended into, and recursion is capped at
//! [`MAX_NESTING_DEPTH`](crate::constants::MAX_NESTING_DEPTH); both
//! violations decode as [`Error::BadWireData`], never as a read past the
//! boundary.

use bytes::Bytes;

use super::{Array, Decimal, FieldKind, FieldValue, Table, TableEntry};
use crate::constants::MAX_NESTING_DEPTH;
use crate::error::Error;
use crate::wire;

/// Advances the cursor over `len` bytes, failing if the read would cross
/// `limit`. Returns the offset the read starts at.
#[inline]
fn take(at: &mut usize, limit: usize, len: usize) -> Result<usize, Error> {
    let start = *at;
    match start.checked_add(len) {
        Some(end) if end <= limit => {
            *at = end;
            Ok(start)
        }
        _ => Err(Error::BadWireData(
            "field extends past its declared boundary",
        )),
    }
}

impl FieldValue {
    /// Decodes one field value starting at `*at`, advancing the cursor.
    pub fn decode(src: &Bytes, at: &mut usize) -> Result<Self, Error> {
        decode_value(src, at, src.len(), 0)
    }
}

impl Table {
    /// Decodes a field table starting at `*at`, advancing the cursor.
    pub fn decode(src: &Bytes, at: &mut usize) -> Result<Self, Error> {
        decode_table(src, at, src.len(), 0)
    }
}

impl Array {
    /// Decodes a field array starting at `*at`, advancing the cursor.
    pub fn decode(src: &Bytes, at: &mut usize) -> Result<Self, Error> {
        decode_array(src, at, src.len(), 0)
    }
}

pub(crate) fn decode_value(
    src: &Bytes,
    at: &mut usize,
    limit: usize,
    depth: u8,
) -> Result<FieldValue, Error> {
    let tag_at = take(at, limit, 1)?;
    let kind = FieldKind::try_from(src[tag_at])
        .map_err(|_| Error::BadWireData("unknown field kind tag"))?;

    let value = match kind {
        FieldKind::Boolean => {
            let v = take(at, limit, 1)?;
            FieldValue::Boolean(src[v] != 0)
        }
        FieldKind::I8 => {
            let v = take(at, limit, 1)?;
            FieldValue::I8(src[v] as i8)
        }
        FieldKind::U8 => {
            let v = take(at, limit, 1)?;
            FieldValue::U8(src[v])
        }
        FieldKind::I16 => {
            let v = take(at, limit, 2)?;
            FieldValue::I16(wire::read_u16(src, v)? as i16)
        }
        FieldKind::U16 => {
            let v = take(at, limit, 2)?;
            FieldValue::U16(wire::read_u16(src, v)?)
        }
        FieldKind::I32 => {
            let v = take(at, limit, 4)?;
            FieldValue::I32(wire::read_u32(src, v)? as i32)
        }
        FieldKind::U32 => {
            let v = take(at, limit, 4)?;
            FieldValue::U32(wire::read_u32(src, v)?)
        }
        FieldKind::I64 => {
            let v = take(at, limit, 8)?;
            FieldValue::I64(wire::read_u64(src, v)? as i64)
        }
        FieldKind::F32 => {
            let v = take(at, limit, 4)?;
            FieldValue::F32(f32::from_bits(wire::read_u32(src, v)?))
        }
        FieldKind::F64 => {
            let v = take(at, limit, 8)?;
            FieldValue::F64(f64::from_bits(wire::read_u64(src, v)?))
        }
        FieldKind::Decimal => {
            let scale_at = take(at, limit, 1)?;
            let mantissa_at = take(at, limit, 4)?;
            FieldValue::Decimal(Decimal {
                scale: src[scale_at],
                mantissa: wire::read_u32(src, mantissa_at)?,
            })
        }
        FieldKind::LongString | FieldKind::Bytes => {
            let len_at = take(at, limit, 4)?;
            let len = wire::read_u32(src, len_at)? as usize;
            let data_at = take(at, limit, len)?;
            let data = src.slice(data_at..data_at + len);
            match kind {
                FieldKind::LongString => FieldValue::LongString(data),
                _ => FieldValue::Bytes(data),
            }
        }
        FieldKind::Array => FieldValue::Array(decode_array(src, at, limit, depth)?),
        FieldKind::Timestamp => {
            let v = take(at, limit, 8)?;
            FieldValue::Timestamp(wire::read_u64(src, v)?)
        }
        FieldKind::Table => FieldValue::Table(decode_table(src, at, limit, depth)?),
        FieldKind::Void => FieldValue::Void,
    };

    Ok(value)
}

pub(crate) fn decode_table(
    src: &Bytes,
    at: &mut usize,
    limit: usize,
    depth: u8,
) -> Result<Table, Error> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(Error::BadWireData("table nesting depth limit exceeded"));
    }

    let size_at = take(at, limit, 4)?;
    let size = wire::read_u32(src, size_at)? as usize;
    let mut cursor = take(at, limit, size)?;
    let end = *at;

    let mut entries = Vec::new();
    while cursor < end {
        let klen_at = take(&mut cursor, end, 1)?;
        let klen = src[klen_at] as usize;
        let key_at = take(&mut cursor, end, klen)?;
        let key = src.slice(key_at..key_at + klen);
        let value = decode_value(src, &mut cursor, end, depth + 1)?;
        entries.push(TableEntry { key, value });
    }

    Ok(Table { entries })
}

pub(crate) fn decode_array(
    src: &Bytes,
    at: &mut usize,
    limit: usize,
    depth: u8,
) -> Result<Array, Error> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(Error::BadWireData("array nesting depth limit exceeded"));
    }

    let size_at = take(at, limit, 4)?;
    let size = wire::read_u32(src, size_at)? as usize;
    let mut cursor = take(at, limit, size)?;
    let end = *at;

    let mut entries = Vec::new();
    while cursor < end {
        entries.push(decode_value(src, &mut cursor, end, depth + 1)?);
    }

    Ok(Array(entries))
}
