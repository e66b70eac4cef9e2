//! Encoding of field values, arrays and tables.
//!
//! Containers reserve four bytes for their length, write their entries,
//! then backpatch the length with the number of bytes actually written.

use bytes::{BufMut, BytesMut};

use super::{Array, FieldValue, Table};
use crate::error::Error;
use crate::wire;

impl FieldValue {
    /// Appends the wire encoding of this value to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<(), Error> {
        encode_value(self, dst)
    }
}

impl Table {
    /// Appends the wire encoding of this table to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<(), Error> {
        encode_table(self, dst)
    }
}

impl Array {
    /// Appends the wire encoding of this array to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) -> Result<(), Error> {
        encode_array(self, dst)
    }
}

pub(crate) fn encode_value(value: &FieldValue, dst: &mut BytesMut) -> Result<(), Error> {
    dst.put_u8(value.kind() as u8);

    match value {
        FieldValue::Boolean(v) => dst.put_u8(u8::from(*v)),
        FieldValue::I8(v) => dst.put_i8(*v),
        FieldValue::U8(v) => dst.put_u8(*v),
        FieldValue::I16(v) => dst.put_i16(*v),
        FieldValue::U16(v) => dst.put_u16(*v),
        FieldValue::I32(v) => dst.put_i32(*v),
        FieldValue::U32(v) => dst.put_u32(*v),
        FieldValue::I64(v) => dst.put_i64(*v),
        FieldValue::F32(v) => dst.put_u32(v.to_bits()),
        FieldValue::F64(v) => dst.put_u64(v.to_bits()),
        FieldValue::Decimal(v) => {
            dst.put_u8(v.scale);
            dst.put_u32(v.mantissa);
        }
        FieldValue::LongString(v) | FieldValue::Bytes(v) => {
            if v.len() > u32::MAX as usize {
                return Err(Error::BadWireData("string value exceeds 32-bit length"));
            }
            dst.put_u32(v.len() as u32);
            dst.put_slice(v);
        }
        FieldValue::Array(v) => encode_array(v, dst)?,
        FieldValue::Timestamp(v) => dst.put_u64(*v),
        FieldValue::Table(v) => encode_table(v, dst)?,
        FieldValue::Void => {}
    }

    Ok(())
}

pub(crate) fn encode_table(table: &Table, dst: &mut BytesMut) -> Result<(), Error> {
    let size_at = dst.len();
    dst.put_u32(0); // backpatched below

    for entry in &table.entries {
        if entry.key.len() > 255 {
            return Err(Error::BadWireData("table key longer than 255 bytes"));
        }
        dst.put_u8(entry.key.len() as u8);
        dst.put_slice(&entry.key);
        encode_value(&entry.value, dst)?;
    }

    let written = (dst.len() - size_at - 4) as u32;
    wire::write_u32(&mut dst[..], size_at, written)
}

pub(crate) fn encode_array(array: &Array, dst: &mut BytesMut) -> Result<(), Error> {
    let size_at = dst.len();
    dst.put_u32(0); // backpatched below

    for entry in &array.0 {
        encode_value(entry, dst)?;
    }

    let written = (dst.len() - size_at - 4) as u32;
    wire::write_u32(&mut dst[..], size_at, written)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::value::{Decimal, TableEntry};

    fn roundtrip(value: &FieldValue) -> FieldValue {
        let mut dst = BytesMut::new();
        value.encode(&mut dst).unwrap();
        let frozen = dst.freeze();
        let mut at = 0;
        let decoded = FieldValue::decode(&frozen, &mut at).unwrap();
        assert_eq!(at, frozen.len(), "decode must consume the whole encoding");
        decoded
    }

    #[test]
    fn scalar_kinds_roundtrip() {
        for value in [
            FieldValue::Boolean(true),
            FieldValue::Boolean(false),
            FieldValue::I8(-5),
            FieldValue::U8(200),
            FieldValue::I16(-12_345),
            FieldValue::U16(54_321),
            FieldValue::I32(-1_000_000),
            FieldValue::U32(3_000_000_000),
            FieldValue::I64(-9_000_000_000),
            FieldValue::F32(1.5),
            FieldValue::F64(-2.25e10),
            FieldValue::Decimal(Decimal {
                scale: 2,
                mantissa: 12_345,
            }),
            FieldValue::LongString(Bytes::from_static(b"hello")),
            FieldValue::Bytes(Bytes::from_static(&[0, 1, 2, 0xFF])),
            FieldValue::Timestamp(1_700_000_000),
            FieldValue::Void,
        ] {
            assert_eq!(roundtrip(&value), value);
        }
    }

    #[test]
    fn float_bit_patterns_are_preserved() {
        let value = FieldValue::F64(f64::from_bits(0x7FF0_0000_0000_0001 ^ 0x1234));
        let mut dst = BytesMut::new();
        value.encode(&mut dst).unwrap();
        // tag byte + raw bit pattern
        assert_eq!(dst[0], b'd');
        if let FieldValue::F64(v) = value {
            assert_eq!(&dst[1..9], &v.to_bits().to_be_bytes()[..]);
        }
    }

    #[test]
    fn nested_structures_roundtrip() {
        let mut inner = Table::new();
        inner.insert("depth", 3i32);
        let mid = FieldValue::Array(Array(vec![
            FieldValue::Table(inner),
            FieldValue::LongString(Bytes::from_static(b"mid")),
        ]));
        let mut outer = Table::new();
        outer.insert("nested", FieldValue::Array(Array(vec![mid])));
        outer.insert("plain", 7i64);

        let value = FieldValue::Table(outer);
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn table_roundtrip_preserves_entry_count_and_order() {
        let mut table = Table::new();
        for key in ["one", "two", "three", "four"] {
            table.insert(key, FieldValue::from(key));
        }
        let mut dst = BytesMut::new();
        table.encode(&mut dst).unwrap();
        let frozen = dst.freeze();
        let mut at = 0;
        let decoded = Table::decode(&frozen, &mut at).unwrap();
        assert_eq!(decoded.len(), 4);
        let keys: Vec<&[u8]> = decoded.entries.iter().map(|e| e.key.as_ref()).collect();
        assert_eq!(keys, vec![b"one".as_ref(), b"two", b"three", b"four"]);
    }

    #[test]
    fn declared_length_bounds_nested_reads() {
        let mut table = Table::new();
        table.insert("key", FieldValue::LongString(Bytes::from_static(b"value")));
        let mut dst = BytesMut::new();
        table.encode(&mut dst).unwrap();

        // shrink the declared table size so the entry runs past the boundary
        let truncated = (dst.len() - 4 - 2) as u32;
        wire::write_u32(&mut dst[..], 0, truncated).unwrap();
        let frozen = dst.freeze();
        let mut at = 0;
        assert!(matches!(
            Table::decode(&frozen, &mut at),
            Err(Error::BadWireData(_))
        ));
    }

    #[test]
    fn truncated_input_is_bad_wire_data() {
        let mut dst = BytesMut::new();
        FieldValue::I64(42).encode(&mut dst).unwrap();
        let frozen = dst.freeze().slice(0..5);
        let mut at = 0;
        assert!(matches!(
            FieldValue::decode(&frozen, &mut at),
            Err(Error::BadWireData(_))
        ));
    }

    #[test]
    fn unknown_kind_tag_is_rejected() {
        let frozen = Bytes::from_static(&[b'Z', 0, 0]);
        let mut at = 0;
        assert!(matches!(
            FieldValue::decode(&frozen, &mut at),
            Err(Error::BadWireData("unknown field kind tag"))
        ));
    }

    #[test]
    fn nesting_depth_is_capped() {
        // 64 nested arrays: 'A' tag + 4-byte length each
        let mut dst = BytesMut::new();
        let mut value = FieldValue::Array(Array(Vec::new()));
        for _ in 0..64 {
            value = FieldValue::Array(Array(vec![value]));
        }
        value.encode(&mut dst).unwrap();
        let frozen = dst.freeze();
        let mut at = 0;
        assert!(matches!(
            FieldValue::decode(&frozen, &mut at),
            Err(Error::BadWireData(_))
        ));
    }

    #[test]
    fn oversized_table_key_is_rejected_on_encode() {
        let table = Table {
            entries: vec![TableEntry {
                key: Bytes::from(vec![b'k'; 256]),
                value: FieldValue::Void,
            }],
        };
        let mut dst = BytesMut::new();
        assert!(matches!(
            table.encode(&mut dst),
            Err(Error::BadWireData("table key longer than 255 bytes"))
        ));
    }
}
