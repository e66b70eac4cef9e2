//! Typed field values, arrays and tables.
//!
//! Field values are the self-describing payload of protocol arguments and
//! message headers: a one-byte kind tag followed by a kind-specific
//! payload. Tag byte values are fixed by the AMQP 0-9-1 specification and
//! must match it exactly for interoperability.

use bytes::Bytes;

pub(crate) mod de;
pub(crate) mod ser;

/// Kind tags for field values.
///
/// The discriminants are the exact tag bytes used on the wire. There is no
/// unsigned 64-bit kind in AMQP 0-9-1; timestamps are carried separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FieldKind {
    /// Boolean, 1 byte
    Boolean = b't',
    /// Signed 8-bit integer
    I8 = b'b',
    /// Unsigned 8-bit integer
    U8 = b'B',
    /// Signed 16-bit integer
    I16 = b's',
    /// Unsigned 16-bit integer
    U16 = b'u',
    /// Signed 32-bit integer
    I32 = b'I',
    /// Unsigned 32-bit integer
    U32 = b'i',
    /// Signed 64-bit integer
    I64 = b'l',
    /// 32-bit float, raw IEEE-754 bit pattern
    F32 = b'f',
    /// 64-bit float, raw IEEE-754 bit pattern
    F64 = b'd',
    /// Scaled decimal: 1-byte scale + 4-byte mantissa
    Decimal = b'D',
    /// Length-prefixed string, interpreted as UTF-8
    LongString = b'S',
    /// Length-prefixed opaque bytes
    Bytes = b'x',
    /// Ordered sequence of field values
    Array = b'A',
    /// 64-bit POSIX timestamp, no unit conversion applied
    Timestamp = b'T',
    /// Nested field table
    Table = b'F',
    /// No payload
    Void = b'V',
}

impl TryFrom<u8> for FieldKind {
    type Error = u8;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        let kind = match tag {
            b't' => Self::Boolean,
            b'b' => Self::I8,
            b'B' => Self::U8,
            b's' => Self::I16,
            b'u' => Self::U16,
            b'I' => Self::I32,
            b'i' => Self::U32,
            b'l' => Self::I64,
            b'f' => Self::F32,
            b'd' => Self::F64,
            b'D' => Self::Decimal,
            b'S' => Self::LongString,
            b'x' => Self::Bytes,
            b'A' => Self::Array,
            b'T' => Self::Timestamp,
            b'F' => Self::Table,
            b'V' => Self::Void,
            _ => return Err(tag),
        };
        Ok(kind)
    }
}

/// Scaled decimal value: `mantissa / 10^scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimal {
    /// Number of decimal digits after the point
    pub scale: u8,
    /// Unscaled value
    pub mantissa: u32,
}

/// A single decoded or to-be-encoded field value.
///
/// [`FieldValue::LongString`] and [`FieldValue::Bytes`] share the same wire
/// shape (4-byte length + raw bytes) and differ only in interpretation;
/// neither is UTF-8 validated.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Boolean
    Boolean(bool),
    /// Signed 8-bit integer
    I8(i8),
    /// Unsigned 8-bit integer
    U8(u8),
    /// Signed 16-bit integer
    I16(i16),
    /// Unsigned 16-bit integer
    U16(u16),
    /// Signed 32-bit integer
    I32(i32),
    /// Unsigned 32-bit integer
    U32(u32),
    /// Signed 64-bit integer
    I64(i64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// Scaled decimal
    Decimal(Decimal),
    /// Length-prefixed string
    LongString(Bytes),
    /// Length-prefixed opaque bytes
    Bytes(Bytes),
    /// Heterogeneous ordered sequence
    Array(Array),
    /// 64-bit POSIX timestamp
    Timestamp(u64),
    /// Nested table
    Table(Table),
    /// Empty value
    Void,
}

impl FieldValue {
    /// The kind tag this value encodes with.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Boolean(_) => FieldKind::Boolean,
            FieldValue::I8(_) => FieldKind::I8,
            FieldValue::U8(_) => FieldKind::U8,
            FieldValue::I16(_) => FieldKind::I16,
            FieldValue::U16(_) => FieldKind::U16,
            FieldValue::I32(_) => FieldKind::I32,
            FieldValue::U32(_) => FieldKind::U32,
            FieldValue::I64(_) => FieldKind::I64,
            FieldValue::F32(_) => FieldKind::F32,
            FieldValue::F64(_) => FieldKind::F64,
            FieldValue::Decimal(_) => FieldKind::Decimal,
            FieldValue::LongString(_) => FieldKind::LongString,
            FieldValue::Bytes(_) => FieldKind::Bytes,
            FieldValue::Array(_) => FieldKind::Array,
            FieldValue::Timestamp(_) => FieldKind::Timestamp,
            FieldValue::Table(_) => FieldKind::Table,
            FieldValue::Void => FieldKind::Void,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::I32(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::I64(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::LongString(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<Table> for FieldValue {
    fn from(value: Table) -> Self {
        FieldValue::Table(value)
    }
}

impl From<Array> for FieldValue {
    fn from(value: Array) -> Self {
        FieldValue::Array(value)
    }
}

/// Ordered sequence of field values. Heterogeneous; element kinds are not
/// validated against each other.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Array(pub Vec<FieldValue>);

impl Array {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<FieldValue>> for Array {
    fn from(entries: Vec<FieldValue>) -> Self {
        Array(entries)
    }
}

/// One `(key, value)` pair of a field table. Keys are at most 255 bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    /// Raw key bytes
    pub key: Bytes,
    /// Field value
    pub value: FieldValue,
}

/// Ordered field table.
///
/// Decoding preserves arrival order and duplicate keys are representable;
/// canonical use treats keys as unique. [`Table::sort_by_key`] is the only
/// place entries are ever reordered.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Entries in insertion (or wire arrival) order
    pub entries: Vec<TableEntry>,
}

impl Table {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an entry, preserving insertion order.
    pub fn insert(&mut self, key: impl Into<Bytes>, value: impl Into<FieldValue>) {
        self.entries.push(TableEntry {
            key: key.into(),
            value: value.into(),
        });
    }

    /// First value stored under `key`, if any.
    pub fn get(&self, key: &[u8]) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// Sorts entries lexicographically by raw key bytes, a shorter key
    /// ordering before any longer key it prefixes. Stable, so duplicate
    /// keys keep their relative order.
    pub fn sort_by_key(&mut self) {
        self.entries
            .sort_by(|a, b| a.key.as_ref().cmp(b.key.as_ref()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_match_the_wire_protocol() {
        assert_eq!(FieldKind::Boolean as u8, b't');
        assert_eq!(FieldKind::LongString as u8, b'S');
        assert_eq!(FieldKind::Table as u8, b'F');
        assert_eq!(FieldKind::try_from(b'A'), Ok(FieldKind::Array));
        assert_eq!(FieldKind::try_from(b'Z'), Err(b'Z'));
    }

    #[test]
    fn table_preserves_insertion_order() {
        let mut table = Table::new();
        table.insert("zzz", 1i32);
        table.insert("aaa", 2i32);
        table.insert("mmm", 3i32);
        let keys: Vec<&[u8]> = table.entries.iter().map(|e| e.key.as_ref()).collect();
        assert_eq!(keys, vec![b"zzz".as_ref(), b"aaa", b"mmm"]);
    }

    #[test]
    fn sort_orders_by_bytes_with_shorter_prefix_first() {
        let mut table = Table::new();
        table.insert("ab", FieldValue::Void);
        table.insert("a", FieldValue::Void);
        table.insert("b", FieldValue::Void);
        table.sort_by_key();
        let keys: Vec<&[u8]> = table.entries.iter().map(|e| e.key.as_ref()).collect();
        assert_eq!(keys, vec![b"a".as_ref(), b"ab", b"b"]);
    }
}
