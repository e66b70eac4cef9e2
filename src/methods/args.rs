//! Cursor-based reader and writer for method argument lists.
//!
//! Method arguments use the fixed 0-9-1 field layout: unsigned integers in
//! network byte order, short strings (1-byte length), long strings (4-byte
//! length), field tables, and bit fields. Consecutive bit fields pack into
//! a shared octet, starting at the least significant bit; any non-bit
//! field closes the current bit octet.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::Error;
use crate::value::{de, Table};

const TRUNCATED: Error = Error::BadWireData("method arguments truncated");

/// Reads argument fields from one decoded frame payload, advancing a
/// cursor. String reads are zero-copy slices of the payload generation.
#[derive(Debug)]
pub(crate) struct Reader<'a> {
    src: &'a Bytes,
    at: usize,
    bit_octet: u8,
    bit_count: u8,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(src: &'a Bytes) -> Self {
        Self {
            src,
            at: 0,
            bit_octet: 0,
            bit_count: 0,
        }
    }

    fn take(&mut self, len: usize) -> Result<usize, Error> {
        let start = self.at;
        match start.checked_add(len) {
            Some(end) if end <= self.src.len() => {
                self.at = end;
                Ok(start)
            }
            _ => Err(TRUNCATED),
        }
    }

    pub(crate) fn u8(&mut self) -> Result<u8, Error> {
        self.bit_count = 0;
        let at = self.take(1)?;
        Ok(self.src[at])
    }

    pub(crate) fn u16(&mut self) -> Result<u16, Error> {
        self.bit_count = 0;
        let at = self.take(2)?;
        Ok(u16::from_be_bytes([self.src[at], self.src[at + 1]]))
    }

    pub(crate) fn u32(&mut self) -> Result<u32, Error> {
        self.bit_count = 0;
        let at = self.take(4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.src[at..at + 4]);
        Ok(u32::from_be_bytes(bytes))
    }

    pub(crate) fn u64(&mut self) -> Result<u64, Error> {
        self.bit_count = 0;
        let at = self.take(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.src[at..at + 8]);
        Ok(u64::from_be_bytes(bytes))
    }

    /// Reads the next packed bit, fetching a fresh octet when the previous
    /// one is exhausted or was closed by a non-bit field.
    pub(crate) fn bit(&mut self) -> Result<bool, Error> {
        if self.bit_count == 0 {
            let at = self.take(1)?;
            self.bit_octet = self.src[at];
        }
        let bit = self.bit_octet & (1 << self.bit_count) != 0;
        self.bit_count = (self.bit_count + 1) % 8;
        Ok(bit)
    }

    pub(crate) fn shortstr(&mut self) -> Result<Bytes, Error> {
        let len = self.u8()? as usize;
        let at = self.take(len)?;
        Ok(self.src.slice(at..at + len))
    }

    pub(crate) fn longstr(&mut self) -> Result<Bytes, Error> {
        let len = self.u32()? as usize;
        let at = self.take(len)?;
        Ok(self.src.slice(at..at + len))
    }

    pub(crate) fn table(&mut self) -> Result<Table, Error> {
        self.bit_count = 0;
        de::decode_table(self.src, &mut self.at, self.src.len(), 0)
    }
}

/// Appends argument fields to an outbound buffer, packing consecutive bits.
#[derive(Debug)]
pub(crate) struct Writer<'a> {
    dst: &'a mut BytesMut,
    bit_at: usize,
    bit_count: u8,
}

impl<'a> Writer<'a> {
    pub(crate) fn new(dst: &'a mut BytesMut) -> Self {
        Self {
            dst,
            bit_at: 0,
            bit_count: 0,
        }
    }

    pub(crate) fn u8(&mut self, value: u8) {
        self.bit_count = 0;
        self.dst.put_u8(value);
    }

    pub(crate) fn u16(&mut self, value: u16) {
        self.bit_count = 0;
        self.dst.put_u16(value);
    }

    pub(crate) fn u32(&mut self, value: u32) {
        self.bit_count = 0;
        self.dst.put_u32(value);
    }

    pub(crate) fn u64(&mut self, value: u64) {
        self.bit_count = 0;
        self.dst.put_u64(value);
    }

    /// Appends one packed bit, opening a fresh octet when the previous one
    /// is full or was closed by a non-bit field.
    pub(crate) fn bit(&mut self, value: bool) {
        if self.bit_count == 0 {
            self.bit_at = self.dst.len();
            self.dst.put_u8(0);
        }
        if value {
            self.dst[self.bit_at] |= 1 << self.bit_count;
        }
        self.bit_count = (self.bit_count + 1) % 8;
    }

    pub(crate) fn shortstr(&mut self, value: &Bytes) -> Result<(), Error> {
        if value.len() > 255 {
            return Err(Error::BadWireData("short string longer than 255 bytes"));
        }
        self.u8(value.len() as u8);
        self.bit_count = 0;
        self.dst.put_slice(value);
        Ok(())
    }

    pub(crate) fn longstr(&mut self, value: &Bytes) -> Result<(), Error> {
        if value.len() > u32::MAX as usize {
            return Err(Error::BadWireData("long string exceeds 32-bit length"));
        }
        self.u32(value.len() as u32);
        self.bit_count = 0;
        self.dst.put_slice(value);
        Ok(())
    }

    pub(crate) fn table(&mut self, value: &Table) -> Result<(), Error> {
        self.bit_count = 0;
        value.encode(self.dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_bits_share_an_octet() {
        let mut dst = BytesMut::new();
        let mut w = Writer::new(&mut dst);
        w.bit(true);
        w.bit(false);
        w.bit(true);
        w.u8(9);
        w.bit(true);
        drop(w);
        // 0b101 packed in one octet, then the u8, then a new bit octet
        assert_eq!(&dst[..], &[0b0000_0101, 9, 0b0000_0001]);

        let frozen = dst.freeze();
        let mut r = Reader::new(&frozen);
        assert!(r.bit().unwrap());
        assert!(!r.bit().unwrap());
        assert!(r.bit().unwrap());
        assert_eq!(r.u8().unwrap(), 9);
        assert!(r.bit().unwrap());
    }

    #[test]
    fn nine_bits_spill_into_a_second_octet() {
        let mut dst = BytesMut::new();
        let mut w = Writer::new(&mut dst);
        for i in 0..9 {
            w.bit(i % 2 == 0);
        }
        drop(w);
        assert_eq!(dst.len(), 2);

        let frozen = dst.freeze();
        let mut r = Reader::new(&frozen);
        for i in 0..9 {
            assert_eq!(r.bit().unwrap(), i % 2 == 0);
        }
    }

    #[test]
    fn strings_roundtrip() {
        let mut dst = BytesMut::new();
        let mut w = Writer::new(&mut dst);
        w.shortstr(&Bytes::from_static(b"queue")).unwrap();
        w.longstr(&Bytes::from_static(b"payload")).unwrap();
        drop(w);

        let frozen = dst.freeze();
        let mut r = Reader::new(&frozen);
        assert_eq!(r.shortstr().unwrap(), Bytes::from_static(b"queue"));
        assert_eq!(r.longstr().unwrap(), Bytes::from_static(b"payload"));
    }

    #[test]
    fn truncated_arguments_are_rejected() {
        let frozen = Bytes::from_static(&[0x00, 0x01]);
        let mut r = Reader::new(&frozen);
        assert!(matches!(r.u32(), Err(Error::BadWireData(_))));
    }
}
