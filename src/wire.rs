//! Bounds-checked big-endian primitives over borrowed byte views.
//!
//! All multi-byte values are network byte order on the wire. Every
//! operation validates `offset + width` against the view length before
//! touching memory and fails with [`Error::OffsetOutOfBounds`] otherwise;
//! 64-bit values are composed of two 32-bit big-endian halves.

use crate::error::Error;

#[inline]
fn check(buf: &[u8], at: usize, len: usize) -> Result<(), Error> {
    match at.checked_add(len) {
        Some(end) if end <= buf.len() => Ok(()),
        _ => Err(Error::OffsetOutOfBounds {
            offset: at,
            len,
            size: buf.len(),
        }),
    }
}

/// Reads one byte at `at`.
#[inline]
pub fn read_u8(buf: &[u8], at: usize) -> Result<u8, Error> {
    check(buf, at, 1)?;
    Ok(buf[at])
}

/// Reads a big-endian `u16` at `at`.
#[inline]
pub fn read_u16(buf: &[u8], at: usize) -> Result<u16, Error> {
    check(buf, at, 2)?;
    Ok(u16::from_be_bytes([buf[at], buf[at + 1]]))
}

/// Reads a big-endian `u32` at `at`.
#[inline]
pub fn read_u32(buf: &[u8], at: usize) -> Result<u32, Error> {
    check(buf, at, 4)?;
    Ok(u32::from_be_bytes([
        buf[at],
        buf[at + 1],
        buf[at + 2],
        buf[at + 3],
    ]))
}

/// Reads a big-endian `u64` at `at` as two 32-bit halves.
#[inline]
pub fn read_u64(buf: &[u8], at: usize) -> Result<u64, Error> {
    check(buf, at, 8)?;
    let hi = read_u32(buf, at)? as u64;
    let lo = read_u32(buf, at + 4)? as u64;
    Ok(hi << 32 | lo)
}

/// Borrows `len` bytes starting at `at`.
#[inline]
pub fn read_bytes(buf: &[u8], at: usize, len: usize) -> Result<&[u8], Error> {
    check(buf, at, len)?;
    Ok(&buf[at..at + len])
}

/// Writes one byte at `at`.
#[inline]
pub fn write_u8(buf: &mut [u8], at: usize, value: u8) -> Result<(), Error> {
    check(buf, at, 1)?;
    buf[at] = value;
    Ok(())
}

/// Writes a big-endian `u16` at `at`.
#[inline]
pub fn write_u16(buf: &mut [u8], at: usize, value: u16) -> Result<(), Error> {
    check(buf, at, 2)?;
    buf[at..at + 2].copy_from_slice(&value.to_be_bytes());
    Ok(())
}

/// Writes a big-endian `u32` at `at`.
#[inline]
pub fn write_u32(buf: &mut [u8], at: usize, value: u32) -> Result<(), Error> {
    check(buf, at, 4)?;
    buf[at..at + 4].copy_from_slice(&value.to_be_bytes());
    Ok(())
}

/// Writes a big-endian `u64` at `at` as two 32-bit halves.
///
/// Bounds are validated up front for the full width, the same as every
/// other width.
#[inline]
pub fn write_u64(buf: &mut [u8], at: usize, value: u64) -> Result<(), Error> {
    check(buf, at, 8)?;
    write_u32(buf, at, (value >> 32) as u32)?;
    write_u32(buf, at + 4, (value & 0xFFFF_FFFF) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_widths() {
        let mut buf = [0u8; 16];
        write_u8(&mut buf, 0, 0xAB).unwrap();
        write_u16(&mut buf, 1, 0xBEEF).unwrap();
        write_u32(&mut buf, 3, 0xDEAD_BEEF).unwrap();
        write_u64(&mut buf, 7, 0x0123_4567_89AB_CDEF).unwrap();

        assert_eq!(read_u8(&buf, 0).unwrap(), 0xAB);
        assert_eq!(read_u16(&buf, 1).unwrap(), 0xBEEF);
        assert_eq!(read_u32(&buf, 3).unwrap(), 0xDEAD_BEEF);
        assert_eq!(read_u64(&buf, 7).unwrap(), 0x0123_4567_89AB_CDEF);
    }

    #[test]
    fn values_are_big_endian() {
        let mut buf = [0u8; 8];
        write_u16(&mut buf, 0, 0x0102).unwrap();
        write_u32(&mut buf, 2, 0x0304_0506).unwrap();
        assert_eq!(&buf[..6], &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
    }

    #[test]
    fn rejects_every_out_of_bounds_width() {
        let buf = [0u8; 8];
        // offsets right at the boundary succeed, one past fails
        assert!(read_u8(&buf, 7).is_ok());
        assert!(matches!(
            read_u8(&buf, 8),
            Err(Error::OffsetOutOfBounds { .. })
        ));
        assert!(read_u16(&buf, 6).is_ok());
        assert!(read_u16(&buf, 7).is_err());
        assert!(read_u32(&buf, 5).is_err());
        assert!(read_u64(&buf, 1).is_err());
        assert!(read_bytes(&buf, 4, 5).is_err());

        let mut buf = [0u8; 8];
        assert!(write_u16(&mut buf, 7, 0).is_err());
        assert!(write_u32(&mut buf, 5, 0).is_err());
        // the 64-bit write is bounds-checked like every other width
        assert!(matches!(
            write_u64(&mut buf, 1, 0),
            Err(Error::OffsetOutOfBounds { .. })
        ));
    }

    #[test]
    fn rejects_overflowing_offsets() {
        let buf = [0u8; 4];
        assert!(read_u32(&buf, usize::MAX).is_err());
        assert!(read_bytes(&buf, usize::MAX, 2).is_err());
    }

    #[test]
    fn u64_round_trips_through_halves() {
        let mut buf = [0u8; 8];
        write_u64(&mut buf, 0, u64::MAX).unwrap();
        assert_eq!(read_u64(&buf, 0).unwrap(), u64::MAX);
        assert_eq!(buf, [0xFF; 8]);
    }
}
