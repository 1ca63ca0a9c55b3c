//! Bounds-checked random access over an in-memory byte buffer.

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use bytes::Bytes;

use crate::error::{IfdexError, IfdexResult};

/// Byte order for multi-byte reads.
///
/// TIFF streams declare their order in the first two header bytes: `MM`
/// ("Motorola", big-endian) or `II` ("Intel", little-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Big endian (`MM`).
    Motorola,
    /// Little endian (`II`).
    Intel,
}

/// A bounds-checked reader over an immutable byte buffer.
///
/// Every accessor validates the full requested range before touching any
/// byte, so a failed read never yields a partial result. Multi-byte reads
/// honor the current [`ByteOrder`], which the IFD walker flips once when the
/// stream's header marker is seen; apart from that flag the reader is pure
/// state over `(index, count)`.
#[derive(Debug, Clone)]
pub struct ByteReader {
    data: Bytes,
    byte_order: ByteOrder,
}

impl ByteReader {
    /// Wrap a buffer. The reader starts out big-endian (Motorola), matching
    /// the original metadata-extractor default.
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            byte_order: ByteOrder::Motorola,
        }
    }

    /// Logical length of the underlying buffer in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The byte order applied to subsequent multi-byte reads.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Switch the byte order. Affects only reads issued after the call.
    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    /// Validate that `[index, index + count)` lies inside the buffer.
    ///
    /// The bound is computed in `u64` so that a huge `count` cannot wrap on
    /// 32-bit targets before the comparison.
    fn validate(&self, index: usize, count: usize) -> IfdexResult<&[u8]> {
        match (index as u64).checked_add(count as u64) {
            Some(end) if end <= self.data.len() as u64 => Ok(&self.data[index..index + count]),
            _ => Err(IfdexError::OutOfRange {
                index: index as u64,
                count: count as u64,
                length: self.data.len() as u64,
            }),
        }
    }

    /// Read one unsigned byte.
    pub fn get_u8(&self, index: usize) -> IfdexResult<u8> {
        Ok(self.validate(index, 1)?[0])
    }

    /// Read one signed byte.
    pub fn get_i8(&self, index: usize) -> IfdexResult<i8> {
        Ok(self.get_u8(index)? as i8)
    }

    /// Read a 16-bit unsigned integer.
    pub fn get_u16(&self, index: usize) -> IfdexResult<u16> {
        let buf = self.validate(index, 2)?;
        Ok(match self.byte_order {
            ByteOrder::Motorola => BigEndian::read_u16(buf),
            ByteOrder::Intel => LittleEndian::read_u16(buf),
        })
    }

    /// Read a 16-bit signed integer.
    pub fn get_i16(&self, index: usize) -> IfdexResult<i16> {
        Ok(self.get_u16(index)? as i16)
    }

    /// Read a 32-bit unsigned integer.
    pub fn get_u32(&self, index: usize) -> IfdexResult<u32> {
        let buf = self.validate(index, 4)?;
        Ok(match self.byte_order {
            ByteOrder::Motorola => BigEndian::read_u32(buf),
            ByteOrder::Intel => LittleEndian::read_u32(buf),
        })
    }

    /// Read a 32-bit signed integer.
    pub fn get_i32(&self, index: usize) -> IfdexResult<i32> {
        Ok(self.get_u32(index)? as i32)
    }

    /// Read a 64-bit unsigned integer.
    pub fn get_u64(&self, index: usize) -> IfdexResult<u64> {
        let buf = self.validate(index, 8)?;
        Ok(match self.byte_order {
            ByteOrder::Motorola => BigEndian::read_u64(buf),
            ByteOrder::Intel => LittleEndian::read_u64(buf),
        })
    }

    /// Read a 64-bit signed integer.
    pub fn get_i64(&self, index: usize) -> IfdexResult<i64> {
        Ok(self.get_u64(index)? as i64)
    }

    /// Read a 32-bit IEEE 754 float.
    pub fn get_f32(&self, index: usize) -> IfdexResult<f32> {
        Ok(f32::from_bits(self.get_u32(index)?))
    }

    /// Read a 64-bit IEEE 754 float.
    pub fn get_f64(&self, index: usize) -> IfdexResult<f64> {
        Ok(f64::from_bits(self.get_u64(index)?))
    }

    /// Copy `count` bytes starting at `index`.
    ///
    /// The whole range is validated up front; this never returns a partially
    /// copied buffer.
    pub fn get_bytes(&self, index: usize, count: usize) -> IfdexResult<Bytes> {
        self.validate(index, count)?;
        Ok(self.data.slice(index..index + count))
    }

    /// Read `count` bytes as a UTF-8 string.
    ///
    /// Bounds failures are `OutOfRange`; invalid UTF-8 is a `Decode` error
    /// rather than a crash or a lossy substitution.
    pub fn get_string(&self, index: usize, count: usize) -> IfdexResult<String> {
        let buf = self.validate(index, count)?;
        std::str::from_utf8(buf)
            .map(str::to_owned)
            .map_err(|e| IfdexError::Decode(format!("invalid string data: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(data: &'static [u8]) -> ByteReader {
        ByteReader::new(Bytes::from_static(data))
    }

    #[test]
    fn in_bounds_reads() {
        let r = reader(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(r.get_u8(0).unwrap(), 0x01);
        assert_eq!(r.get_u8(7).unwrap(), 0x08);
        assert_eq!(r.get_u16(0).unwrap(), 0x0102);
        assert_eq!(r.get_u32(2).unwrap(), 0x0304_0506);
        assert_eq!(r.get_u64(0).unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(r.get_bytes(2, 3).unwrap().as_ref(), &[0x03, 0x04, 0x05]);
    }

    #[test]
    fn out_of_range_is_rejected_before_any_read() {
        let r = reader(&[0x01, 0x02, 0x03]);
        assert!(matches!(r.get_u8(3), Err(IfdexError::OutOfRange { .. })));
        // A multi-byte read near the end fails over the full width.
        assert!(matches!(r.get_u16(2), Err(IfdexError::OutOfRange { .. })));
        assert!(matches!(r.get_u32(0), Err(IfdexError::OutOfRange { .. })));
        assert!(matches!(
            r.get_bytes(1, 3),
            Err(IfdexError::OutOfRange { .. })
        ));
        assert!(matches!(
            r.get_bytes(usize::MAX, 2),
            Err(IfdexError::OutOfRange { .. })
        ));
    }

    #[test]
    fn byte_order_toggle_affects_subsequent_reads_only() {
        let mut r = reader(&[0x12, 0x34]);
        assert_eq!(r.get_u16(0).unwrap(), 0x1234);
        r.set_byte_order(ByteOrder::Intel);
        assert_eq!(r.get_u16(0).unwrap(), 0x3412);
        r.set_byte_order(ByteOrder::Motorola);
        assert_eq!(r.get_u16(0).unwrap(), 0x1234);
    }

    #[test]
    fn signed_and_float_views() {
        let r = reader(&[0xff, 0xfe, 0x40, 0x49, 0x0f, 0xdb]);
        assert_eq!(r.get_i8(0).unwrap(), -1);
        assert_eq!(r.get_i16(0).unwrap(), -2);
        let pi = r.get_f32(2).unwrap();
        assert!((pi - std::f32::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn string_decoding() {
        let r = reader(b"Nikon\xff");
        assert_eq!(r.get_string(0, 5).unwrap(), "Nikon");
        assert!(matches!(r.get_string(0, 6), Err(IfdexError::Decode(_))));
        assert!(matches!(
            r.get_string(4, 40),
            Err(IfdexError::OutOfRange { .. })
        ));
    }

    #[test]
    fn empty_count_is_valid() {
        let r = reader(&[0x01]);
        assert_eq!(r.get_bytes(1, 0).unwrap().len(), 0);
        assert_eq!(r.get_string(0, 0).unwrap(), "");
    }
}
