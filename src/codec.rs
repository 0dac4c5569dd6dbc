// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Bounds-checked readers for the job store's binary formats.
//!
//! All multi-byte integers are little-endian. Every read is checked against
//! the remaining buffer length and fails with a truncated-buffer error
//! instead of reading out of range.

use crate::error::{OverlayError, Result};

/// Cursor over a raw byte buffer with bounds-checked primitive reads.
pub struct RecordReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    /// Create a reader over `buf`, positioned at the start.
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of unread bytes.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Check whether the whole buffer has been consumed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(OverlayError::DecodeError(format!(
                "truncated buffer: need {n} bytes at offset {}, {} remaining",
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read `n` raw bytes.
    ///
    /// # Errors
    ///
    /// Returns a `DecodeError` if fewer than `n` bytes remain.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    /// Read a little-endian u64.
    ///
    /// # Errors
    ///
    /// Returns a `DecodeError` if the buffer is exhausted.
    pub fn read_u64_le(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        Ok(u64::from_le_bytes(bytes.try_into().unwrap()))
    }

    /// Read a little-endian u32.
    ///
    /// # Errors
    ///
    /// Returns a `DecodeError` if the buffer is exhausted.
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }

    /// Read a little-endian i32.
    ///
    /// # Errors
    ///
    /// Returns a `DecodeError` if the buffer is exhausted.
    pub fn read_i32_le(&mut self) -> Result<i32> {
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes(bytes.try_into().unwrap()))
    }

    /// Read a little-endian f32.
    ///
    /// # Errors
    ///
    /// Returns a `DecodeError` if the buffer is exhausted.
    pub fn read_f32_le(&mut self) -> Result<f32> {
        let bytes = self.take(4)?;
        Ok(f32::from_le_bytes(bytes.try_into().unwrap()))
    }

    /// Read a base-128 varint (at most 10 bytes).
    ///
    /// # Errors
    ///
    /// Returns a `DecodeError` if the buffer is exhausted or the varint is
    /// longer than 10 bytes.
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut value: u64 = 0;
        for shift in (0..64).step_by(7) {
            let byte = self.take(1)?[0];
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(OverlayError::DecodeError(
            "varint longer than 10 bytes".to_string(),
        ))
    }
}

/// Decode the "points" sub-format: a u64 count followed by that many
/// length-prefixed serialized point records. Returns (row, col) pairs.
///
/// # Errors
///
/// Returns a `DecodeError` on a truncated buffer, a negative record length,
/// or a malformed point payload.
pub fn decode_points(buf: &[u8]) -> Result<Vec<(f32, f32)>> {
    let mut reader = RecordReader::new(buf);
    let count = reader.read_u64_le()?;
    let mut points = Vec::new();
    for _ in 0..count {
        let len = reader.read_i32_le()?;
        let len = usize::try_from(len).map_err(|_| {
            OverlayError::DecodeError(format!("negative point record length {len}"))
        })?;
        let payload = reader.read_bytes(len)?;
        points.push(decode_point(payload)?);
    }
    Ok(points)
}

/// Decode one serialized point record into (y, x).
///
/// The payload is a protobuf-style message: field 1 = y, field 2 = x, both
/// fixed32 floats. Unknown fields are skipped by wire type.
fn decode_point(payload: &[u8]) -> Result<(f32, f32)> {
    let mut reader = RecordReader::new(payload);
    let mut y = 0.0;
    let mut x = 0.0;
    while !reader.is_empty() {
        let key = reader.read_varint()?;
        let field = key >> 3;
        let wire = key & 0x7;
        match (field, wire) {
            (1, 5) => y = reader.read_f32_le()?,
            (2, 5) => x = reader.read_f32_le()?,
            (_, 0) => {
                reader.read_varint()?;
            }
            (_, 1) => {
                reader.read_bytes(8)?;
            }
            (_, 2) => {
                let n = reader.read_varint()?;
                reader.read_bytes(n as usize)?;
            }
            (_, 5) => {
                reader.read_bytes(4)?;
            }
            _ => {
                return Err(OverlayError::DecodeError(format!(
                    "unsupported wire type {wire} in point record"
                )));
            }
        }
    }
    Ok((y, x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OverlayError;

    fn encode_point(y: f32, x: f32) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.push((1 << 3) | 5);
        payload.extend_from_slice(&y.to_le_bytes());
        payload.push((2 << 3) | 5);
        payload.extend_from_slice(&x.to_le_bytes());
        payload
    }

    fn encode_points(points: &[(f32, f32)]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(points.len() as u64).to_le_bytes());
        for &(y, x) in points {
            let payload = encode_point(y, x);
            buf.extend_from_slice(&(payload.len() as i32).to_le_bytes());
            buf.extend_from_slice(&payload);
        }
        buf
    }

    #[test]
    fn test_reader_primitives() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&7u64.to_le_bytes());
        buf.extend_from_slice(&(-3i32).to_le_bytes());
        buf.extend_from_slice(&1.5f32.to_le_bytes());
        let mut reader = RecordReader::new(&buf);
        assert_eq!(reader.read_u64_le().unwrap(), 7);
        assert_eq!(reader.read_i32_le().unwrap(), -3);
        assert!((reader.read_f32_le().unwrap() - 1.5).abs() < f32::EPSILON);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_truncated_read_fails() {
        let mut reader = RecordReader::new(&[1, 2, 3]);
        let err = reader.read_u64_le().unwrap_err();
        assert!(matches!(err, OverlayError::DecodeError(_)));
        assert!(err.to_string().contains("truncated buffer"));
    }

    #[test]
    fn test_decode_points_roundtrip() {
        let buf = encode_points(&[(10.0, 20.0), (184.0, 92.5)]);
        let points = decode_points(&buf).unwrap();
        assert_eq!(points, vec![(10.0, 20.0), (184.0, 92.5)]);
    }

    #[test]
    fn test_decode_points_empty() {
        let buf = encode_points(&[]);
        assert!(decode_points(&buf).unwrap().is_empty());
    }

    #[test]
    fn test_decode_points_truncated_record() {
        let mut buf = encode_points(&[(1.0, 2.0)]);
        buf.truncate(buf.len() - 2);
        assert!(decode_points(&buf).is_err());
    }

    #[test]
    fn test_decode_point_skips_unknown_fields() {
        let mut payload = Vec::new();
        // Unknown varint field 7.
        payload.push((7 << 3) | 0);
        payload.push(42);
        payload.extend_from_slice(&encode_point(3.0, 4.0));
        let mut buf = Vec::new();
        buf.extend_from_slice(&1u64.to_le_bytes());
        buf.extend_from_slice(&(payload.len() as i32).to_le_bytes());
        buf.extend_from_slice(&payload);
        assert_eq!(decode_points(&buf).unwrap(), vec![(3.0, 4.0)]);
    }

    #[test]
    fn test_negative_record_length_fails() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1u64.to_le_bytes());
        buf.extend_from_slice(&(-1i32).to_le_bytes());
        let err = decode_points(&buf).unwrap_err();
        assert!(err.to_string().contains("negative point record length"));
    }
}
