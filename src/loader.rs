// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Stream loaders for raw job-output buffers.
//!
//! The external framework stores each output stream as opaque byte buffers.
//! A [`LoaderRegistry`] maps stream names to decode functions; it is built
//! explicitly at startup and passed by reference, so there is no global
//! registration side effect.

use std::collections::HashMap;

use ndarray::Array3;

use crate::codec;
use crate::error::{OverlayError, Result};
use crate::heatmap::HEAT_MAP_SIZE;

/// Heat-map channels per joint-map buffer: 14 body parts plus background.
pub const JOINT_MAP_CHANNELS: usize = 15;

/// Side length of the network input frame.
pub const NET_INPUT_SIZE: usize = 368;

/// Raw frame dimensions of the "frame" stream (height, width).
pub const RAW_FRAME_SHAPE: (usize, usize) = (480, 640);

/// A decoded job-output buffer.
#[derive(Debug, Clone)]
pub enum Decoded {
    /// Person-center points, (row, col).
    Points(Vec<(f32, f32)>),
    /// Per-joint heat-map stack, shape (15, 46, 46).
    JointMaps(Array3<f32>),
    /// Raw RGB frame, shape (480, 640, 3).
    Frame(Array3<u8>),
    /// Float input planes, shape (channels, 368, width).
    Planes(Array3<f32>),
}

/// Decode function for one stream's buffers.
pub type LoaderFn = fn(&[u8]) -> Result<Decoded>;

/// Explicit mapping from stream name to decode function.
pub struct LoaderRegistry {
    loaders: HashMap<&'static str, LoaderFn>,
}

impl LoaderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            loaders: HashMap::new(),
        }
    }

    /// Registry with the loaders for every known stream.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("centers", load_centers);
        registry.register("joint_maps", load_joint_maps);
        registry.register("frame", load_frame);
        registry.register("net_input", load_net_input);
        registry.register("cpm_input", load_cpm_input);
        registry
    }

    /// Register (or replace) the loader for `stream`.
    pub fn register(&mut self, stream: &'static str, loader: LoaderFn) {
        self.loaders.insert(stream, loader);
    }

    /// Look up the loader for `stream`.
    #[must_use]
    pub fn get(&self, stream: &str) -> Option<LoaderFn> {
        self.loaders.get(stream).copied()
    }

    /// Decode one raw buffer of `stream`.
    ///
    /// # Errors
    ///
    /// Returns a `JobError` for an unregistered stream, or the loader's
    /// `DecodeError` for a malformed buffer.
    pub fn decode(&self, stream: &str, buf: &[u8]) -> Result<Decoded> {
        let loader = self
            .get(stream)
            .ok_or_else(|| OverlayError::JobError(format!("no loader registered for stream '{stream}'")))?;
        loader(buf)
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn read_f32_buffer(buf: &[u8]) -> Result<Vec<f32>> {
    if buf.len() % 4 != 0 {
        return Err(OverlayError::DecodeError(format!(
            "float buffer length {} is not a multiple of 4",
            buf.len()
        )));
    }
    Ok(buf
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
        .collect())
}

/// Decode a "centers" buffer: the length-prefixed points sub-format.
pub fn load_centers(buf: &[u8]) -> Result<Decoded> {
    Ok(Decoded::Points(codec::decode_points(buf)?))
}

/// Decode a "joint_maps" buffer: 15 x 46 x 46 little-endian f32.
pub fn load_joint_maps(buf: &[u8]) -> Result<Decoded> {
    let values = read_f32_buffer(buf)?;
    let expected = JOINT_MAP_CHANNELS * HEAT_MAP_SIZE * HEAT_MAP_SIZE;
    if values.len() != expected {
        return Err(OverlayError::DecodeError(format!(
            "joint_maps buffer holds {} floats, expected {expected}",
            values.len()
        )));
    }
    let maps = Array3::from_shape_vec((JOINT_MAP_CHANNELS, HEAT_MAP_SIZE, HEAT_MAP_SIZE), values)
        .map_err(|e| OverlayError::DecodeError(e.to_string()))?;
    Ok(Decoded::JointMaps(maps))
}

/// Decode a "frame" buffer: 480 x 640 x 3 u8.
pub fn load_frame(buf: &[u8]) -> Result<Decoded> {
    let (height, width) = RAW_FRAME_SHAPE;
    let expected = height * width * 3;
    if buf.len() != expected {
        return Err(OverlayError::DecodeError(format!(
            "frame buffer holds {} bytes, expected {expected}",
            buf.len()
        )));
    }
    let frame = Array3::from_shape_vec((height, width, 3), buf.to_vec())
        .map_err(|e| OverlayError::DecodeError(e.to_string()))?;
    Ok(Decoded::Frame(frame))
}

/// Decode a "net_input" buffer: 3 x 368 x W little-endian f32, width
/// inferred from the buffer length.
pub fn load_net_input(buf: &[u8]) -> Result<Decoded> {
    let values = read_f32_buffer(buf)?;
    let plane = 3 * NET_INPUT_SIZE;
    if values.is_empty() || values.len() % plane != 0 {
        return Err(OverlayError::DecodeError(format!(
            "net_input buffer holds {} floats, expected a multiple of {plane}",
            values.len()
        )));
    }
    let width = values.len() / plane;
    let planes = Array3::from_shape_vec((3, NET_INPUT_SIZE, width), values)
        .map_err(|e| OverlayError::DecodeError(e.to_string()))?;
    Ok(Decoded::Planes(planes))
}

/// Decode a "cpm_input" buffer: 4 x 368 x 368 little-endian f32.
pub fn load_cpm_input(buf: &[u8]) -> Result<Decoded> {
    let values = read_f32_buffer(buf)?;
    let expected = 4 * NET_INPUT_SIZE * NET_INPUT_SIZE;
    if values.len() != expected {
        return Err(OverlayError::DecodeError(format!(
            "cpm_input buffer holds {} floats, expected {expected}",
            values.len()
        )));
    }
    let planes = Array3::from_shape_vec((4, NET_INPUT_SIZE, NET_INPUT_SIZE), values)
        .map_err(|e| OverlayError::DecodeError(e.to_string()))?;
    Ok(Decoded::Planes(planes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f32_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_default_registry_knows_all_streams() {
        let registry = LoaderRegistry::with_defaults();
        for stream in ["centers", "joint_maps", "frame", "net_input", "cpm_input"] {
            assert!(registry.get(stream).is_some(), "missing loader for {stream}");
        }
    }

    #[test]
    fn test_unknown_stream_is_a_job_error() {
        let registry = LoaderRegistry::with_defaults();
        let err = registry.decode("nope", &[]).unwrap_err();
        assert!(err.to_string().contains("no loader registered"));
    }

    #[test]
    fn test_load_joint_maps_shape() {
        let expected = JOINT_MAP_CHANNELS * HEAT_MAP_SIZE * HEAT_MAP_SIZE;
        let buf = f32_bytes(&vec![0.5; expected]);
        match load_joint_maps(&buf).unwrap() {
            Decoded::JointMaps(maps) => {
                assert_eq!(maps.dim(), (15, 46, 46));
                assert!((maps[[7, 10, 10]] - 0.5).abs() < f32::EPSILON);
            }
            other => panic!("unexpected decode: {other:?}"),
        }
    }

    #[test]
    fn test_load_joint_maps_rejects_short_buffer() {
        let buf = f32_bytes(&[0.0; 16]);
        assert!(load_joint_maps(&buf).is_err());
    }

    #[test]
    fn test_load_frame_rejects_wrong_size() {
        assert!(load_frame(&[0u8; 100]).is_err());
    }

    #[test]
    fn test_load_net_input_infers_width() {
        let buf = f32_bytes(&vec![0.0; 3 * NET_INPUT_SIZE * 5]);
        match load_net_input(&buf).unwrap() {
            Decoded::Planes(planes) => assert_eq!(planes.dim(), (3, 368, 5)),
            other => panic!("unexpected decode: {other:?}"),
        }
    }

    #[test]
    fn test_misaligned_float_buffer_fails() {
        assert!(load_joint_maps(&[0u8; 7]).is_err());
    }
}
