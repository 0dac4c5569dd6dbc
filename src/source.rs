// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Sequential frame sources.
//!
//! Video sources support only forward sequential reads: reaching a given
//! frame index means reading and discarding everything before it. The
//! `video-rs` decoder backs [`VideoSource`] behind the `video` feature.

use std::path::Path;

use image::RgbImage;

use crate::error::Result;
#[cfg(not(feature = "video"))]
use crate::error::OverlayError;

/// A forward-only frame stream.
pub trait FrameSource {
    /// Decode the next frame. `None` ends the stream; a decoder failure
    /// mid-read also ends it (the caller abandons the rest of the video).
    fn next_frame(&mut self) -> Option<Result<RgbImage>>;
}

#[cfg(feature = "video")]
mod video {
    use std::path::Path;
    use std::sync::Once;

    use image::RgbImage;

    use super::FrameSource;
    use crate::error::{OverlayError, Result};

    static INIT: Once = Once::new();

    fn init_video() {
        INIT.call_once(|| {
            if let Err(e) = video_rs::init() {
                eprintln!("Failed to initialize video-rs: {e}");
            }
        });
    }

    /// `video-rs` backed frame source. Holds the decoder for the duration
    /// of one video's frame loop; dropping it releases the stream.
    pub struct VideoSource {
        decoder: video_rs::decode::Decoder,
    }

    impl VideoSource {
        /// Open a video file for sequential decoding.
        ///
        /// # Errors
        ///
        /// Returns a `VideoError` if the file cannot be opened.
        pub fn open(path: &Path) -> Result<Self> {
            init_video();
            let decoder = video_rs::decode::Decoder::new(path).map_err(|e| {
                OverlayError::VideoError(format!("failed to open {}: {e}", path.display()))
            })?;
            Ok(Self { decoder })
        }
    }

    impl FrameSource for VideoSource {
        fn next_frame(&mut self) -> Option<Result<RgbImage>> {
            match self.decoder.decode() {
                Ok((_ts, frame)) => Some(frame_to_image(&frame)),
                // EOF and decoder failures are indistinguishable here;
                // either way the stream is over.
                Err(_) => None,
            }
        }
    }

    /// Convert a decoded `video_rs` frame (HWC ndarray) to an `RgbImage`.
    fn frame_to_image(frame: &video_rs::Frame) -> Result<RgbImage> {
        let shape = frame.shape();
        let height = u32::try_from(shape[0])
            .map_err(|_| OverlayError::ImageError("frame height exceeds u32::MAX".to_string()))?;
        let width = u32::try_from(shape[1])
            .map_err(|_| OverlayError::ImageError("frame width exceeds u32::MAX".to_string()))?;

        let mut rgb_data = Vec::with_capacity((height * width * 3) as usize);
        for y in 0..height as usize {
            for x in 0..width as usize {
                rgb_data.push(frame[[y, x, 0]]);
                rgb_data.push(frame[[y, x, 1]]);
                rgb_data.push(frame[[y, x, 2]]);
            }
        }

        RgbImage::from_raw(width, height, rgb_data).ok_or_else(|| {
            OverlayError::ImageError("failed to build image from video frame".to_string())
        })
    }
}

#[cfg(feature = "video")]
pub use video::VideoSource;

/// Open the frame source for a video file.
///
/// # Errors
///
/// Returns a `VideoError` if the file cannot be opened, or
/// `FeatureNotEnabled` when built without the `video` feature.
#[cfg(feature = "video")]
pub fn open_video(path: &Path) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(VideoSource::open(path)?))
}

/// Open the frame source for a video file.
///
/// # Errors
///
/// Always returns `FeatureNotEnabled` when built without the `video`
/// feature.
#[cfg(not(feature = "video"))]
pub fn open_video(_path: &Path) -> Result<Box<dyn FrameSource>> {
    Err(OverlayError::FeatureNotEnabled(
        "video decoding requires the 'video' feature".to_string(),
    ))
}
