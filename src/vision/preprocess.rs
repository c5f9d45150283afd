//! Frame downscaling ahead of OCR
//!
//! Large camera frames dominate recognition latency, so the pipeline caps the
//! longest edge before handing a frame to the vision stages.

use image::imageops::FilterType;
use image::{ImageBuffer, Rgba};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::capture::frame::CapturedFrame;

/// Preprocessing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Maximum length of the longest frame edge in pixels; larger frames are
    /// scaled down uniformly before further processing
    pub max_edge: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self { max_edge: 1200 }
    }
}

/// Downscale a frame so its longest edge is at most `max_edge` pixels.
///
/// Frames already within the cap are returned unchanged, buffer and all.
/// Aspect ratio is preserved; the short edge is rounded and never drops
/// below one pixel.
pub fn downscale(frame: CapturedFrame, max_edge: u32) -> CapturedFrame {
    let longest = frame.width.max(frame.height);
    if max_edge == 0 || longest <= max_edge {
        return frame;
    }

    let scale = max_edge as f32 / longest as f32;
    let new_width = ((frame.width as f32 * scale).round() as u32).max(1);
    let new_height = ((frame.height as f32 * scale).round() as u32).max(1);

    let view: Option<ImageBuffer<Rgba<u8>, &[u8]>> =
        ImageBuffer::from_raw(frame.width, frame.height, frame.data.as_slice());
    let Some(view) = view else {
        warn!(
            "frame buffer does not hold {}x{} RGBA pixels, skipping downscale",
            frame.width, frame.height
        );
        return frame;
    };

    let resized = image::imageops::resize(&view, new_width, new_height, FilterType::Triangle);
    debug!(
        "downscaled frame {}x{} -> {}x{}",
        frame.width, frame.height, new_width, new_height
    );

    CapturedFrame {
        data: resized.into_raw(),
        width: new_width,
        height: new_height,
        timestamp: frame.timestamp,
    }
}
