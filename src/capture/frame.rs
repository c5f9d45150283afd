//! Frame data owned by a single scan cycle

use std::time::{Duration, Instant};

/// One photo frame handed from the capture device to the pipeline.
///
/// Frames are ephemeral: each one is owned by the cycle that processes it
/// and dropped once that cycle delivers its result.
#[derive(Debug)]
pub struct CapturedFrame {
    /// Raw RGBA pixel data, row-major
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Capture time, for frame-to-result latency reporting
    pub timestamp: Instant,
}

impl CapturedFrame {
    /// Wrap a pixel buffer captured just now
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    /// Frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Length in bytes of a full RGBA buffer for these dimensions
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Time elapsed since this frame was captured
    pub fn age(&self) -> Duration {
        self.timestamp.elapsed()
    }
}
