//! Card-shaped region detection
//!
//! Advisory heuristic that reports whether a frame contains a quadrilateral
//! plausibly shaped like a card. The answer selects a failure category when
//! resolution fails; it never gates a resolution reached through text.

use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::otsu_level;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capture::frame::CapturedFrame;

/// Polygon approximation tolerance as a fraction of contour arc length
const APPROX_EPSILON_FRACTION: f64 = 0.02;

/// Configuration for card-region detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectangleConfig {
    /// Minimum width/height ratio for a candidate region
    pub min_aspect: f32,
    /// Maximum width/height ratio for a candidate region
    pub max_aspect: f32,
    /// Minimum candidate bounding area as a fraction of frame area
    pub min_area_fraction: f32,
    /// Minimum detection confidence (0.0 - 1.0)
    pub min_confidence: f32,
}

impl Default for RectangleConfig {
    fn default() -> Self {
        Self {
            min_aspect: 0.4,
            max_aspect: 1.0,
            min_area_fraction: 0.05,
            min_confidence: 0.5,
        }
    }
}

/// Detects whether a frame contains a card-shaped quadrilateral
#[derive(Debug, Clone)]
pub struct RectangleDetector {
    config: RectangleConfig,
}

impl RectangleDetector {
    /// Create a detector with default thresholds
    pub fn new() -> Self {
        Self::with_config(RectangleConfig::default())
    }

    /// Create a detector with custom thresholds
    pub fn with_config(config: RectangleConfig) -> Self {
        Self { config }
    }

    /// Check for a card-shaped region in the frame
    pub fn detect(&self, frame: &CapturedFrame) -> bool {
        if frame.width < 4 || frame.height < 4 {
            return false;
        }

        let gray = rgba_to_grayscale(&frame.data, frame.width, frame.height);
        let binary = binarize(&gray);
        let frame_area = (frame.width * frame.height) as f32;

        for contour in find_contours::<i32>(&binary) {
            if contour.border_type != BorderType::Outer || contour.points.len() < 4 {
                continue;
            }

            let perimeter = arc_length(&contour.points, true);
            if perimeter < 16.0 {
                continue;
            }

            let polygon =
                approximate_polygon_dp(&contour.points, perimeter * APPROX_EPSILON_FRACTION, true);
            if polygon.len() != 4 {
                continue;
            }

            let (bb_width, bb_height) = bounding_size(&polygon);
            if bb_width <= 0.0 || bb_height <= 0.0 {
                continue;
            }

            let aspect = bb_width / bb_height;
            let area_fraction = (bb_width * bb_height) / frame_area;
            // fill ratio of the quad inside its bounding box stands in for a
            // detector confidence score
            let confidence = polygon_area(&polygon) as f32 / (bb_width * bb_height);

            if aspect >= self.config.min_aspect
                && aspect <= self.config.max_aspect
                && area_fraction >= self.config.min_area_fraction
                && confidence >= self.config.min_confidence
            {
                debug!(
                    "card-shaped region found: aspect {:.2}, area {:.1}%, confidence {:.2}",
                    aspect,
                    area_fraction * 100.0,
                    confidence
                );
                return true;
            }
        }

        false
    }
}

impl Default for RectangleDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert RGBA image data to grayscale
fn rgba_to_grayscale(data: &[u8], width: u32, height: u32) -> GrayImage {
    let mut gray = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let idx = ((y * width + x) * 4) as usize;
            if idx + 2 < data.len() {
                let r = data[idx] as f32;
                let g = data[idx + 1] as f32;
                let b = data[idx + 2] as f32;
                // Standard grayscale conversion
                let gray_val = (0.299 * r + 0.587 * g + 0.114 * b) as u8;
                gray.put_pixel(x, y, Luma([gray_val]));
            }
        }
    }

    gray
}

/// Binarize with an Otsu threshold, keeping the smaller pixel population as
/// foreground so the card traces as a contour on either backdrop polarity
fn binarize(gray: &GrayImage) -> GrayImage {
    let threshold = otsu_level(gray);
    let total = (gray.width() * gray.height()) as usize;

    let mut binary = GrayImage::new(gray.width(), gray.height());
    let mut foreground = 0usize;
    for (x, y, pixel) in gray.enumerate_pixels() {
        if pixel.0[0] > threshold {
            binary.put_pixel(x, y, Luma([255]));
            foreground += 1;
        }
    }

    if foreground * 2 > total {
        for pixel in binary.pixels_mut() {
            pixel.0[0] = 255 - pixel.0[0];
        }
    }

    binary
}

/// Bounding box size of a polygon as (width, height)
fn bounding_size(polygon: &[Point<i32>]) -> (f32, f32) {
    let min_x = polygon.iter().map(|p| p.x).min().unwrap_or(0);
    let max_x = polygon.iter().map(|p| p.x).max().unwrap_or(0);
    let min_y = polygon.iter().map(|p| p.y).min().unwrap_or(0);
    let max_y = polygon.iter().map(|p| p.y).max().unwrap_or(0);

    ((max_x - min_x + 1) as f32, (max_y - min_y + 1) as f32)
}

/// Shoelace area of a closed polygon
fn polygon_area(polygon: &[Point<i32>]) -> f64 {
    let mut sum = 0i64;
    for i in 0..polygon.len() {
        let p = polygon[i];
        let q = polygon[(i + 1) % polygon.len()];
        sum += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    sum.abs() as f64 / 2.0
}
