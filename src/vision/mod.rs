//! Vision Layer
//!
//! Image-side stages of the scan pipeline: frame downscaling, the advisory
//! card-region heuristic, and the OCR seam. Rectangle detection and text
//! extraction run concurrently per cycle and are joined before any text
//! interpretation happens.

pub mod ocr;
pub mod preprocess;
pub mod rectangle;

pub use ocr::{OcrConfig, TextRecognizer};
pub use preprocess::{downscale, PreprocessConfig};
pub use rectangle::{RectangleConfig, RectangleDetector};

/// A recognized string with its per-region confidence
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    /// Recognized text content
    pub text: String,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
}

impl TextFragment {
    /// Create a fragment from a recognized string
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}
