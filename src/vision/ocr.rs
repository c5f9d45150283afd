//! Text extraction seam
//!
//! Wraps whatever OCR backend the platform provides behind a small async
//! trait. The scanner asks for one ranked fragment per detected text region
//! and tunes the backend toward accuracy over speed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::capture::frame::CapturedFrame;
use crate::vision::TextFragment;

/// Recognition settings a backend is expected to honor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Favor accuracy over latency
    pub accurate: bool,
    /// Apply language-model correction to recognized strings
    pub language_correction: bool,
    /// Minimum text height as a fraction of frame height; kept low to catch
    /// small subtitle print
    pub min_text_height: f32,
    /// Single recognition language (e.g. "en-US")
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            accurate: true,
            language_correction: true,
            min_text_height: 0.01,
            language: "en-US".to_string(),
        }
    }
}

/// An OCR backend producing one ranked text fragment per detected region
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognize text in the frame, returning the top candidate string for
    /// each detected region
    async fn recognize(
        &self,
        frame: &CapturedFrame,
        config: &OcrConfig,
    ) -> anyhow::Result<Vec<TextFragment>>;
}
