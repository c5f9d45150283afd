//! Scripted collaborators for session and pipeline tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::capture::{CaptureDevice, CaptureError, CapturedFrame, PermissionState};
use crate::catalog::{CardCatalog, CardVariant, CatalogCard};
use crate::vision::{OcrConfig, TextFragment, TextRecognizer};

/// Route pipeline logs to the test harness. Opt in with RUST_LOG=cardscan=debug.
pub(crate) fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Frame with a white card-shaped region that the rectangle detector accepts
pub(crate) fn card_frame() -> CapturedFrame {
    let (fw, fh) = (320u32, 240u32);
    let mut data = vec![0u8; (fw * fh * 4) as usize];
    for row in 40..200u32 {
        for col in 100..200u32 {
            let idx = ((row * fw + col) * 4) as usize;
            data[idx] = 255;
            data[idx + 1] = 255;
            data[idx + 2] = 255;
            data[idx + 3] = 255;
        }
    }
    CapturedFrame::new(data, fw, fh)
}

/// Uniform frame with no card-shaped region
pub(crate) fn blank_frame() -> CapturedFrame {
    CapturedFrame::new(vec![0u8; 320 * 240 * 4], 320, 240)
}

pub(crate) fn card(name: &str) -> CatalogCard {
    CatalogCard {
        id: String::new(),
        name: name.to_string(),
        set_name: "The First Chapter".to_string(),
        card_number: None,
        unique_id: None,
        variant: CardVariant::Normal,
    }
}

/// Capture device serving scripted failures, then frames from a source
pub(crate) struct StubDevice {
    permission: PermissionState,
    failures: Mutex<VecDeque<CaptureError>>,
    frame_source: Option<Box<dyn Fn() -> CapturedFrame + Send + Sync>>,
}

impl StubDevice {
    /// Authorized device producing a fresh frame per capture
    pub(crate) fn repeating(source: impl Fn() -> CapturedFrame + Send + Sync + 'static) -> Self {
        Self {
            permission: PermissionState::Authorized,
            failures: Mutex::new(VecDeque::new()),
            frame_source: Some(Box::new(source)),
        }
    }

    /// Device stuck in the given permission state, never capturing
    pub(crate) fn with_permission(permission: PermissionState) -> Self {
        Self {
            permission,
            failures: Mutex::new(VecDeque::new()),
            frame_source: None,
        }
    }

    /// Device failing each capture with the next scripted error
    pub(crate) fn with_failures(failures: Vec<CaptureError>) -> Self {
        Self {
            permission: PermissionState::Undetermined,
            failures: Mutex::new(failures.into()),
            frame_source: None,
        }
    }
}

#[async_trait]
impl CaptureDevice for StubDevice {
    async fn capture_photo(&self) -> Result<CapturedFrame, CaptureError> {
        if let Some(err) = self.failures.lock().pop_front() {
            return Err(err);
        }
        match &self.frame_source {
            Some(source) => Ok(source()),
            None => Err(CaptureError::CaptureFailed("no frame scripted".to_string())),
        }
    }

    fn permission_state(&self) -> PermissionState {
        self.permission
    }
}

/// Recognizer returning the same fragment list on every call
pub(crate) struct ScriptedRecognizer {
    texts: Vec<String>,
    fail: bool,
}

impl ScriptedRecognizer {
    pub(crate) fn with_texts(texts: &[&str]) -> Self {
        Self {
            texts: texts.iter().map(|t| t.to_string()).collect(),
            fail: false,
        }
    }

    pub(crate) fn empty() -> Self {
        Self::with_texts(&[])
    }

    pub(crate) fn failing() -> Self {
        Self {
            texts: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl TextRecognizer for ScriptedRecognizer {
    async fn recognize(
        &self,
        _frame: &CapturedFrame,
        _config: &OcrConfig,
    ) -> anyhow::Result<Vec<TextFragment>> {
        if self.fail {
            anyhow::bail!("ocr backend offline");
        }
        Ok(self
            .texts
            .iter()
            .map(|t| TextFragment::new(t.clone(), 0.9))
            .collect())
    }
}

/// Substring-search catalog recording every query it receives
pub(crate) struct MockCatalog {
    cards: Vec<CatalogCard>,
    loaded: AtomicBool,
    searches: Mutex<Vec<String>>,
}

impl MockCatalog {
    pub(crate) fn with_cards(cards: Vec<CatalogCard>) -> Self {
        Self {
            cards,
            loaded: AtomicBool::new(true),
            searches: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn searches(&self) -> Vec<String> {
        self.searches.lock().clone()
    }
}

#[async_trait]
impl CardCatalog for MockCatalog {
    fn is_data_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    async fn search(&self, query: &str) -> Vec<CatalogCard> {
        self.searches.lock().push(query.to_string());
        let lower = query.to_lowercase();
        self.cards
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&lower))
            .cloned()
            .collect()
    }
}
