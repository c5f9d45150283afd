//! Scan orchestration
//!
//! The capture session owns the device lifecycle and runs one recognition
//! cycle at a time; the auto-scan scheduler drives repeated captures with a
//! post-success cooldown. Results are delivered over a channel as either a
//! resolved catalog card or a typed failure.

use std::time::Duration;

use thiserror::Error;

use crate::capture::CaptureError;
use crate::catalog::CatalogCard;

pub mod pipeline;
pub mod scheduler;
pub mod session;
#[cfg(test)]
pub(crate) mod testutil;

pub use scheduler::{AutoScanConfig, AutoScanState};
pub use session::ScanSession;

/// Hint display window for self-clearing auto-scan failures
pub const AUTO_HINT_MS: u64 = 1500;
/// Hint display window for dismissable manual-scan failures
pub const MANUAL_HINT_MS: u64 = 2000;

/// What triggered a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Scheduler tick
    Auto,
    /// Explicit user request
    Manual,
}

/// Why a scan cycle produced no card
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanFailure {
    #[error("camera access denied")]
    PermissionDenied,
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("capture failed: {0}")]
    CaptureFailed(String),
    #[error("no card detected in frame")]
    NoCardRegionDetected,
    #[error("card text could not be read")]
    TextUnreadable,
    #[error("no catalog match for scanned text")]
    NoCatalogMatch,
}

/// Outcome of one capture cycle
pub type ScanResult = Result<CatalogCard, ScanFailure>;

/// How the caller should surface a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureHint {
    pub message: String,
    pub display: Duration,
    /// Dismissable hints stay until acknowledged, others clear on their own
    pub dismissable: bool,
}

impl ScanFailure {
    /// Terminal failures end the session and need external remediation
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::DeviceUnavailable(_))
    }

    /// Soft failures clear with the next frame and never stop the session
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::NoCardRegionDetected | Self::TextUnreadable | Self::NoCatalogMatch
        )
    }

    /// Presentation of this failure in the given mode.
    ///
    /// Soft failures during auto-scan self-clear after a short window so the
    /// running loop is not interrupted; everything else must be dismissed.
    pub fn hint(&self, mode: ScanMode) -> FailureHint {
        let display_ms = match mode {
            ScanMode::Auto => AUTO_HINT_MS,
            ScanMode::Manual => MANUAL_HINT_MS,
        };

        FailureHint {
            message: self.to_string(),
            display: Duration::from_millis(display_ms),
            dismissable: !(self.is_soft() && mode == ScanMode::Auto),
        }
    }
}

impl From<CaptureError> for ScanFailure {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::PermissionDenied => Self::PermissionDenied,
            CaptureError::DeviceUnavailable(msg) => Self::DeviceUnavailable(msg),
            CaptureError::CaptureFailed(msg) => Self::CaptureFailed(msg),
        }
    }
}
