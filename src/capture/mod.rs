//! Camera Capture Layer
//!
//! Defines the seam to the platform capture device. The scanner only needs two
//! primitives from a camera: take a single photo and report its authorization
//! state. Platform backends implement [`CaptureDevice`]; the rest of the
//! pipeline never talks to camera APIs directly.

pub mod frame;

use async_trait::async_trait;
use thiserror::Error;

pub use frame::CapturedFrame;

/// Authorization state of the capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    /// The user has not been asked yet
    Undetermined,
    /// Access granted
    Authorized,
    /// Access explicitly refused by the user
    Denied,
    /// Access blocked by system policy (parental controls etc.)
    Restricted,
}

/// Errors raised by a capture device
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// Camera access is not authorized
    #[error("camera access denied")]
    PermissionDenied,
    /// No usable capture device exists or it is held by another process
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),
    /// The device exists but this capture attempt failed
    #[error("capture failed: {0}")]
    CaptureFailed(String),
}

/// A camera-like source of single photo frames
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Capture one photo frame
    async fn capture_photo(&self) -> Result<CapturedFrame, CaptureError>;

    /// Current authorization state for the device
    fn permission_state(&self) -> PermissionState;
}
