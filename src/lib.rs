//! cardscan - Collectible card recognition pipeline
//!
//! Resolves a physical card seen by a camera to an entry in a known card
//! catalog. A captured frame is downscaled, scanned concurrently for a
//! card-shaped region and for text, and the recognized fragments are matched
//! against the catalog with tiered fuzzy resolution. A capture session
//! drives the flow with single-flight captures and an optional auto-scan
//! timer with cooldown.

pub mod analysis;
pub mod capture;
pub mod catalog;
pub mod config;
pub mod scan;
pub mod vision;

pub use capture::{CaptureDevice, CaptureError, CapturedFrame, PermissionState};
pub use catalog::{CardCatalog, CardIndex, CardVariant, CatalogCard};
pub use config::ScannerConfig;
pub use scan::{
    AutoScanConfig, AutoScanState, FailureHint, ScanFailure, ScanMode, ScanResult, ScanSession,
};
pub use vision::{TextFragment, TextRecognizer};
