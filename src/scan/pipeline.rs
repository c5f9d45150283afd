//! Single capture cycle
//!
//! One frame in, one scan result out: downscale, then rectangle presence and
//! text recognition concurrently, then candidate extraction and catalog
//! resolution. Rectangle presence is advisory only. It never blocks a
//! resolution reached through text, it only picks the failure category when
//! nothing resolves.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{ScanFailure, ScanResult};
use crate::analysis::{candidate_queries, resolve_candidates};
use crate::capture::CapturedFrame;
use crate::catalog::CardCatalog;
use crate::config::ScannerConfig;
use crate::vision::{downscale, RectangleDetector, TextRecognizer};

/// Run one full recognition cycle over a captured frame
pub(crate) async fn run_cycle(
    frame: CapturedFrame,
    detector: &RectangleDetector,
    recognizer: &dyn TextRecognizer,
    catalog: &dyn CardCatalog,
    config: &ScannerConfig,
) -> ScanResult {
    let frame = Arc::new(downscale(frame, config.preprocess.max_edge));

    let rect_frame = Arc::clone(&frame);
    let rect_detector = detector.clone();
    let rectangle_task = tokio::task::spawn_blocking(move || rect_detector.detect(&rect_frame));
    let fragments_task = recognizer.recognize(&frame, &config.ocr);

    let (rectangle_result, fragments_result) = tokio::join!(rectangle_task, fragments_task);

    let card_region_seen = match rectangle_result {
        Ok(seen) => seen,
        Err(e) => {
            warn!("Rectangle detection task failed: {}", e);
            false
        }
    };
    let fragments = match fragments_result {
        Ok(fragments) => fragments,
        Err(e) => {
            warn!("Text recognition failed: {}", e);
            Vec::new()
        }
    };

    debug!(
        "Cycle joined: card_region={} fragments={}",
        card_region_seen,
        fragments.len()
    );

    let queries = candidate_queries(&fragments);
    if queries.is_empty() {
        return Err(classify_failure(card_region_seen, false));
    }

    match resolve_candidates(catalog, &queries, &config.resolver).await {
        Some(card) => {
            info!(
                "Resolved '{}' ({}) {:?} after capture",
                card.name,
                card.set_name,
                frame.age()
            );
            Ok(card)
        }
        None => Err(classify_failure(card_region_seen, true)),
    }
}

/// Failure category for an unresolved cycle.
///
/// Missing card region outranks unreadable text, which outranks an
/// unmatched catalog lookup.
fn classify_failure(card_region_seen: bool, had_candidates: bool) -> ScanFailure {
    if !card_region_seen {
        ScanFailure::NoCardRegionDetected
    } else if !had_candidates {
        ScanFailure::TextUnreadable
    } else {
        ScanFailure::NoCatalogMatch
    }
}
