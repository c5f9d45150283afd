//! Capture session controller
//!
//! Owns the capture device lifecycle, enforces single-flight on the
//! recognition pipeline and delivers results over an unbounded channel.
//! Collaborators are injected at construction behind trait objects, so the
//! device, recognizer and catalog can all be scripted in tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::pipeline;
use super::scheduler::{self, AutoScan, AutoScanState};
use super::{ScanFailure, ScanMode, ScanResult};
use crate::capture::{CaptureDevice, PermissionState};
use crate::catalog::CardCatalog;
use crate::config::ScannerConfig;
use crate::vision::{RectangleDetector, TextRecognizer};

/// Scanning session facade handed to the caller
pub struct ScanSession {
    inner: Arc<SessionInner>,
}

/// Shared session state, also reachable from the ticker task
pub(crate) struct SessionInner {
    device: Arc<dyn CaptureDevice>,
    recognizer: Arc<dyn TextRecognizer>,
    catalog: Arc<dyn CardCatalog>,
    detector: RectangleDetector,
    config: ScannerConfig,
    running: AtomicBool,
    /// Acts as the single-flight mutex over the whole pipeline
    processing: AtomicBool,
    permission_reported: AtomicBool,
    last_success: Mutex<Option<Instant>>,
    auto_scan: Mutex<AutoScan>,
    results: UnboundedSender<(ScanMode, ScanResult)>,
}

impl ScanSession {
    /// Build a session around its collaborators. Returns the session and the
    /// receiving end of the result channel.
    pub fn new(
        device: Arc<dyn CaptureDevice>,
        recognizer: Arc<dyn TextRecognizer>,
        catalog: Arc<dyn CardCatalog>,
        config: ScannerConfig,
    ) -> (Self, UnboundedReceiver<(ScanMode, ScanResult)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let detector = RectangleDetector::with_config(config.rectangle.clone());

        let inner = Arc::new(SessionInner {
            device,
            recognizer,
            catalog,
            detector,
            config,
            running: AtomicBool::new(false),
            processing: AtomicBool::new(false),
            permission_reported: AtomicBool::new(false),
            last_success: Mutex::new(None),
            auto_scan: Mutex::new(AutoScan::default()),
            results: tx,
        });

        (Self { inner }, rx)
    }

    /// Start the capture session.
    ///
    /// Fails immediately when camera access is denied or restricted. If
    /// auto-scan was enabled before this start, the scheduler comes back up
    /// with the session.
    pub fn start_session(&self) -> Result<(), ScanFailure> {
        match self.inner.device.permission_state() {
            PermissionState::Denied | PermissionState::Restricted => {
                self.inner.permission_reported.store(true, Ordering::SeqCst);
                warn!("Cannot start session, camera access denied");
                return Err(ScanFailure::PermissionDenied);
            }
            PermissionState::Undetermined | PermissionState::Authorized => {}
        }

        if self.inner.running.swap(true, Ordering::SeqCst) {
            debug!("Session already running");
            return Ok(());
        }
        info!("Capture session started");

        let mut auto = self.inner.auto_scan.lock();
        if auto.enabled {
            self.inner.arm_ticker(&mut auto);
        }
        Ok(())
    }

    /// Stop the session. The scheduler drops to Idle; an in-flight cycle
    /// runs to completion but its result is discarded.
    pub fn stop_session(&self) {
        self.inner.stop();
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Whether a capture cycle is currently in flight
    pub fn is_processing(&self) -> bool {
        self.inner.processing.load(Ordering::SeqCst)
    }

    /// Request one capture. Returns whether a cycle actually started; the
    /// request is a no-op while another capture is in flight or the session
    /// is stopped.
    pub fn request_capture(&self, mode: ScanMode) -> bool {
        Arc::clone(&self.inner).request_capture(mode)
    }

    /// Turn auto-scanning on. Arms the scheduler now if the session is
    /// running, otherwise the intent is kept for the next start.
    pub fn enable_auto_scan(&self) {
        let mut auto = self.inner.auto_scan.lock();
        auto.enabled = true;
        if self.inner.running.load(Ordering::SeqCst) {
            self.inner.arm_ticker(&mut auto);
        } else {
            debug!("Auto-scan enabled before session start");
        }
    }

    /// Stop ticking but keep the enabled intent
    pub fn pause_auto_scan(&self) {
        let mut auto = self.inner.auto_scan.lock();
        if auto.state == AutoScanState::Scheduled {
            auto.cancel_ticker();
            auto.state = AutoScanState::Paused;
            debug!("Auto-scan paused");
        }
    }

    /// Restart the ticker after a pause, only while the session is running
    pub fn resume_auto_scan(&self) {
        let mut auto = self.inner.auto_scan.lock();
        if auto.state == AutoScanState::Paused && self.inner.running.load(Ordering::SeqCst) {
            self.inner.arm_ticker(&mut auto);
        }
    }

    /// Turn auto-scanning off and drop the timer
    pub fn disable_auto_scan(&self) {
        let mut auto = self.inner.auto_scan.lock();
        auto.enabled = false;
        auto.cancel_ticker();
        auto.state = AutoScanState::Idle;
    }

    pub fn auto_scan_state(&self) -> AutoScanState {
        self.inner.auto_scan.lock().state
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        self.inner.stop();
    }
}

impl SessionInner {
    pub(crate) fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Cancel any existing ticker and start a fresh one
    fn arm_ticker(self: &Arc<Self>, auto: &mut AutoScan) {
        auto.cancel_ticker();
        let token = CancellationToken::new();
        scheduler::spawn_ticker(Arc::clone(self), token.clone());
        auto.ticker = Some(token);
        auto.state = AutoScanState::Scheduled;
    }

    fn request_capture(self: Arc<Self>, mode: ScanMode) -> bool {
        if !self.running.load(Ordering::SeqCst) {
            debug!("Capture request ignored, session not running");
            return false;
        }
        if self
            .processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Capture request ignored, cycle already in flight");
            return false;
        }

        tokio::spawn(async move {
            let result = self.run_capture().await;
            self.deliver(mode, result);
            self.processing.store(false, Ordering::SeqCst);
        });
        true
    }

    async fn run_capture(&self) -> ScanResult {
        let frame = self
            .device
            .capture_photo()
            .await
            .map_err(ScanFailure::from)?;

        let result = pipeline::run_cycle(
            frame,
            &self.detector,
            self.recognizer.as_ref(),
            self.catalog.as_ref(),
            &self.config,
        )
        .await;

        if result.is_ok() {
            *self.last_success.lock() = Some(Instant::now());
        }
        result
    }

    /// Scheduler tick: skip when busy or cooling down after a success
    pub(crate) fn tick(self: Arc<Self>) {
        if self.processing.load(Ordering::SeqCst) {
            return;
        }

        let cooldown = Duration::from_millis(self.config.auto_scan.cooldown_ms);
        let cooling = self
            .last_success
            .lock()
            .map_or(false, |at| at.elapsed() < cooldown);
        if cooling {
            debug!("Tick skipped, inside cooldown window");
            return;
        }

        self.request_capture(ScanMode::Auto);
    }

    fn deliver(&self, mode: ScanMode, result: ScanResult) {
        if !self.running.load(Ordering::SeqCst) {
            debug!("Discarding result, session stopped");
            return;
        }

        if let Err(failure) = &result {
            if failure.is_terminal() {
                warn!("Terminal scan failure, stopping session: {}", failure);
                self.stop();
            }
            if matches!(failure, ScanFailure::PermissionDenied)
                && self.permission_reported.swap(true, Ordering::SeqCst)
            {
                debug!("Suppressing repeated permission failure");
                return;
            }
        }

        if self.results.send((mode, result)).is_err() {
            debug!("Result receiver dropped");
        }
    }

    fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let mut auto = self.auto_scan.lock();
        auto.cancel_ticker();
        auto.state = AutoScanState::Idle;
        info!("Capture session stopped");
    }
}
