//! The scan loop: fixed-cadence sample/decode cycles over a camera session.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::session::CameraSession;
use crate::traits::{
    DecodedSymbol, ScanError, ScanResult, SymbolDecoder, SymbolKind, Symbology, VideoFeed,
};

/// Contractual pause between consecutive sampling attempts.
pub const INTER_FRAME_DELAY: Duration = Duration::from_millis(100);

/// Scan loop states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for the feed's first frame.
    Idle,
    /// Capturing a frame.
    Sampling,
    /// Running the decoder on a captured frame.
    Decoding,
    /// A symbol mapped to a result; the callback is being delivered.
    ResultFound,
    /// Nothing recognized this iteration.
    NoResult,
    /// The loop has exited and the session is released.
    Terminated,
}

/// Why a scan loop exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// A result was delivered to the callback (first-match-wins).
    Completed,
    /// Cancellation was requested and observed at a suspension point.
    Cancelled,
    /// A capture or decode fault ended the run. Per-iteration errors are
    /// never surfaced beyond this variant.
    Stopped,
    /// The configured iteration cap was reached without a match.
    Exhausted,
}

/// Tunables for a scan loop.
#[derive(Debug, Clone, Copy)]
pub struct ScanLoopOptions {
    /// Pause between sampling attempts. Fixed, not adaptive: it bounds
    /// capture/decode frequency against CPU and battery cost.
    pub inter_frame_delay: Duration,
    /// Optional cap on no-result iterations. `None` loops until a match,
    /// a fault, or cancellation.
    pub max_iterations: Option<u32>,
}

impl Default for ScanLoopOptions {
    fn default() -> Self {
        Self {
            inter_frame_delay: INTER_FRAME_DELAY,
            max_iterations: None,
        }
    }
}

/// A single scan session's loop.
///
/// Owns the camera session and the decoder for its whole lifetime; the
/// session is released exactly once on every exit path.
pub struct ScanLoop<F: VideoFeed, D: SymbolDecoder> {
    session: CameraSession<F>,
    decoder: D,
    options: ScanLoopOptions,
    cancel: CancellationToken,
    state: LoopState,
}

impl<F: VideoFeed, D: SymbolDecoder> ScanLoop<F, D> {
    /// Wire a loop to an acquired session and a session-scoped decoder.
    pub fn new(session: CameraSession<F>, decoder: D, cancel: CancellationToken) -> Self {
        Self {
            session,
            decoder,
            options: ScanLoopOptions::default(),
            cancel,
            state: LoopState::Idle,
        }
    }

    /// Override the default loop tunables.
    #[must_use]
    pub fn with_options(mut self, options: ScanLoopOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the loop to completion.
    ///
    /// Starts once the feed delivers its first frame, then alternates
    /// capture and decode with the fixed inter-frame delay. On the first
    /// mapped symbol the callback is invoked exactly once and awaited fully
    /// before cleanup. Capture/decode faults end the run silently;
    /// cancellation is observed at every suspension point.
    pub async fn run<C, Fut>(mut self, on_result: C) -> ScanOutcome
    where
        C: FnMut(ScanResult) -> Fut,
        Fut: Future<Output = ()>,
    {
        let outcome = self.drive(on_result).await;
        self.session.release();
        self.transition(LoopState::Terminated);
        debug!(?outcome, "scan loop finished");
        outcome
    }

    async fn drive<C, Fut>(&mut self, mut on_result: C) -> ScanOutcome
    where
        C: FnMut(ScanResult) -> Fut,
        Fut: Future<Output = ()>,
    {
        // Gate on the first frame: sampling before any pixel data exists
        // would only produce degenerate zero-size buffers.
        let first = loop {
            if self.cancel.is_cancelled() {
                return ScanOutcome::Cancelled;
            }
            match self.session.capture() {
                Ok(buffer) => break buffer,
                Err(ScanError::NoFrameAvailable) => {
                    trace!("feed not ready, waiting for first frame");
                    if self.pause().await {
                        return ScanOutcome::Cancelled;
                    }
                }
                Err(err) => {
                    debug!(error = %err, "capture failed before first frame");
                    return ScanOutcome::Stopped;
                }
            }
        };

        let mut pending = Some(first);
        let mut iterations = 0u32;

        loop {
            self.transition(LoopState::Sampling);
            let buffer = match pending.take().map_or_else(|| self.session.capture(), Ok) {
                Ok(buffer) => buffer,
                Err(err) => {
                    debug!(error = %err, "capture failed, stopping scan");
                    return ScanOutcome::Stopped;
                }
            };

            self.transition(LoopState::Decoding);
            let symbols = match self.decoder.decode(&buffer) {
                Ok(symbols) => symbols,
                Err(err) => {
                    debug!(error = %err, "decode failed, stopping scan");
                    return ScanOutcome::Stopped;
                }
            };

            if let Some(result) = first_match(symbols) {
                self.transition(LoopState::ResultFound);
                on_result(result).await;
                return ScanOutcome::Completed;
            }

            self.transition(LoopState::NoResult);
            iterations += 1;
            if let Some(max) = self.options.max_iterations {
                if iterations >= max {
                    debug!(iterations, "iteration cap reached");
                    return ScanOutcome::Exhausted;
                }
            }

            if self.pause().await {
                return ScanOutcome::Cancelled;
            }
        }
    }

    /// Wait one inter-frame delay; returns `true` if cancelled first.
    async fn pause(&self) -> bool {
        tokio::select! {
            () = self.cancel.cancelled() => true,
            () = tokio::time::sleep(self.options.inter_frame_delay) => false,
        }
    }

    fn transition(&mut self, next: LoopState) {
        trace!(from = ?self.state, to = ?next, "scan loop transition");
        self.state = next;
    }
}

/// Mapping policy: inspect only the first reported symbol. QR maps to
/// `qrcode`, code128 to `barcode`, anything else yields no result.
fn first_match(symbols: Vec<DecodedSymbol>) -> Option<ScanResult> {
    let first = symbols.into_iter().next()?;
    match first.symbology {
        Symbology::QrCode => Some(ScanResult {
            kind: SymbolKind::QrCode,
            value: first.text,
        }),
        Symbology::Code128 => Some(ScanResult {
            kind: SymbolKind::Barcode,
            value: first.text,
        }),
        Symbology::Other => None,
    }
}
