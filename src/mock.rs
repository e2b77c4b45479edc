//! Scripted fakes for exercising scan sessions without hardware.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::sampler::PixelBuffer;
use crate::session::CameraRequest;
use crate::traits::{
    DecodedSymbol, MediaBackend, Result, ScanError, SymbolDecoder, Symbology, VideoFeed,
};

/// Shared call accounting for a scripted feed.
#[derive(Debug, Default)]
pub struct MockCounters {
    /// Capture attempts, including not-ready probes.
    pub captures: AtomicUsize,
    /// Feed stops. Exactly one per acquire is the invariant under test.
    pub stops: AtomicUsize,
}

#[derive(Debug)]
enum CaptureStep {
    Frame(PixelBuffer),
    NotReady,
    Fail(String),
}

/// Scripted video feed. Once the script runs out it serves blank frames
/// forever, so decoder scripts control when a test loop ends.
#[derive(Debug)]
pub struct MockFeed {
    script: VecDeque<CaptureStep>,
    counters: Arc<MockCounters>,
}

impl MockFeed {
    /// Create a feed reporting into the given counters.
    #[must_use]
    pub fn new(counters: Arc<MockCounters>) -> Self {
        Self {
            script: VecDeque::new(),
            counters,
        }
    }

    /// Queue a frame for the next capture.
    #[must_use]
    pub fn then_frame(mut self, frame: PixelBuffer) -> Self {
        self.script.push_back(CaptureStep::Frame(frame));
        self
    }

    /// Queue a not-ready probe (feed has no frame yet).
    #[must_use]
    pub fn then_not_ready(mut self) -> Self {
        self.script.push_back(CaptureStep::NotReady);
        self
    }

    /// Queue a capture fault.
    #[must_use]
    pub fn then_fail(mut self, message: &str) -> Self {
        self.script.push_back(CaptureStep::Fail(message.to_owned()));
        self
    }
}

impl VideoFeed for MockFeed {
    fn capture(&mut self) -> Result<PixelBuffer> {
        self.counters.captures.fetch_add(1, Ordering::SeqCst);
        match self.script.pop_front() {
            None => Ok(blank_frame()),
            Some(CaptureStep::Frame(frame)) => Ok(frame),
            Some(CaptureStep::NotReady) => Err(ScanError::NoFrameAvailable),
            Some(CaptureStep::Fail(message)) => Err(ScanError::DecodeFailure(message)),
        }
    }

    fn stop(&mut self) {
        self.counters.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Backend that grants one scripted feed, or denies access outright.
pub struct MockBackend {
    feed: Option<MockFeed>,
    denial: Option<String>,
}

impl MockBackend {
    /// Backend granting the given feed on the first acquisition.
    #[must_use]
    pub const fn with_feed(feed: MockFeed) -> Self {
        Self {
            feed: Some(feed),
            denial: None,
        }
    }

    /// Backend denying every acquisition with the given platform message.
    #[must_use]
    pub fn denied(message: &str) -> Self {
        Self {
            feed: None,
            denial: Some(message.to_owned()),
        }
    }
}

impl MediaBackend for MockBackend {
    type Feed<'a> = MockFeed
    where
        Self: 'a;

    async fn start_feed(&mut self, _request: &CameraRequest) -> Result<MockFeed> {
        if let Some(message) = self.denial.clone() {
            return Err(ScanError::DeviceUnavailable(message));
        }
        self.feed
            .take()
            .ok_or_else(|| ScanError::DeviceUnavailable("feed already granted".to_owned()))
    }
}

/// Scripted decoder. Once the script runs out it reports nothing found.
pub struct MockDecoder {
    script: VecDeque<Result<Vec<DecodedSymbol>>>,
    decodes: Arc<AtomicUsize>,
}

impl Default for MockDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDecoder {
    /// Create a decoder with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            decodes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue symbols for the next decode attempt.
    #[must_use]
    pub fn then_symbols(mut self, symbols: Vec<DecodedSymbol>) -> Self {
        self.script.push_back(Ok(symbols));
        self
    }

    /// Queue a decoder internal error.
    #[must_use]
    pub fn then_fail(mut self, message: &str) -> Self {
        self.script
            .push_back(Err(ScanError::DecodeFailure(message.to_owned())));
        self
    }

    /// Handle onto the decode-attempt counter.
    #[must_use]
    pub fn decode_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.decodes)
    }
}

impl SymbolDecoder for MockDecoder {
    fn decode(&mut self, _buffer: &PixelBuffer) -> Result<Vec<DecodedSymbol>> {
        self.decodes.fetch_add(1, Ordering::SeqCst);
        self.script.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// A 64x64 all-white frame with no symbol in it.
#[must_use]
pub fn blank_frame() -> PixelBuffer {
    PixelBuffer::new(64, 64, vec![255; 64 * 64]).expect("blank frame")
}

/// Render `payload` as a QR code luminance frame the real decoder can read.
///
/// Modules are scaled up and surrounded by a quiet zone so the image looks
/// like a clean camera capture rather than a 1px-per-module matrix.
#[must_use]
pub fn qr_frame(payload: &str) -> PixelBuffer {
    let code = qrcode::QrCode::new(payload.as_bytes()).expect("encode payload");
    let modules = code.width();
    let colors = code.to_colors();

    let scale = 8usize;
    let quiet = 4 * scale;
    let size = modules * scale + 2 * quiet;
    let mut data = vec![255u8; size * size];

    for (index, color) in colors.iter().enumerate() {
        if *color != qrcode::Color::Dark {
            continue;
        }
        let mx = index % modules;
        let my = index / modules;
        for dy in 0..scale {
            let row = (quiet + my * scale + dy) * size;
            for dx in 0..scale {
                data[row + quiet + mx * scale + dx] = 0;
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    let size = size as u32;
    PixelBuffer::new(size, size, data).expect("qr frame")
}

/// A decoded QR symbol with the given text.
#[must_use]
pub fn qr_symbol(text: &str) -> DecodedSymbol {
    DecodedSymbol {
        symbology: Symbology::QrCode,
        text: text.to_owned(),
    }
}

/// A decoded code128 symbol with the given text.
#[must_use]
pub fn code128_symbol(text: &str) -> DecodedSymbol {
    DecodedSymbol {
        symbology: Symbology::Code128,
        text: text.to_owned(),
    }
}

/// A decoded symbol of a format the mapping policy ignores.
#[must_use]
pub fn other_symbol(text: &str) -> DecodedSymbol {
    DecodedSymbol {
        symbology: Symbology::Other,
        text: text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_follows_script_then_serves_blanks() {
        let counters = Arc::new(MockCounters::default());
        let mut feed = MockFeed::new(Arc::clone(&counters))
            .then_not_ready()
            .then_frame(blank_frame());

        assert!(matches!(feed.capture(), Err(ScanError::NoFrameAvailable)));
        assert!(feed.capture().is_ok());
        assert!(feed.capture().is_ok());
        assert_eq!(counters.captures.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_decoder_reports_nothing_after_script() {
        let mut decoder = MockDecoder::new().then_symbols(vec![qr_symbol("X")]);
        let count = decoder.decode_count();

        let first = decoder.decode(&blank_frame()).expect("scripted decode");
        assert_eq!(first.len(), 1);
        let second = decoder.decode(&blank_frame()).expect("fallback decode");
        assert!(second.is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_qr_frame_has_quiet_zone() {
        let frame = qr_frame("hello");
        assert_eq!(frame.luma_at(0, 0), Some(255));
        // Finder pattern corner is dark.
        assert_eq!(frame.luma_at(32, 32), Some(0));
    }
}
