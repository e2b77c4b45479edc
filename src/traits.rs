//! Core types, error taxonomy, and seam traits for scan sessions.

use crate::sampler::PixelBuffer;
use crate::session::CameraRequest;

/// Error type for scan session operations.
#[derive(Debug)]
pub enum ScanError {
    /// Camera acquisition was denied or no capture hardware is present.
    /// Carries the platform error description.
    DeviceUnavailable(String),
    /// The feed has not produced a frame yet. Transient and expected while
    /// a session warms up; it gates scan loop start and is never user-visible.
    NoFrameAvailable,
    /// A capture or decode fault during a scan iteration.
    DecodeFailure(String),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeviceUnavailable(msg) => write!(f, "Camera unavailable: {msg}"),
            Self::NoFrameAvailable => write!(f, "No frame available yet"),
            Self::DecodeFailure(msg) => write!(f, "Scan iteration failed: {msg}"),
        }
    }
}

impl std::error::Error for ScanError {}

/// Result type for scan session operations.
pub type Result<T> = std::result::Result<T, ScanError>;

/// The kind of symbol a scan session can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// A QR code.
    QrCode,
    /// A linear (code128) barcode.
    Barcode,
}

impl SymbolKind {
    /// Wire-friendly name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QrCode => "qrcode",
            Self::Barcode => "barcode",
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single result a scan session delivers to its host.
///
/// Immutable once produced; at most one is emitted per session
/// (first-match-wins).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Kind of the matched symbol.
    pub kind: SymbolKind,
    /// Decoded text payload.
    pub value: String,
}

/// Symbology tag reported by the decoding library.
///
/// `Other` covers every format the library recognizes beyond the two the
/// scan session maps to results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    /// QR code.
    QrCode,
    /// Code128 linear barcode.
    Code128,
    /// Any other recognized format; ignored by the mapping policy.
    Other,
}

/// One recognized symbol from a decode attempt. Transient: discarded unless
/// it maps to a supported [`ScanResult`] kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSymbol {
    /// Symbology the library recognized.
    pub symbology: Symbology,
    /// Decoded text of the symbol.
    pub text: String,
}

/// Symbologies enabled for a scan session. Fixed at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Recognize QR codes.
    pub qrcode: bool,
    /// Recognize code128 linear barcodes.
    pub code128: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            qrcode: true,
            code128: true,
        }
    }
}

impl ScanConfig {
    /// Enable or disable QR recognition.
    #[must_use]
    pub const fn with_qrcode(mut self, enabled: bool) -> Self {
        self.qrcode = enabled;
        self
    }

    /// Enable or disable code128 recognition.
    #[must_use]
    pub const fn with_code128(mut self, enabled: bool) -> Self {
        self.code128 = enabled;
        self
    }

    /// Whether a detected symbology passes this configuration.
    ///
    /// Formats outside the QR/code128 vocabulary are passed through; the
    /// scan loop's mapping policy ignores them.
    #[must_use]
    pub const fn allows(self, symbology: Symbology) -> bool {
        match symbology {
            Symbology::QrCode => self.qrcode,
            Symbology::Code128 => self.code128,
            Symbology::Other => true,
        }
    }
}

/// A live video feed owned by a camera session.
pub trait VideoFeed {
    /// Snapshot the current frame as a fresh, independently-owned buffer.
    ///
    /// Fails with [`ScanError::NoFrameAvailable`] while the feed has not
    /// delivered a frame yet.
    fn capture(&mut self) -> Result<PixelBuffer>;

    /// Stop the underlying media tracks. Called exactly once by the owning
    /// session on release.
    fn stop(&mut self);
}

/// Source of camera video feeds.
#[allow(async_fn_in_trait)]
pub trait MediaBackend {
    /// The feed type produced by this backend.
    type Feed<'a>: VideoFeed
    where
        Self: 'a;

    /// Start a video feed honoring the request's facing mode and resolution
    /// ceiling. Fails with [`ScanError::DeviceUnavailable`] on denial or
    /// absent hardware.
    async fn start_feed(&mut self, request: &CameraRequest) -> Result<Self::Feed<'_>>;
}

/// External symbol decoder, configured once per scan session.
pub trait SymbolDecoder {
    /// Decode one frame. Returns recognized symbols in the order the
    /// library reports them; an empty vector means nothing was found.
    fn decode(&mut self, buffer: &PixelBuffer) -> Result<Vec<DecodedSymbol>>;
}
