//! Cam-Scan: camera-driven QR/barcode scan sessions.
//!
//! This library acquires a camera video feed, samples frames on a fixed
//! cadence, delegates symbol decoding to an external library, and delivers
//! the first successful decode to the host exactly once. Trait seams around
//! the camera backend and the decoder allow production use with V4L2
//! hardware and deterministic testing with scripted fakes.

pub mod decoder;
pub mod device;
pub mod sampler;
pub mod scanner;
pub mod session;
pub mod traits;

#[cfg(test)]
pub mod mock;

pub use decoder::RxingDecoder;
pub use device::V4l2Backend;
pub use sampler::PixelBuffer;
pub use scanner::{LoopState, ScanLoop, ScanLoopOptions, ScanOutcome, INTER_FRAME_DELAY};
pub use session::{acquire, CameraRequest, CameraSession, Facing, SessionState};
pub use traits::{
    DecodedSymbol, MediaBackend, Result, ScanConfig, ScanError, ScanResult, SymbolDecoder,
    SymbolKind, Symbology, VideoFeed,
};
