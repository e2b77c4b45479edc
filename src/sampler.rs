//! Frame sampling: independently-owned luminance snapshots of a live feed.

use crate::traits::{Result, ScanError};

/// A luminance snapshot of one video frame.
///
/// Holds 8-bit grayscale pixels, row-major. The data is copied out of the
/// live feed at capture time, so later frames never alter an existing
/// buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Build a buffer from raw luminance data.
    ///
    /// Zero dimensions mean the feed has not produced a frame yet and map
    /// to [`ScanError::NoFrameAvailable`]; a size mismatch is a capture
    /// fault.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ScanError::NoFrameAvailable);
        }
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(ScanError::DecodeFailure(format!(
                "luminance buffer is {} bytes, expected {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Extract the luminance plane from a packed YUYV frame.
    ///
    /// YUYV stores `[Y0 U Y1 V]` per pixel pair, so the Y bytes sit at even
    /// offsets. A frame shorter than `width * height * 2` bytes has not
    /// been fully delivered yet.
    pub fn from_yuyv(width: u32, height: u32, yuyv: &[u8]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ScanError::NoFrameAvailable);
        }
        let pixels = width as usize * height as usize;
        if yuyv.len() < pixels * 2 {
            return Err(ScanError::NoFrameAvailable);
        }
        let data = yuyv.iter().step_by(2).take(pixels).copied().collect();
        Self::new(width, height, data)
    }

    /// Frame width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw luminance data, row-major.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, yielding its luminance plane.
    #[must_use]
    pub fn into_luma(self) -> Vec<u8> {
        self.data
    }

    /// Luminance at the given coordinates, `None` when out of bounds.
    #[must_use]
    pub fn luma_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}
