//! V4L2 media backend using the v4l crate.

use tracing::debug;
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::{CaptureStream as V4lCaptureStream, Stream as V4lStream};
use v4l::video::Capture;
use v4l::Device;

use crate::sampler::PixelBuffer;
use crate::session::CameraRequest;
use crate::traits::{MediaBackend, Result, ScanError, VideoFeed};

/// V4L2 backend wrapping one capture device.
///
/// V4L2 has no facing-mode concept, so [`CameraRequest::facing`] is
/// advisory here; device selection is by index.
pub struct V4l2Backend {
    device: Device,
    card: String,
}

impl std::fmt::Debug for V4l2Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V4l2Backend")
            .field("card", &self.card)
            .finish_non_exhaustive()
    }
}

impl V4l2Backend {
    /// Open a V4L2 device by index (e.g., 0 for /dev/video0) and verify it
    /// can capture video.
    pub fn open(index: u32) -> Result<Self> {
        let device = Device::new(index as usize).map_err(|err| {
            ScanError::DeviceUnavailable(format!("failed to open device {index}: {err}"))
        })?;

        let caps = device
            .query_caps()
            .map_err(|err| ScanError::DeviceUnavailable(err.to_string()))?;

        if !caps
            .capabilities
            .contains(v4l::capability::Flags::VIDEO_CAPTURE)
        {
            return Err(ScanError::DeviceUnavailable(format!(
                "device {index} ({}) cannot capture video",
                caps.card
            )));
        }

        Ok(Self {
            device,
            card: caps.card,
        })
    }

    /// Card/device name reported by the driver.
    #[must_use]
    pub fn card(&self) -> &str {
        &self.card
    }
}

impl MediaBackend for V4l2Backend {
    type Feed<'a> = V4l2Feed<'a>
    where
        Self: 'a;

    async fn start_feed(&mut self, request: &CameraRequest) -> Result<V4l2Feed<'_>> {
        let mut fmt = self
            .device
            .format()
            .map_err(|err| ScanError::DeviceUnavailable(err.to_string()))?;

        // Clamp the driver's current resolution to the request ceiling and
        // force YUYV so luminance extraction stays trivial.
        fmt.width = fmt.width.clamp(1, request.max_width);
        fmt.height = fmt.height.clamp(1, request.max_height);
        fmt.fourcc = v4l::FourCC::new(b"YUYV");

        let fmt = self
            .device
            .set_format(&fmt)
            .map_err(|err| ScanError::DeviceUnavailable(err.to_string()))?;

        if fmt.fourcc.repr != *b"YUYV" {
            return Err(ScanError::DeviceUnavailable(format!(
                "driver does not support YUYV capture (offered {})",
                String::from_utf8_lossy(&fmt.fourcc.repr)
            )));
        }

        let stream = Stream::with_buffers(&self.device, Type::VideoCapture, 4)
            .map_err(|err| ScanError::DeviceUnavailable(err.to_string()))?;

        debug!(
            card = %self.card,
            width = fmt.width,
            height = fmt.height,
            "camera feed started"
        );

        Ok(V4l2Feed {
            stream,
            width: fmt.width,
            height: fmt.height,
        })
    }
}

/// Live V4L2 feed wrapping mmap-based streaming.
pub struct V4l2Feed<'a> {
    stream: Stream<'a>,
    width: u32,
    height: u32,
}

impl VideoFeed for V4l2Feed<'_> {
    fn capture(&mut self) -> Result<PixelBuffer> {
        let (buf, meta) = self
            .stream
            .next()
            .map_err(|err| ScanError::DecodeFailure(format!("frame capture failed: {err}")))?;

        if meta.bytesused == 0 {
            return Err(ScanError::NoFrameAvailable);
        }

        PixelBuffer::from_yuyv(self.width, self.height, buf)
    }

    fn stop(&mut self) {
        // STREAMOFF ends capture and the device's camera indicator with it;
        // a failure here leaves nothing for the caller to act on.
        let _ = self.stream.stop();
    }
}
