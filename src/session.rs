//! Camera session management: scoped acquisition with guaranteed release.

use tracing::debug;

use crate::sampler::PixelBuffer;
use crate::traits::{MediaBackend, Result, ScanError, VideoFeed};

/// Which camera to prefer when a platform has more than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Rear/world-facing camera.
    Environment,
    /// Front/user-facing camera.
    User,
}

/// Parameters for acquiring a camera feed.
#[derive(Debug, Clone)]
pub struct CameraRequest {
    /// Preferred camera facing. Advisory on platforms without the concept.
    pub facing: Facing,
    /// Resolution ceiling, width.
    pub max_width: u32,
    /// Resolution ceiling, height.
    pub max_height: u32,
}

impl Default for CameraRequest {
    fn default() -> Self {
        Self {
            facing: Facing::Environment,
            max_width: 1080,
            max_height: 1080,
        }
    }
}

impl CameraRequest {
    /// Set the preferred facing mode.
    #[must_use]
    pub const fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    /// Set the resolution ceiling.
    #[must_use]
    pub const fn with_max_size(mut self, width: u32, height: u32) -> Self {
        self.max_width = width;
        self.max_height = height;
        self
    }
}

/// Lifecycle state of a camera grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the platform to grant the device.
    Acquiring,
    /// Feed is live; the device's camera indicator is engaged.
    Active,
    /// Acquisition failed; no feed was granted.
    Failed,
    /// Media tracks have been stopped.
    Released,
}

/// An active camera device grant.
///
/// Exclusively owned by the component that acquired it. The feed is stopped
/// exactly once, either by an explicit [`CameraSession::release`] or by
/// `Drop`, whichever comes first.
#[derive(Debug)]
pub struct CameraSession<F: VideoFeed> {
    feed: Option<F>,
    state: SessionState,
}

/// Acquire a camera feed from `backend` and wrap it in a session.
///
/// Suspends while the platform grants (or denies) the device. On denial the
/// backend's [`ScanError::DeviceUnavailable`] propagates to the caller.
pub async fn acquire<'b, B: MediaBackend>(
    backend: &'b mut B,
    request: &CameraRequest,
) -> Result<CameraSession<B::Feed<'b>>> {
    let mut session = CameraSession {
        feed: None,
        state: SessionState::Acquiring,
    };

    match backend.start_feed(request).await {
        Ok(feed) => {
            session.feed = Some(feed);
            session.state = SessionState::Active;
            debug!(facing = ?request.facing, "camera session active");
            Ok(session)
        }
        Err(err) => {
            session.state = SessionState::Failed;
            debug!(error = %err, "camera acquisition failed");
            Err(err)
        }
    }
}

impl<F: VideoFeed> CameraSession<F> {
    /// Snapshot the current frame from the live feed.
    pub fn capture(&mut self) -> Result<PixelBuffer> {
        match self.feed.as_mut() {
            Some(feed) => feed.capture(),
            None => Err(ScanError::DecodeFailure(
                "session already released".to_owned(),
            )),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the feed is still live.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active)
    }

    /// Stop the underlying media tracks.
    ///
    /// Idempotent: the first call stops the feed, later calls are no-ops.
    pub fn release(&mut self) {
        if let Some(mut feed) = self.feed.take() {
            feed.stop();
            self.state = SessionState::Released;
            debug!("camera session released");
        }
    }
}

impl<F: VideoFeed> Drop for CameraSession<F> {
    fn drop(&mut self) {
        self.release();
    }
}
