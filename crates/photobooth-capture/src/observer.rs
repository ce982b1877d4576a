//! Presentation hooks the workflow reports progress through.

use std::time::Duration;

use photobooth_core::PhotoId;

/// Lifecycle states of [`crate::CaptureWorkflow`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CaptureState {
    /// Not initialized, or torn down.
    #[default]
    Idle,
    /// Loading settings and context, acquiring the camera.
    Initializing,
    /// Camera streaming, waiting for a capture request.
    Ready,
    /// Countdown overlay running.
    CountingDown,
    /// Grabbing and encoding the still.
    Capturing,
    /// Sending the still to the backend.
    Uploading,
    /// Last operation failed.
    Error,
}

/// A stored photo ready to be previewed, downloaded or shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoReady {
    /// Server-issued photo id.
    pub photo_id: PhotoId,
    /// JPEG data URI shown as preview.
    pub image: String,
    /// Absolute download link.
    pub download_url: String,
    /// Absolute QR image link.
    pub qr_url: String,
}

/// Receives workflow progress. Every hook defaults to a no-op.
pub trait CaptureObserver: Send + Sync {
    /// Called on every state transition.
    fn on_state(&self, _state: CaptureState) {}

    /// Called with the remaining seconds, ending with `0`.
    fn on_countdown_tick(&self, _remaining: u32) {}

    /// Called once per captured still with the flash duration.
    fn on_flash(&self, _duration: Duration) {}

    /// Called whenever the known photo count changes.
    fn on_photo_count(&self, _count: u64) {}

    /// Called after a successful upload.
    fn on_photo_ready(&self, _photo: &PhotoReady) {}

    /// Called with a user-facing error message.
    fn on_error(&self, _message: &str) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CaptureObserver for NoopObserver {}
