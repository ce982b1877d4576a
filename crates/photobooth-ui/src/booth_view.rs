//! Render-ready state of the booth screen.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use photobooth_capture::{CaptureObserver, CaptureState, PhotoReady};

/// How long an error banner stays up before the shell hides it.
pub const ERROR_DISPLAY_DURATION: Duration = Duration::from_secs(5);

/// Snapshot of everything the booth screen shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoothViewState {
    /// Workflow state driving button enablement.
    pub capture: CaptureState,
    /// Photo count text.
    pub photo_count: String,
    /// Countdown overlay number, hidden when `None`.
    pub countdown: Option<u32>,
    /// Active flash overlay duration, hidden when `None`.
    pub flash: Option<Duration>,
    /// Preview of the last stored photo; the modal is open while set.
    pub preview: Option<PhotoReady>,
    /// QR image URL once the user asked for it.
    pub qr_code: Option<String>,
    /// Error banner text.
    pub last_error: Option<String>,
}

impl BoothViewState {
    /// Returns `true` when the shutter button should be enabled.
    pub fn can_capture(&self) -> bool {
        self.capture == CaptureState::Ready || self.capture == CaptureState::Error
    }
}

/// Capture observer that maintains a [`BoothViewState`].
#[derive(Debug, Default)]
pub struct BoothView {
    state: Mutex<BoothViewState>,
}

impl BoothView {
    /// Creates an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> BoothViewState {
        self.state().clone()
    }

    /// Reveals the QR code of the previewed photo and returns its URL.
    pub fn show_qr_code(&self) -> Option<String> {
        let mut state = self.state();
        let url = state.preview.as_ref().map(|photo| photo.qr_url.clone())?;
        state.qr_code = Some(url.clone());
        Some(url)
    }

    /// Download link of the previewed photo.
    pub fn download_link(&self) -> Option<String> {
        self.state()
            .preview
            .as_ref()
            .map(|photo| photo.download_url.clone())
    }

    /// Closes the preview modal and hides the QR code.
    pub fn dismiss_preview(&self) {
        let mut state = self.state();
        state.preview = None;
        state.qr_code = None;
    }

    /// Returns to the live view for another shot.
    pub fn retake(&self) {
        let mut state = self.state();
        state.preview = None;
        state.qr_code = None;
        state.countdown = None;
        state.flash = None;
    }

    /// Hides the flash overlay once its duration elapsed.
    pub fn clear_flash(&self) {
        self.state().flash = None;
    }

    /// Hides the error banner.
    pub fn dismiss_error(&self) {
        self.state().last_error = None;
    }

    fn state(&self) -> MutexGuard<'_, BoothViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CaptureObserver for BoothView {
    fn on_state(&self, capture: CaptureState) {
        let mut state = self.state();
        state.capture = capture;
        if capture != CaptureState::CountingDown {
            state.countdown = None;
        }
    }

    fn on_countdown_tick(&self, remaining: u32) {
        // Tick 0 closes the overlay.
        self.state().countdown = (remaining > 0).then_some(remaining);
    }

    fn on_flash(&self, duration: Duration) {
        self.state().flash = Some(duration);
    }

    fn on_photo_count(&self, count: u64) {
        self.state().photo_count = count.to_string();
    }

    fn on_photo_ready(&self, photo: &PhotoReady) {
        let mut state = self.state();
        state.preview = Some(photo.clone());
        state.qr_code = None;
    }

    fn on_error(&self, message: &str) {
        log::debug!("booth error banner: {message}");
        self.state().last_error = Some(message.to_string());
    }
}
