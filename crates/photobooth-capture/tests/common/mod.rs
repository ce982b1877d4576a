//! Shared fixtures for capture workflow integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use photobooth_api::{ApiClient, ApiConfig, HttpMethod, ScriptedTransport};
use photobooth_capture::{CaptureObserver, CaptureState, PhotoReady};
use serde_json::json;

/// Origin used by every fixture client.
#[allow(dead_code)]
pub const ORIGIN: &str = "https://booth.example.test";
/// Primary upload route.
#[allow(dead_code)]
pub const CAPTURE_PATH: &str = "/api/photobooth/photos/capture/";
/// Legacy upload route.
#[allow(dead_code)]
pub const LEGACY_PATH: &str = "/photobooth/api/capture/";
/// Settings route.
#[allow(dead_code)]
pub const SETTINGS_PATH: &str = "/api/photobooth/settings/camera/";

/// Builds a client over a fresh scripted transport.
#[allow(dead_code)]
pub fn scripted_api() -> (Arc<ApiClient>, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::new());
    let config = ApiConfig::new(ORIGIN).with_cookies("csrftoken=tok123");
    let client = ApiClient::new(config, transport.clone()).expect("fixture client should build");
    (Arc::new(client), transport)
}

/// Scripts small camera settings so encoding stays fast.
#[allow(dead_code)]
pub fn script_small_settings(transport: &ScriptedTransport, countdown: u32) {
    transport.respond(
        HttpMethod::Get,
        SETTINGS_PATH,
        200,
        json!({
            "resolution": { "width": 8, "height": 6 },
            "fps": 30,
            "countdown": countdown,
            "quality": 80
        }),
    );
}

/// One recorded observer notification.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum Seen {
    State(CaptureState),
    Tick(u32),
    Flash(Duration),
    Count(u64),
    Ready(PhotoReady),
    Error(String),
}

/// Observer that records every notification in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    seen: Mutex<Vec<Seen>>,
}

#[allow(dead_code)]
impl RecordingObserver {
    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().expect("observer lock").clone()
    }

    pub fn ticks(&self) -> Vec<u32> {
        self.seen()
            .into_iter()
            .filter_map(|seen| match seen {
                Seen::Tick(remaining) => Some(remaining),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.seen()
            .into_iter()
            .filter_map(|seen| match seen {
                Seen::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn flashes(&self) -> Vec<Duration> {
        self.seen()
            .into_iter()
            .filter_map(|seen| match seen {
                Seen::Flash(duration) => Some(duration),
                _ => None,
            })
            .collect()
    }

    fn push(&self, seen: Seen) {
        self.seen.lock().expect("observer lock").push(seen);
    }
}

impl CaptureObserver for RecordingObserver {
    fn on_state(&self, state: CaptureState) {
        self.push(Seen::State(state));
    }

    fn on_countdown_tick(&self, remaining: u32) {
        self.push(Seen::Tick(remaining));
    }

    fn on_flash(&self, duration: Duration) {
        self.push(Seen::Flash(duration));
    }

    fn on_photo_count(&self, count: u64) {
        self.push(Seen::Count(count));
    }

    fn on_photo_ready(&self, photo: &PhotoReady) {
        self.push(Seen::Ready(photo.clone()));
    }

    fn on_error(&self, message: &str) {
        self.push(Seen::Error(message.to_string()));
    }
}
