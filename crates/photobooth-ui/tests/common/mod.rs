//! Shared fixtures for form manager and booth view tests.

use std::sync::{Arc, Mutex};

use photobooth_api::{ApiClient, ApiConfig, ScriptedTransport};
use photobooth_ui::{Navigator, Notifier};

/// Origin used by every fixture client.
#[allow(dead_code)]
pub const ORIGIN: &str = "https://booth.example.test";

/// Builds a shared client over a fresh scripted transport.
#[allow(dead_code)]
pub fn scripted_api() -> (Arc<ApiClient>, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::new());
    let config = ApiConfig::new(ORIGIN).with_cookies("csrftoken=tok123");
    let client = ApiClient::new(config, transport.clone()).expect("fixture client should build");
    (Arc::new(client), transport)
}

/// Notifier that records messages.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub errors: Mutex<Vec<String>>,
    pub successes: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().expect("notifier lock").clone()
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().expect("notifier lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show_error(&self, message: &str) {
        self.errors
            .lock()
            .expect("notifier lock")
            .push(message.to_string());
    }

    fn show_success(&self, message: &str) {
        self.successes
            .lock()
            .expect("notifier lock")
            .push(message.to_string());
    }
}

/// Navigator that records target URLs.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub visited: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingNavigator {
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().expect("navigator lock").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        self.visited
            .lock()
            .expect("navigator lock")
            .push(url.to_string());
    }
}
