//! Shared fixtures for app integration tests.

use std::sync::{Arc, Mutex};

use photobooth_api::ScriptedTransport;
use photobooth_app::{BoothApp, BoothConfig};
use photobooth_ui::{Navigator, Notifier};

/// Messages and redirects seen by the app's front end.
#[derive(Debug, Default)]
pub struct RecordingShell {
    pub messages: Mutex<Vec<String>>,
    pub visited: Mutex<Vec<String>>,
}

impl Notifier for RecordingShell {
    fn show_error(&self, message: &str) {
        self.messages
            .lock()
            .expect("shell lock")
            .push(format!("error: {message}"));
    }

    fn show_success(&self, message: &str) {
        self.messages
            .lock()
            .expect("shell lock")
            .push(format!("ok: {message}"));
    }
}

impl Navigator for RecordingShell {
    fn navigate(&self, url: &str) {
        self.visited
            .lock()
            .expect("shell lock")
            .push(url.to_string());
    }
}

/// Builds an app over a scripted transport.
#[allow(dead_code)]
pub fn scripted_app() -> (BoothApp, Arc<ScriptedTransport>, Arc<RecordingShell>) {
    let config = BoothConfig {
        origin: "https://booth.example.test".to_string(),
        cookies: Some("sessionid=s1; csrftoken=tok123".to_string()),
        ..BoothConfig::default()
    };
    let transport = Arc::new(ScriptedTransport::new());
    let shell = Arc::new(RecordingShell::default());
    let app = BoothApp::with_transport(&config, transport.clone(), shell.clone(), shell.clone())
        .expect("fixture app should build");
    (app, transport, shell)
}
