//! Shared fixtures for API client integration tests.

use std::sync::Arc;

use photobooth_api::{ApiClient, ApiConfig, ScriptedTransport};

/// Origin used by every fixture client.
#[allow(dead_code)]
pub const ORIGIN: &str = "https://booth.example.test";

/// Builds a client over a fresh scripted transport with a CSRF cookie.
#[allow(dead_code)]
pub fn scripted_client() -> (ApiClient, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::new());
    let config = ApiConfig::new(ORIGIN).with_cookies("sessionid=s1; csrftoken=tok123");
    let client = ApiClient::new(config, transport.clone()).expect("fixture client should build");
    (client, transport)
}
