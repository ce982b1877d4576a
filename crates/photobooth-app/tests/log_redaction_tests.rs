//! Integration tests for log redaction.

use photobooth_app::{BoothConfig, redact_sensitive};

#[test]
fn log_redaction_tests_removes_cookie_and_token_values() {
    let raw = "cookie=sessionid=s3cr3t; csrftoken=abc123 origin=https://booth.example.test";
    let redacted = redact_sensitive(raw);

    assert!(!redacted.contains("s3cr3t"));
    assert!(!redacted.contains("abc123"));
    assert!(redacted.contains("origin=https://booth.example.test"));
    assert!(redacted.contains("<redacted>"));
}

#[test]
fn log_redaction_tests_keeps_auth_scheme() {
    assert_eq!(
        redact_sensitive("authorization=Bearer abc123"),
        "authorization=Bearer <redacted>"
    );
    assert_eq!(
        redact_sensitive("X-CSRFToken: tok123"),
        "X-CSRFToken: <redacted>"
    );
    assert_eq!(redact_sensitive("password=hunter2&next=/"), "password=<redacted>&next=/");
}

#[test]
fn log_redaction_tests_leaves_plain_text_alone() {
    let raw = "photo 42 stored for event e1";
    assert_eq!(redact_sensitive(raw), raw);
}

#[test]
fn log_redaction_tests_config_description_hides_cookies() {
    let config = BoothConfig {
        cookies: Some("sessionid=s3cr3t; csrftoken=abc123".to_string()),
        ..BoothConfig::default()
    };
    let described = config.describe();

    assert!(described.contains("origin=http://localhost:8000"));
    assert!(!described.contains("s3cr3t"));
    assert!(!described.contains("abc123"));
}
