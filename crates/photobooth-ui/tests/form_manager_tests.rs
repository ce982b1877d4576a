//! Integration tests for the event and registration form managers.

mod common;

use std::sync::Arc;

use common::{RecordingNavigator, RecordingNotifier, scripted_api};
use photobooth_api::{ApiClient, HttpMethod, ScriptedTransport};
use photobooth_ui::{
    CreateEventForm, EventManager, FormError, JoinEventForm, RegistrationForm,
    RegistrationManager,
};
use serde_json::json;

struct Harness {
    transport: Arc<ScriptedTransport>,
    notifier: Arc<RecordingNotifier>,
    navigator: Arc<RecordingNavigator>,
    api: Arc<ApiClient>,
}

fn harness() -> Harness {
    let (api, transport) = scripted_api();
    Harness {
        transport,
        notifier: Arc::new(RecordingNotifier::default()),
        navigator: Arc::new(RecordingNavigator::default()),
        api,
    }
}

impl Harness {
    fn events(&self) -> EventManager {
        EventManager::new(
            self.api.clone(),
            self.notifier.clone(),
            self.navigator.clone(),
        )
    }

    fn registration(&self) -> RegistrationManager {
        RegistrationManager::new(
            self.api.clone(),
            self.notifier.clone(),
            self.navigator.clone(),
        )
    }
}

#[tokio::test]
async fn forms_join_upper_cases_code_and_follows_redirect() {
    let h = harness();
    h.transport.respond(
        HttpMethod::Post,
        "/api/photobooth/events/join/",
        200,
        json!({
            "message": "Joined Wedding",
            "event_id": 3,
            "redirect_url": "/photobooth/event/3/booth/"
        }),
    );

    let message = h
        .events()
        .handle_join_event(&JoinEventForm {
            code: " abc123 ".to_string(),
        })
        .await
        .expect("join should work");

    assert_eq!(message, "Joined Wedding");
    let sent = h.transport.requests_to("/api/photobooth/events/join/");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].json_body(), Some(json!({ "code": "ABC123" })));
    assert_eq!(h.notifier.successes(), vec!["Joined Wedding".to_string()]);
    assert_eq!(h.navigator.visited(), vec!["/photobooth/event/3/booth/".to_string()]);
}

#[tokio::test]
async fn forms_join_shows_server_error_without_navigating() {
    let h = harness();
    h.transport.respond(
        HttpMethod::Post,
        "/api/photobooth/events/join/",
        404,
        json!({ "error": "Invalid event code" }),
    );

    let result = h
        .events()
        .handle_join_event(&JoinEventForm {
            code: "nope".to_string(),
        })
        .await;

    assert!(matches!(result, Err(FormError::Api(_))));
    assert_eq!(h.notifier.errors(), vec!["Invalid event code".to_string()]);
    assert!(h.navigator.visited().is_empty());
    assert_eq!(h.transport.requests().len(), 1);
}

#[tokio::test]
async fn forms_blank_fields_are_rejected_without_requests() {
    let h = harness();

    let join = h
        .events()
        .handle_join_event(&JoinEventForm {
            code: "   ".to_string(),
        })
        .await;
    let create = h
        .events()
        .handle_create_event(&CreateEventForm::default())
        .await;
    let register = h
        .registration()
        .handle_registration(&RegistrationForm {
            email: "guest@example.test".to_string(),
            ..RegistrationForm::default()
        })
        .await;

    assert!(matches!(join, Err(FormError::Validation(_))));
    assert!(matches!(create, Err(FormError::Validation(_))));
    assert!(matches!(register, Err(FormError::Validation(_))));
    assert_eq!(
        h.notifier.errors(),
        vec![
            "Event code is required".to_string(),
            "Event name is required".to_string(),
            "Password is required".to_string(),
        ]
    );
    assert!(h.transport.requests().is_empty());
}

#[tokio::test]
async fn forms_create_event_opens_the_new_event() {
    let h = harness();
    h.transport.respond(
        HttpMethod::Post,
        "/api/photobooth/events/create/",
        201,
        json!({
            "message": "Event created successfully! Code: QX7P2M",
            "event": { "id": 11, "name": "Summer Party", "code": "QX7P2M" }
        }),
    );

    h.events()
        .handle_create_event(&CreateEventForm {
            name: "  Summer Party ".to_string(),
            qr_base_url: String::new(),
        })
        .await
        .expect("create should work");

    let sent = h.transport.requests_to("/api/photobooth/events/create/");
    assert_eq!(
        sent[0].json_body(),
        Some(json!({ "name": "Summer Party", "qr_base_url": "" }))
    );
    assert_eq!(
        h.notifier.successes(),
        vec!["Event created successfully! Code: QX7P2M".to_string()]
    );
    assert_eq!(
        h.navigator.visited(),
        vec!["https://booth.example.test/photobooth/events/11/".to_string()]
    );
}

#[tokio::test]
async fn forms_create_without_event_payload_stays_put() {
    let h = harness();
    h.transport.respond(
        HttpMethod::Post,
        "/api/photobooth/events/create/",
        201,
        json!({ "message": "Queued" }),
    );

    h.events()
        .handle_create_event(&CreateEventForm {
            name: "Later".to_string(),
            qr_base_url: String::new(),
        })
        .await
        .expect("create should work");

    assert!(h.navigator.visited().is_empty());
}

#[tokio::test]
async fn forms_registration_success_opens_event_list() {
    let h = harness();
    h.transport.respond(
        HttpMethod::Post,
        "/api/photobooth/auth/register/",
        201,
        json!({ "message": "User registered successfully", "user_id": 5, "email": "host@example.test" }),
    );

    h.registration()
        .handle_registration(&RegistrationForm {
            email: "host@example.test".to_string(),
            first_name: "Ada".to_string(),
            last_name: String::new(),
            password1: "correct horse".to_string(),
            password2: "correct horse".to_string(),
        })
        .await
        .expect("registration should work");

    let body = h.transport.requests_to("/api/photobooth/auth/register/")[0]
        .json_body()
        .expect("registration body");
    assert_eq!(body["email"], "host@example.test");
    assert_eq!(body["last_name"], "");
    assert_eq!(
        h.navigator.visited(),
        vec!["https://booth.example.test/photobooth/events/".to_string()]
    );
}

#[tokio::test]
async fn forms_registration_surfaces_validation_message_from_server() {
    let h = harness();
    h.transport.respond(
        HttpMethod::Post,
        "/api/photobooth/auth/register/",
        400,
        json!({ "error": "Passwords don't match" }),
    );

    let result = h
        .registration()
        .handle_registration(&RegistrationForm {
            email: "host@example.test".to_string(),
            password1: "a".to_string(),
            password2: "b".to_string(),
            ..RegistrationForm::default()
        })
        .await;

    match result {
        Err(FormError::Api(error)) => assert_eq!(error.status(), Some(400)),
        other => panic!("expected api error, got {other:?}"),
    }
    assert_eq!(h.notifier.errors(), vec!["Passwords don't match".to_string()]);
    assert!(h.navigator.visited().is_empty());
}
