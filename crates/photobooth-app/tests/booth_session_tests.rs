//! Integration tests for the app bootstrap and headless booth sessions.

mod common;

use std::sync::Arc;

use common::scripted_app;
use photobooth_api::HttpMethod;
use photobooth_app::AppError;
use photobooth_capture::{
    CaptureError, ContextSource, NoopObserver, SyntheticCamera,
};
use photobooth_core::{ContextId, ContextKind, GuestDetails};
use photobooth_ui::JoinEventForm;
use serde_json::json;

#[tokio::test]
async fn booth_session_tests_takes_shots_and_releases_camera() {
    let (app, transport, _shell) = scripted_app();
    transport.respond(
        HttpMethod::Get,
        "/api/photobooth/settings/camera/",
        200,
        json!({ "resolution": { "width": 8, "height": 6 }, "fps": 30, "countdown": 0, "quality": 85 }),
    );
    transport.respond(
        HttpMethod::Get,
        "/api/photobooth/events/e1/info/",
        200,
        json!({ "id": "e1", "name": "Party", "photo_count": 2 }),
    );
    transport.respond(
        HttpMethod::Post,
        "/api/photobooth/photos/capture/",
        201,
        json!({ "success": true, "photo_id": "p1" }),
    );
    transport.respond(
        HttpMethod::Post,
        "/api/photobooth/photos/capture/",
        201,
        json!({ "success": true, "photo_id": "p2" }),
    );

    let camera = Arc::new(SyntheticCamera::new());
    let workflow = app.workflow(
        camera.clone(),
        ContextSource::Fetch {
            kind: ContextKind::Event,
            id: ContextId::new("e1"),
        },
        Arc::new(NoopObserver),
    );

    let photos = app
        .run_booth(workflow, &GuestDetails::new("Alice", ""), 2)
        .await
        .expect("booth session should work");

    let ids: Vec<&str> = photos.iter().map(|photo| photo.photo_id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2"]);
    assert_eq!(camera.live_tracks(), 0);
    for upload in transport.requests_to("/api/photobooth/photos/capture/") {
        assert_eq!(upload.header("X-CSRFToken"), Some("tok123"));
    }
}

#[tokio::test]
async fn booth_session_tests_camera_failure_is_reported() {
    let (app, _transport, _shell) = scripted_app();
    let workflow = app.workflow(
        Arc::new(SyntheticCamera::unavailable()),
        ContextSource::Absent,
        Arc::new(NoopObserver),
    );

    let result = app
        .run_booth(workflow, &GuestDetails::default(), 1)
        .await;

    assert!(matches!(
        result,
        Err(AppError::Capture(CaptureError::CameraAccess(_)))
    ));
}

#[tokio::test]
async fn booth_session_tests_managers_share_the_app_client() {
    let (app, transport, shell) = scripted_app();
    transport.respond(
        HttpMethod::Post,
        "/api/photobooth/events/join/",
        200,
        json!({ "message": "Joined", "event_id": 3, "redirect_url": "/photobooth/event/3/booth/" }),
    );

    app.events()
        .handle_join_event(&JoinEventForm {
            code: "qx7p2m".to_string(),
        })
        .await
        .expect("join should work");

    let join = &transport.requests_to("/api/photobooth/events/join/")[0];
    assert_eq!(join.header("X-CSRFToken"), Some("tok123"));
    assert_eq!(
        shell.messages.lock().expect("shell lock").clone(),
        vec!["ok: Joined".to_string()]
    );
    assert_eq!(
        shell.visited.lock().expect("shell lock").clone(),
        vec!["/photobooth/event/3/booth/".to_string()]
    );
}
