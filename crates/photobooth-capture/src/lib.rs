#![warn(missing_docs)]
//! # photobooth-capture
//!
//! ## Purpose
//! Runs the booth screen: acquires the camera, counts down, grabs a still,
//! uploads it and reports the stored photo.
//!
//! ## Responsibilities
//! - Define backend-agnostic camera traits ([`CameraDevice`], [`CameraStream`]).
//! - Provide a deterministic [`SyntheticCamera`] for tests and offline runs and
//!   a [`StillImageCamera`] serving an image file.
//! - Sequence one capture cycle with a re-entrancy guard and a legacy upload
//!   fallback.
//! - Report progress through [`CaptureObserver`] so any front end can render it.
//!
//! ## Data flow
//! Camera stream -> [`photobooth_core::Frame`] -> JPEG data URI ->
//! [`photobooth_api::ApiClient::capture_photo`] (or the legacy endpoint) ->
//! [`PhotoReady`] -> observer.
//!
//! ## Ownership and lifetimes
//! The workflow owns the camera stream. Only [`CaptureWorkflow::teardown`] or
//! dropping the workflow releases it. Captured images live for one cycle and
//! are handed to the observer by reference.
//!
//! ## Error model
//! Camera failures, missing context, concurrent shutter presses and failed
//! uploads are [`CaptureError`] values. Each failure is also reported to the
//! observer as a user-facing message.
//!
//! ## Security and privacy notes
//! Frames and encoded images are kept in memory only and never logged.

mod camera;
mod countdown;
mod observer;
mod workflow;

use photobooth_core::CoreError;
use thiserror::Error;

pub use camera::{
    CameraDevice, CameraError, CameraStream, FacingMode, StillImageCamera, StreamInfo,
    SyntheticCamera, VideoConstraints,
};
pub use countdown::{TICK_INTERVAL, run_countdown};
pub use observer::{CaptureObserver, CaptureState, NoopObserver, PhotoReady};
pub use workflow::{CaptureWorkflow, ContextSource, FLASH_DURATION};

/// Shown when the camera cannot be acquired.
pub const CAMERA_REQUIRED_MESSAGE: &str = "Camera access is required for the photobooth";
/// Shown when the booth has no event or session to attach photos to.
pub const NO_CONTEXT_MESSAGE: &str = "No event data available. Please refresh the page.";
/// Shown when a capture cycle fails after the countdown.
pub const CAPTURE_FAILED_MESSAGE: &str = "Failed to capture photo. Please try again.";
/// Shown when a capture is requested before the camera streams.
pub const NOT_READY_MESSAGE: &str = "Camera is not ready. Please refresh the page.";

/// Capture workflow error type.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The camera could not be opened or never produced a frame.
    #[error("camera access failed: {0}")]
    CameraAccess(CameraError),
    /// No capture context is loaded.
    #[error("no event or session loaded")]
    MissingContext,
    /// A capture cycle is already running.
    #[error("a capture is already in progress")]
    AlreadyCapturing,
    /// The camera is not streaming.
    #[error("camera stream is not ready")]
    NotReady,
    /// The stream failed while grabbing a frame.
    #[error("frame grab failed: {0}")]
    Stream(CameraError),
    /// The frame could not be encoded.
    #[error("frame encoding failed: {0}")]
    Frame(#[from] CoreError),
    /// Both upload paths failed.
    #[error("upload failed: {primary}; legacy fallback failed: {fallback}")]
    Upload {
        /// Failure of the primary endpoint.
        primary: String,
        /// Failure of the legacy endpoint.
        fallback: String,
    },
}

impl CaptureError {
    /// Message suitable for display on the booth screen.
    pub fn user_message(&self) -> &'static str {
        match self {
            CaptureError::CameraAccess(_) => CAMERA_REQUIRED_MESSAGE,
            CaptureError::MissingContext => NO_CONTEXT_MESSAGE,
            CaptureError::NotReady => NOT_READY_MESSAGE,
            CaptureError::AlreadyCapturing
            | CaptureError::Stream(_)
            | CaptureError::Frame(_)
            | CaptureError::Upload { .. } => CAPTURE_FAILED_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_failures_map_to_the_retry_prompt() {
        let error = CaptureError::Upload {
            primary: "boom".to_string(),
            fallback: "Failed to save photo".to_string(),
        };
        assert_eq!(error.user_message(), CAPTURE_FAILED_MESSAGE);
        assert!(error.to_string().contains("Failed to save photo"));
        assert_eq!(
            CaptureError::CameraAccess(CameraError::NoDevice("none".to_string())).user_message(),
            CAMERA_REQUIRED_MESSAGE
        );
    }
}
