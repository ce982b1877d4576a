#![warn(missing_docs)]
//! # photobooth-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `photobooth` workspace.
//!
//! ## Responsibilities
//! - Represent the capture context (event or active session) photos belong to.
//! - Represent camera settings with the fallback defaults used when the
//!   settings endpoint is unavailable.
//! - Represent captured frames and encode them as JPEG data URIs.
//! - Represent upload results returned by the capture endpoints.
//!
//! ## Data flow
//! Camera backends emit [`Frame`] values -> [`encode_jpeg_data_uri`] turns a
//! frame into a [`CapturedPhoto`] payload -> the API layer uploads it and
//! decodes an [`UploadResult`].
//!
//! ## Ownership and lifetimes
//! Frames and photos own their buffers (`Vec<u8>` / `String`) so they can
//! move across await points without borrowing from camera internals.
//!
//! ## Error model
//! Shape and encoding failures return [`CoreError`].
//!
//! ## Example
//! ```rust
//! use photobooth_core::{CameraSettings, Frame, encode_jpeg_data_uri};
//!
//! let settings = CameraSettings::default();
//! let frame = Frame::new(2, 2, 0, vec![255; 16]).unwrap();
//! let uri = encode_jpeg_data_uri(&frame, settings.quality).unwrap();
//! assert!(uri.starts_with("data:image/jpeg;base64,"));
//! ```

use std::fmt;

use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Prefix of every JPEG data URI produced by [`encode_jpeg_data_uri`].
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Default capture width when settings cannot be loaded.
pub const DEFAULT_WIDTH: u32 = 1920;
/// Default capture height when settings cannot be loaded.
pub const DEFAULT_HEIGHT: u32 = 1080;
/// Default frame rate when settings cannot be loaded.
pub const DEFAULT_FPS: u32 = 30;
/// Default countdown length in seconds.
pub const DEFAULT_COUNTDOWN_SECS: u32 = 3;
/// Default JPEG quality (0-100).
pub const DEFAULT_QUALITY: u8 = 95;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a server-issued identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
            }
        }
    };
}

/// Server identifiers arrive as UUID strings from the REST API and as
/// integers from older endpoints.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

opaque_id!(
    /// Opaque identifier of an event or active session.
    ContextId
);

opaque_id!(
    /// Opaque server-issued photo identifier.
    PhotoId
);

opaque_id!(
    /// Opaque identifier of a registered user account.
    UserId
);

/// Kind of grouping a capture context refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    /// Event joined by code; photos attach to the event.
    #[default]
    Event,
    /// Fixed active session configured on the server.
    Session,
}

impl ContextKind {
    /// JSON key used for the context id in legacy capture payloads.
    pub fn legacy_id_key(self) -> &'static str {
        match self {
            ContextKind::Event => "event_id",
            ContextKind::Session => "session_id",
        }
    }
}

/// Event or session that captured photos are attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureContext {
    /// Event or session flavor.
    pub kind: ContextKind,
    /// Server identifier.
    pub id: ContextId,
    /// Display name.
    pub name: String,
    /// Photos captured so far, as last reported by the server.
    pub photo_count: u64,
}

impl CaptureContext {
    /// Creates an event-backed context.
    pub fn event(id: impl Into<ContextId>, name: impl Into<String>, photo_count: u64) -> Self {
        Self {
            kind: ContextKind::Event,
            id: id.into(),
            name: name.into(),
            photo_count,
        }
    }

    /// Creates a session-backed context.
    pub fn session(id: impl Into<ContextId>, name: impl Into<String>, photo_count: u64) -> Self {
        Self {
            kind: ContextKind::Session,
            id: id.into(),
            name: name.into(),
            photo_count,
        }
    }
}

/// Requested capture resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Camera settings served by the settings endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Ideal capture resolution.
    pub resolution: Resolution,
    /// Ideal frame rate.
    pub fps: u32,
    /// Countdown length in seconds.
    pub countdown: u32,
    /// JPEG quality, 0-100.
    pub quality: u8,
    /// Optional welcome text shown on the booth page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
    /// Optional usage instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Whether the booth page shows recent photos.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_gallery_preview: Option<bool>,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            resolution: Resolution {
                width: DEFAULT_WIDTH,
                height: DEFAULT_HEIGHT,
            },
            fps: DEFAULT_FPS,
            countdown: DEFAULT_COUNTDOWN_SECS,
            quality: DEFAULT_QUALITY,
            welcome_message: None,
            instructions: None,
            show_gallery_preview: None,
        }
    }
}

/// One still frame grabbed from a camera stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Capture time in Unix epoch milliseconds.
    pub captured_at_ms: u64,
    /// Raw RGBA pixel buffer (`width * height * 4` bytes).
    pub rgba: Vec<u8>,
}

impl Frame {
    /// Constructs a validated frame.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyFrame`] for zero dimensions and
    /// [`CoreError::InvalidFrameShape`] when the buffer length is not exactly
    /// `width * height * 4`.
    pub fn new(
        width: u32,
        height: u32,
        captured_at_ms: u64,
        rgba: Vec<u8>,
    ) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::EmptyFrame);
        }

        let expected_len = required_rgba_len(width, height)?;
        if rgba.len() != expected_len {
            return Err(CoreError::InvalidFrameShape {
                expected: expected_len,
                actual: rgba.len(),
            });
        }

        Ok(Self {
            width,
            height,
            captured_at_ms,
            rgba,
        })
    }
}

/// Encodes a frame as a `data:image/jpeg;base64,...` URI.
///
/// `quality` goes to the JPEG encoder unchanged; the encoder clamps it into
/// its supported range.
///
/// # Errors
/// Returns [`CoreError::Encode`] when JPEG encoding fails.
pub fn encode_jpeg_data_uri(frame: &Frame, quality: u8) -> Result<String, CoreError> {
    let rgb = rgba_to_rgb(&frame.rgba);
    let mut jpeg_bytes = Vec::new();

    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg_bytes, quality)
        .encode(
            &rgb,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|error| CoreError::Encode(error.to_string()))?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(&jpeg_bytes);
    Ok(format!("{JPEG_DATA_URI_PREFIX}{encoded}"))
}

/// Decodes the bytes behind a `data:<mime>;base64,` URI.
///
/// # Errors
/// Returns [`CoreError::InvalidDataUri`] when the prefix or payload is malformed.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, CoreError> {
    let (header, payload) = uri
        .split_once(";base64,")
        .ok_or_else(|| CoreError::InvalidDataUri("missing ;base64, separator".to_string()))?;
    if !header.starts_with("data:image/") {
        return Err(CoreError::InvalidDataUri(
            "not an image data uri".to_string(),
        ));
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|error| CoreError::InvalidDataUri(error.to_string()))
}

fn rgba_to_rgb(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for pixel in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&pixel[..3]);
    }
    rgb
}

/// Optional guest details typed into the booth form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestDetails {
    /// Guest display name.
    pub name: String,
    /// Guest email address.
    pub email: String,
}

impl GuestDetails {
    /// Builds guest details from raw field values, trimming whitespace.
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
        }
    }
}

/// A captured still waiting for upload.
///
/// Exists only for the duration of one capture cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    /// JPEG data URI.
    pub image: String,
    /// Guest details attached to the upload.
    pub guest: GuestDetails,
}

/// Response of the capture endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Whether the server stored the photo.
    #[serde(default)]
    pub success: bool,
    /// Server-issued photo id.
    #[serde(default)]
    pub photo_id: Option<PhotoId>,
    /// Relative download URL.
    #[serde(default)]
    pub download_url: Option<String>,
    /// Human-readable server message.
    #[serde(default)]
    pub message: Option<String>,
    /// Server error text.
    #[serde(default)]
    pub error: Option<String>,
}

/// Error type for core validation and encoding failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Frame buffer shape does not match declared geometry.
    #[error("invalid frame shape: expected {expected} bytes, got {actual}")]
    InvalidFrameShape {
        /// Expected RGBA byte count.
        expected: usize,
        /// Actual RGBA byte count.
        actual: usize,
    },
    /// Frame has zero width or height.
    #[error("frame has no pixels")]
    EmptyFrame,
    /// Frame dimensions overflow addressable memory.
    #[error("frame dimensions overflow")]
    DimensionsOverflow,
    /// JPEG encoding failed.
    #[error("jpeg encoding failed: {0}")]
    Encode(String),
    /// Data URI could not be decoded.
    #[error("invalid data uri: {0}")]
    InvalidDataUri(String),
}

fn required_rgba_len(width: u32, height: u32) -> Result<usize, CoreError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or(CoreError::DimensionsOverflow)
}
