//! Request and response payloads of the photobooth REST API.

use photobooth_core::{CapturedPhoto, CaptureContext, ContextId, ContextKind, PhotoId, UserId};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Account registration form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Login email.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Password.
    pub password1: String,
    /// Password confirmation.
    pub password2: String,
}

/// Response of `auth/register/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    /// Confirmation text.
    #[serde(default)]
    pub message: String,
    /// New account id.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Registered email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Event as serialized by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event id.
    pub id: ContextId,
    /// Event name.
    pub name: String,
    /// Join code.
    #[serde(default)]
    pub code: Option<String>,
    /// Event date.
    #[serde(default)]
    pub date: Option<String>,
    /// Whether guests may still join.
    #[serde(default)]
    pub is_active: bool,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Owner display string.
    #[serde(default)]
    pub created_by: Option<String>,
    /// Base URL encoded into gallery QR codes.
    #[serde(default)]
    pub qr_base_url: Option<String>,
    /// Number of photos taken.
    #[serde(default)]
    pub photo_count: u64,
}

impl Event {
    /// Projects the event into a capture context.
    pub fn to_context(&self) -> CaptureContext {
        CaptureContext::event(self.id.clone(), self.name.clone(), self.photo_count)
    }
}

/// Payload of `events/create/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    /// Event name.
    pub name: String,
    /// Base URL for QR codes; empty for the server default.
    pub qr_base_url: String,
}

/// Response of `events/create/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedEvent {
    /// Confirmation text including the join code.
    #[serde(default)]
    pub message: String,
    /// The created event.
    #[serde(default)]
    pub event: Option<Event>,
}

/// Partial update for `PATCH events/{id}/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPatch {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New event date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Open or close the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// New QR base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_base_url: Option<String>,
}

/// Payload of `events/join/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    /// Upper-cased join code.
    pub code: String,
}

/// Response of `events/join/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinResponse {
    /// Confirmation text.
    #[serde(default)]
    pub message: String,
    /// Joined event.
    #[serde(default)]
    pub event_id: Option<ContextId>,
    /// Booth page to continue to.
    #[serde(default)]
    pub redirect_url: Option<String>,
}

/// Photo as serialized by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Photo id.
    pub id: PhotoId,
    /// Owning event display string.
    #[serde(default)]
    pub session: Option<String>,
    /// Image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Thumbnail URL.
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Capture timestamp.
    #[serde(default)]
    pub taken_at: Option<String>,
    /// Guest name.
    #[serde(default)]
    pub guest_name: String,
    /// Guest email.
    #[serde(default)]
    pub guest_email: String,
    /// Whether server-side processing finished.
    #[serde(default)]
    pub is_processed: bool,
    /// Relative download URL.
    #[serde(default)]
    pub download_url: Option<String>,
}

/// Partial update for `PATCH photos/{id}/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoMetadata {
    /// New guest name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
    /// New guest email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_email: Option<String>,
}

/// One page of an event gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryPage {
    /// Event the gallery belongs to.
    pub event: Event,
    /// Photos on this page, newest first.
    #[serde(default)]
    pub photos: Vec<Photo>,
    /// Whether a following page exists.
    #[serde(default)]
    pub has_next: bool,
    /// Whether a preceding page exists.
    #[serde(default)]
    pub has_previous: bool,
    /// One-based page number.
    #[serde(default)]
    pub current_page: u32,
    /// Total photos in the event.
    #[serde(default)]
    pub total_photos: u64,
}

/// Payload of `photos/capture/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRequest {
    /// Target event.
    pub event_id: ContextId,
    /// JPEG data URI.
    pub image: String,
    /// Guest name, possibly empty.
    pub guest_name: String,
    /// Guest email, possibly empty.
    pub guest_email: String,
}

impl CaptureRequest {
    /// Builds the upload payload for `photo` within `context_id`.
    pub fn new(context_id: &ContextId, photo: &CapturedPhoto) -> Self {
        Self {
            event_id: context_id.clone(),
            image: photo.image.clone(),
            guest_name: photo.guest.name.clone(),
            guest_email: photo.guest.email.clone(),
        }
    }
}

/// Payload of the legacy `/photobooth/api/capture/` endpoint.
///
/// Serializes the context id under `event_id` or `session_id` depending on
/// [`ContextKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyCaptureRequest {
    /// Context flavor selecting the id key.
    pub kind: ContextKind,
    /// Context id.
    pub id: ContextId,
    /// JPEG data URI.
    pub image: String,
    /// Guest name, possibly empty.
    pub guest_name: String,
    /// Guest email, possibly empty.
    pub guest_email: String,
}

impl LegacyCaptureRequest {
    /// Builds the legacy payload for `photo` within `context`.
    pub fn new(context: &CaptureContext, photo: &CapturedPhoto) -> Self {
        Self {
            kind: context.kind,
            id: context.id.clone(),
            image: photo.image.clone(),
            guest_name: photo.guest.name.clone(),
            guest_email: photo.guest.email.clone(),
        }
    }
}

impl Serialize for LegacyCaptureRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("image", &self.image)?;
        map.serialize_entry(self.kind.legacy_id_key(), &self.id)?;
        map.serialize_entry("guest_name", &self.guest_name)?;
        map.serialize_entry("guest_email", &self.guest_email)?;
        map.end()
    }
}
