#![warn(missing_docs)]
//! # photobooth-api
//!
//! ## Purpose
//! Single point of contact with the photobooth REST backend.
//!
//! ## Responsibilities
//! - Resolve endpoints against the configured origin and API base path.
//! - Attach the anti-forgery token read from the `csrftoken` cookie.
//! - Serialize JSON bodies and normalize non-2xx responses into [`ApiError`].
//! - Expose one typed method per backend operation, plus the legacy capture
//!   endpoint and the download/QR link scheme.
//!
//! ## Data flow
//! Caller -> [`ApiClient::call`] builds an [`HttpRequest`] -> [`HttpTransport`]
//! returns an [`HttpResponse`] -> body decoded into the caller's type.
//!
//! ## Ownership and lifetimes
//! The client owns its configuration and shares its transport through
//! `Arc<dyn HttpTransport>`, so one client can be shared by the capture
//! workflow and every form handler.
//!
//! ## Error model
//! Transport failures are [`ApiError::Network`], server rejections are
//! [`ApiError::Api`] whose display text is exactly the user-facing message,
//! and unparseable success bodies are [`ApiError::Decode`].
//!
//! ## Security and privacy notes
//! Cookie and CSRF values are never logged. Cookies are only forwarded to the
//! configured origin.
//!
//! ## Example
//! ```rust
//! use photobooth_api::csrf_token_from_cookies;
//!
//! let token = csrf_token_from_cookies("sessionid=abc; csrftoken=t%2B1");
//! assert_eq!(token.as_deref(), Some("t+1"));
//! ```

mod models;
mod transport;

use std::sync::Arc;
use std::time::Duration;

use photobooth_core::{CameraSettings, ContextId, PhotoId, UploadResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use url::Url;

pub use models::{
    CaptureRequest, CreatedEvent, Event, EventPatch, GalleryPage, JoinRequest, JoinResponse,
    LegacyCaptureRequest, NewEvent, Photo, PhotoMetadata, Registration, RegistrationResponse,
};
pub use transport::{
    CredentialsPolicy, HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport,
    ScriptedTransport, same_origin,
};

/// Default mount point of the REST API.
pub const DEFAULT_API_BASE_PATH: &str = "/api/photobooth/";
/// Default mount point of the server-rendered pages and legacy endpoints.
pub const DEFAULT_LEGACY_BASE_PATH: &str = "/photobooth/";
/// Cookie holding the anti-forgery token.
pub const CSRF_COOKIE_NAME: &str = "csrftoken";
/// Header carrying the anti-forgery token.
pub const CSRF_HEADER_NAME: &str = "X-CSRFToken";

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Scheme, host and port of the backend, e.g. `https://booth.example.org`.
    pub origin: String,
    /// Path prefix of the REST API.
    pub api_base_path: String,
    /// Path prefix of pages, downloads, QR images and legacy endpoints.
    pub legacy_base_path: String,
    /// Raw `Cookie` header of the browser session, if any.
    pub cookies: Option<String>,
}

impl ApiConfig {
    /// Creates a config with default base paths and no cookies.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            api_base_path: DEFAULT_API_BASE_PATH.to_string(),
            legacy_base_path: DEFAULT_LEGACY_BASE_PATH.to_string(),
            cookies: None,
        }
    }

    /// Sets the session cookie header.
    pub fn with_cookies(mut self, cookies: impl Into<String>) -> Self {
        self.cookies = Some(cookies.into());
        self
    }
}

/// Request options merged over the client's defaults by [`ApiClient::call`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Headers overriding the defaults by case-insensitive name.
    pub headers: Vec<(String, String)>,
    /// JSON body.
    pub body: Option<Value>,
}

impl RequestOptions {
    /// `GET` without body.
    pub fn get() -> Self {
        Self::default()
    }

    /// `POST` with a JSON body.
    pub fn post(body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            body: Some(body),
            ..Self::default()
        }
    }

    /// `PATCH` with a JSON body.
    pub fn patch(body: Value) -> Self {
        Self {
            method: HttpMethod::Patch,
            body: Some(body),
            ..Self::default()
        }
    }

    /// `DELETE` without body.
    pub fn delete() -> Self {
        Self {
            method: HttpMethod::Delete,
            ..Self::default()
        }
    }

    /// Adds or replaces one header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Extracts and percent-decodes the `csrftoken` value from a cookie header.
pub fn csrf_token_from_cookies(cookies: &str) -> Option<String> {
    let prefix = format!("{CSRF_COOKIE_NAME}=");
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(prefix.as_str()))
        .map(percent_decode)
}

fn percent_decode(raw: &str) -> String {
    url::form_urlencoded::parse(format!("v={}", raw.replace('+', "%2B")).as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
        .unwrap_or_else(|| raw.to_string())
}

/// Client for the photobooth REST API.
#[derive(Clone)]
pub struct ApiClient {
    api_base: Url,
    legacy_base: Url,
    csrf_token: Option<String>,
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    /// Creates a client over an explicit transport.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidConfig`] when the origin is not an
    /// `http`/`https` URL or a base path does not resolve against it.
    pub fn new(config: ApiConfig, transport: Arc<dyn HttpTransport>) -> Result<Self, ApiError> {
        let origin = parse_origin(&config.origin)?;
        let api_base = resolve_base(&origin, &config.api_base_path)?;
        let legacy_base = resolve_base(&origin, &config.legacy_base_path)?;
        let csrf_token = config.cookies.as_deref().and_then(csrf_token_from_cookies);

        Ok(Self {
            api_base,
            legacy_base,
            csrf_token,
            transport,
        })
    }

    /// Creates a client using [`ReqwestTransport`].
    ///
    /// # Errors
    /// Same as [`ApiClient::new`], plus client construction failures.
    pub fn with_reqwest(config: ApiConfig, timeout: Duration) -> Result<Self, ApiError> {
        let origin = parse_origin(&config.origin)?;
        let transport = ReqwestTransport::new(origin, config.cookies.clone(), timeout)?;
        Self::new(config, Arc::new(transport))
    }

    /// Returns the anti-forgery token attached to requests, if any.
    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// Returns the resolved REST API base URL.
    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Calls `endpoint` (relative to the API base) and decodes the JSON body.
    ///
    /// # Errors
    /// - [`ApiError::Network`] when the transport fails.
    /// - [`ApiError::Api`] for non-2xx statuses, carrying the body's `error`
    ///   field or `HTTP error! status: <code>`.
    /// - [`ApiError::Decode`] when a 2xx body is not valid JSON for `T`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let url = join(&self.api_base, endpoint)?;
        self.execute(url, options, |status| format!("HTTP error! status: {status}"))
            .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        url: Url,
        options: RequestOptions,
        fallback_message: impl FnOnce(u16) -> String,
    ) -> Result<T, ApiError> {
        let request = self.build_request(url, options)?;
        log::debug!("{} {}", request.method.as_str(), request.url);

        let response = self.transport.send(request).await?;
        decode_response(response, fallback_message)
    }

    fn build_request(&self, url: Url, options: RequestOptions) -> Result<HttpRequest, ApiError> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = &self.csrf_token {
            headers.push((CSRF_HEADER_NAME.to_string(), token.clone()));
        }
        for (name, value) in options.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
            headers.push((name, value));
        }

        let body = options
            .body
            .map(|body| serde_json::to_vec(&body))
            .transpose()
            .map_err(|error| ApiError::Encode(error.to_string()))?;

        Ok(HttpRequest {
            method: options.method,
            url,
            headers,
            body,
            credentials: CredentialsPolicy::SameOrigin,
        })
    }

    /// Registers a new account.
    pub async fn register_user(
        &self,
        registration: &Registration,
    ) -> Result<RegistrationResponse, ApiError> {
        self.call("auth/register/", RequestOptions::post(to_json(registration)?))
            .await
    }

    /// Lists events owned by the signed-in user.
    pub async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        self.call("events/", RequestOptions::get()).await
    }

    /// Creates an event.
    pub async fn create_event(&self, event: &NewEvent) -> Result<CreatedEvent, ApiError> {
        self.call("events/create/", RequestOptions::post(to_json(event)?))
            .await
    }

    /// Fetches one owned event.
    pub async fn get_event(&self, event_id: &ContextId) -> Result<Event, ApiError> {
        self.call(&format!("events/{event_id}/"), RequestOptions::get())
            .await
    }

    /// Applies a partial update to an owned event.
    pub async fn update_event(
        &self,
        event_id: &ContextId,
        patch: &EventPatch,
    ) -> Result<Event, ApiError> {
        self.call(
            &format!("events/{event_id}/"),
            RequestOptions::patch(to_json(patch)?),
        )
        .await
    }

    /// Deletes an owned event.
    pub async fn delete_event(&self, event_id: &ContextId) -> Result<(), ApiError> {
        let _: Value = self
            .call(&format!("events/{event_id}/"), RequestOptions::delete())
            .await?;
        Ok(())
    }

    /// Joins an event by code. The code is sent as given.
    pub async fn join_event(&self, code: &str) -> Result<JoinResponse, ApiError> {
        let request = JoinRequest {
            code: code.to_string(),
        };
        self.call("events/join/", RequestOptions::post(to_json(&request)?))
            .await
    }

    /// Fetches one page of an event gallery (pages start at 1).
    pub async fn gallery_page(
        &self,
        event_id: &ContextId,
        page: u32,
    ) -> Result<GalleryPage, ApiError> {
        self.call(
            &format!("events/{event_id}/gallery/?page={page}"),
            RequestOptions::get(),
        )
        .await
    }

    /// Fetches public event information, including the photo count.
    pub async fn event_info(&self, event_id: &ContextId) -> Result<Event, ApiError> {
        self.call(&format!("events/{event_id}/info/"), RequestOptions::get())
            .await
    }

    /// Uploads a captured photo.
    pub async fn capture_photo(&self, request: &CaptureRequest) -> Result<UploadResult, ApiError> {
        self.call("photos/capture/", RequestOptions::post(to_json(request)?))
            .await
    }

    /// Fetches one photo.
    pub async fn get_photo(&self, photo_id: &PhotoId) -> Result<Photo, ApiError> {
        self.call(&format!("photos/{photo_id}/"), RequestOptions::get())
            .await
    }

    /// Updates guest metadata of a photo.
    pub async fn update_photo_metadata(
        &self,
        photo_id: &PhotoId,
        metadata: &PhotoMetadata,
    ) -> Result<Photo, ApiError> {
        self.call(
            &format!("photos/{photo_id}/"),
            RequestOptions::patch(to_json(metadata)?),
        )
        .await
    }

    /// Fetches booth camera settings.
    pub async fn camera_settings(&self) -> Result<CameraSettings, ApiError> {
        self.call("settings/camera/", RequestOptions::get()).await
    }

    /// Uploads a photo through the legacy capture endpoint.
    ///
    /// # Errors
    /// Non-2xx responses carry the body's `error` field or `Failed to save photo`.
    pub async fn legacy_capture(
        &self,
        request: &LegacyCaptureRequest,
    ) -> Result<UploadResult, ApiError> {
        let url = join(&self.legacy_base, "api/capture/")?;
        self.execute(url, RequestOptions::post(to_json(request)?), |_| {
            "Failed to save photo".to_string()
        })
        .await
    }

    /// Download link of a photo.
    pub fn download_url(&self, photo_id: &PhotoId) -> String {
        self.legacy_link(&format!("download/{photo_id}/"))
    }

    /// QR image link pointing at a photo download.
    pub fn photo_qr_url(&self, photo_id: &PhotoId) -> String {
        self.legacy_link(&format!("qr/photo/{photo_id}/"))
    }

    /// QR image link pointing at an event gallery.
    pub fn event_qr_url(&self, event_id: &ContextId) -> String {
        self.legacy_link(&format!("qr/event/{event_id}/"))
    }

    /// Booth page of an event.
    pub fn booth_url(&self, event_id: &ContextId) -> String {
        self.legacy_link(&format!("event/{event_id}/booth/"))
    }

    /// Owner detail page of an event.
    pub fn event_page_url(&self, event_id: &ContextId) -> String {
        self.legacy_link(&format!("events/{event_id}/"))
    }

    /// Owner event list page.
    pub fn events_page_url(&self) -> String {
        self.legacy_link("events/")
    }

    /// REST download link of a photo.
    pub fn api_download_url(&self, photo_id: &PhotoId) -> String {
        format!("{}photos/{photo_id}/download/", self.api_base)
    }

    fn legacy_link(&self, path: &str) -> String {
        format!("{}{path}", self.legacy_base)
    }
}

fn parse_origin(origin: &str) -> Result<Url, ApiError> {
    let parsed = Url::parse(origin)
        .map_err(|error| ApiError::InvalidConfig(format!("invalid origin: {error}")))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ApiError::InvalidConfig(
            "origin must use http or https".to_string(),
        ));
    }
    if parsed.host_str().is_none() {
        return Err(ApiError::InvalidConfig("origin has no host".to_string()));
    }
    if parsed.path() != "/" || parsed.query().is_some() {
        return Err(ApiError::InvalidConfig(
            "origin must not carry a path or query".to_string(),
        ));
    }

    Ok(parsed)
}

fn resolve_base(origin: &Url, path: &str) -> Result<Url, ApiError> {
    let mut normalized = format!("/{}", path.trim_matches('/'));
    if normalized != "/" {
        normalized.push('/');
    }
    join(origin, &normalized)
}

fn join(base: &Url, endpoint: &str) -> Result<Url, ApiError> {
    base.join(endpoint)
        .map_err(|error| ApiError::InvalidConfig(format!("invalid endpoint {endpoint}: {error}")))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|error| ApiError::Encode(error.to_string()))
}

fn decode_response<T: DeserializeOwned>(
    response: HttpResponse,
    fallback_message: impl FnOnce(u16) -> String,
) -> Result<T, ApiError> {
    let parsed: Result<Value, _> = if response.body.iter().all(u8::is_ascii_whitespace) {
        Ok(Value::Null)
    } else {
        serde_json::from_slice(&response.body)
    };

    if !response.is_success() {
        let message = parsed
            .ok()
            .as_ref()
            .and_then(|body| body.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| fallback_message(response.status));
        return Err(ApiError::Api {
            status: response.status,
            message,
        });
    }

    let body = parsed.map_err(|error| ApiError::Decode(error.to_string()))?;
    serde_json::from_value(body).map_err(|error| ApiError::Decode(error.to_string()))
}

/// Errors produced by the API client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server error text or generic status message.
        message: String,
    },
    /// A 2xx body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),
    /// A request body could not be encoded.
    #[error("invalid request body: {0}")]
    Encode(String),
    /// Origin or base paths are unusable.
    #[error("invalid api configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// HTTP status of a server rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
