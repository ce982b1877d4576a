#![warn(missing_docs)]
//! # photobooth-app
//!
//! ## Purpose
//! Wires configuration, the API client, the capture workflow and the form
//! managers into one runnable photobooth client.
//!
//! ## Responsibilities
//! - Load [`BoothConfig`] from TOML, environment and command-line overrides.
//! - Build exactly one [`ApiClient`] and share it with every component.
//! - Run headless booth sessions for the command-line front end.
//! - Keep secrets out of log output.
//!
//! ## Data flow
//! Config file -> env overrides -> CLI overrides -> [`BoothApp`] ->
//! managers and [`CaptureWorkflow`] -> console front end.
//!
//! ## Ownership and lifetimes
//! [`BoothApp`] owns the shared client behind `Arc`; workflows and managers
//! hold clones of that `Arc` and never outlive the process.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`].
//!
//! ## Security and privacy notes
//! - Session cookies come from config or `PHOTOBOOTH_COOKIES` and are only
//!   sent to the configured origin.
//! - [`redact_sensitive`] strips cookie, token and password values before
//!   anything is logged.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use photobooth_api::{
    ApiClient, ApiConfig, ApiError, DEFAULT_API_BASE_PATH, DEFAULT_LEGACY_BASE_PATH,
    HttpTransport,
};
use photobooth_capture::{
    CameraDevice, CaptureError, CaptureObserver, CaptureWorkflow, ContextSource, PhotoReady,
};
use photobooth_core::{ContextId, ContextKind, GuestDetails};
use photobooth_ui::{EventManager, FormError, Navigator, Notifier, RegistrationManager};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("PHOTOBOOTH_VERSION");
/// Backend used when nothing else is configured.
pub const DEFAULT_ORIGIN: &str = "http://localhost:8000";
/// Request timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Client configuration.
///
/// Precedence, lowest first: defaults, TOML file, `PHOTOBOOTH_*` environment
/// variables, command-line flags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoothConfig {
    /// Backend origin.
    pub origin: String,
    /// REST API mount path.
    pub api_base_path: String,
    /// Page and legacy endpoint mount path.
    pub legacy_base_path: String,
    /// Raw `Cookie` header of a signed-in browser session.
    pub cookies: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            api_base_path: DEFAULT_API_BASE_PATH.to_string(),
            legacy_base_path: DEFAULT_LEGACY_BASE_PATH.to_string(),
            cookies: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl BoothConfig {
    /// Parses a TOML document; missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] for malformed TOML or unknown keys.
    pub fn from_toml_str(raw: &str) -> Result<Self, AppError> {
        toml::from_str(raw).map_err(|error| AppError::Config(format!("invalid config: {error}")))
    }

    /// Loads `path` when given, defaults otherwise.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|error| {
            AppError::Config(format!("failed to read {}: {error}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Applies `PHOTOBOOTH_*` overrides read through `lookup`.
    ///
    /// Blank values are ignored.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when `PHOTOBOOTH_TIMEOUT_SECS` is not a
    /// positive integer.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), AppError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(origin) = read("PHOTOBOOTH_ORIGIN") {
            self.origin = origin.trim().to_string();
        }
        if let Some(base) = read("PHOTOBOOTH_API_BASE") {
            self.api_base_path = base.trim().to_string();
        }
        if let Some(base) = read("PHOTOBOOTH_LEGACY_BASE") {
            self.legacy_base_path = base.trim().to_string();
        }
        if let Some(cookies) = read("PHOTOBOOTH_COOKIES") {
            self.cookies = Some(cookies);
        }
        if let Some(timeout) = read("PHOTOBOOTH_TIMEOUT_SECS") {
            self.timeout_secs = match timeout.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(AppError::Config(format!(
                        "PHOTOBOOTH_TIMEOUT_SECS must be a positive integer, got {timeout:?}"
                    )));
                }
            };
        }
        Ok(())
    }

    /// Applies overrides from the process environment.
    ///
    /// # Errors
    /// See [`BoothConfig::apply_env`].
    pub fn apply_process_env(&mut self) -> Result<(), AppError> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Checks the origin before any client is built.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] for unparseable or non-HTTP origins and a
    /// zero timeout.
    pub fn validate(&self) -> Result<(), AppError> {
        let origin = Url::parse(&self.origin)
            .map_err(|error| AppError::Config(format!("invalid origin {:?}: {error}", self.origin)))?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "origin must use http or https, got {}",
                origin.scheme()
            )));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::Config("timeout_secs must be positive".to_string()));
        }
        if self.cookies.is_some() && !is_https_origin(&self.origin) {
            log::warn!("session cookies configured for a plain-http origin");
        }
        Ok(())
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Projects into API client settings.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            origin: self.origin.clone(),
            api_base_path: self.api_base_path.clone(),
            legacy_base_path: self.legacy_base_path.clone(),
            cookies: self.cookies.clone(),
        }
    }

    /// One-line, log-safe description.
    pub fn describe(&self) -> String {
        let cookies = self.cookies.as_deref().unwrap_or("");
        redact_sensitive(&format!(
            "origin={} api={} legacy={} timeout={}s cookie={cookies}",
            self.origin, self.api_base_path, self.legacy_base_path, self.timeout_secs
        ))
    }
}

/// Returns `true` when `origin` uses HTTPS.
pub fn is_https_origin(origin: &str) -> bool {
    Url::parse(origin)
        .map(|url| url.scheme() == "https")
        .unwrap_or(false)
}

/// Redacts cookie, token and password values in log-safe output.
///
/// Every `key=value` or `key: value` pair whose key contains a sensitive
/// marker has its value replaced up to the next `;`, `&`, `,` or whitespace.
pub fn redact_sensitive(input: &str) -> String {
    const MARKERS: [&str; 6] = ["password", "token", "cookie", "sessionid", "csrf", "authorization"];

    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(split) = rest.find(['=', ':']) {
        let (head, tail) = rest.split_at(split);
        let key_start = head
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace() || matches!(c, ';' | '&' | ',' | '?'))
            .map_or(0, |(index, c)| index + c.len_utf8());
        let key = head[key_start..].to_ascii_lowercase();
        output.push_str(head);
        output.push_str(&tail[..1]);
        rest = &tail[1..];

        if MARKERS.iter().any(|marker| key.contains(marker)) {
            let trimmed = rest.trim_start();
            output.push_str(&rest[..rest.len() - trimmed.len()]);
            let value_end = trimmed
                .find(|c: char| c.is_whitespace() || matches!(c, ';' | '&' | ','))
                .unwrap_or(trimmed.len());
            // Keep an auth scheme such as "Bearer" but hide what follows it.
            let is_scheme = trimmed[..value_end].eq_ignore_ascii_case("bearer")
                && trimmed[value_end..].starts_with(' ');
            let (scheme, remainder) = if is_scheme {
                let after = trimmed[value_end..].trim_start();
                let secret_end = after
                    .find(|c: char| c.is_whitespace() || matches!(c, ';' | '&' | ','))
                    .unwrap_or(after.len());
                (&trimmed[..value_end + 1], &after[secret_end..])
            } else {
                ("", &trimmed[value_end..])
            };
            output.push_str(scheme);
            output.push_str("<redacted>");
            rest = remainder;
        }
    }
    output.push_str(rest);
    output
}

/// Builds a context source from the booth command's flags.
///
/// # Errors
/// Returns [`AppError::Config`] when both or neither of `event` and `session`
/// are given.
pub fn context_source_for(
    event: Option<&str>,
    session: Option<&str>,
) -> Result<ContextSource, AppError> {
    match (event, session) {
        (Some(id), None) => Ok(ContextSource::Fetch {
            kind: ContextKind::Event,
            id: ContextId::new(id),
        }),
        (None, Some(id)) => Ok(ContextSource::Fetch {
            kind: ContextKind::Session,
            id: ContextId::new(id),
        }),
        (None, None) => Ok(ContextSource::Absent),
        (Some(_), Some(_)) => Err(AppError::Config(
            "pass either an event or a session, not both".to_string(),
        )),
    }
}

/// Application root owning the shared client and the form managers.
pub struct BoothApp {
    api: Arc<ApiClient>,
    events: EventManager,
    registration: RegistrationManager,
}

impl BoothApp {
    /// Builds the app over the production `reqwest` transport.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] or [`AppError::Api`] when the configuration
    /// is invalid or the HTTP client cannot be built.
    pub fn connect(
        config: &BoothConfig,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, AppError> {
        config.validate()?;
        log::info!("connecting: {}", config.describe());
        let api = ApiClient::with_reqwest(config.api_config(), config.timeout())?;
        Ok(Self::from_client(Arc::new(api), notifier, navigator))
    }

    /// Builds the app over a caller-provided transport.
    ///
    /// # Errors
    /// Same as [`BoothApp::connect`].
    pub fn with_transport(
        config: &BoothConfig,
        transport: Arc<dyn HttpTransport>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let api = ApiClient::new(config.api_config(), transport)?;
        Ok(Self::from_client(Arc::new(api), notifier, navigator))
    }

    fn from_client(
        api: Arc<ApiClient>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            events: EventManager::new(api.clone(), notifier.clone(), navigator.clone()),
            registration: RegistrationManager::new(api.clone(), notifier, navigator),
            api,
        }
    }

    /// Shared API client.
    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    /// Event creation and join handler.
    pub fn events(&self) -> &EventManager {
        &self.events
    }

    /// Registration handler.
    pub fn registration(&self) -> &RegistrationManager {
        &self.registration
    }

    /// Creates a capture workflow sharing this app's client.
    pub fn workflow(
        &self,
        camera: Arc<dyn CameraDevice>,
        source: ContextSource,
        observer: Arc<dyn CaptureObserver>,
    ) -> CaptureWorkflow {
        CaptureWorkflow::new(self.api.clone(), camera, source).with_observer(observer)
    }

    /// Runs a headless booth: initialize, take `shots` photos, tear down.
    ///
    /// The camera is released even when a shot fails.
    ///
    /// # Errors
    /// Returns [`AppError::Capture`] for the first failing step.
    pub async fn run_booth(
        &self,
        mut workflow: CaptureWorkflow,
        guest: &GuestDetails,
        shots: u32,
    ) -> Result<Vec<PhotoReady>, AppError> {
        let result = Self::take_shots(&mut workflow, guest, shots).await;
        workflow.teardown();
        result
    }

    async fn take_shots(
        workflow: &mut CaptureWorkflow,
        guest: &GuestDetails,
        shots: u32,
    ) -> Result<Vec<PhotoReady>, AppError> {
        workflow.initialize().await?;
        let mut photos = Vec::with_capacity(shots as usize);
        for shot in 1..=shots {
            log::info!("shot {shot}/{shots}");
            photos.push(workflow.capture_photo(guest).await?);
        }
        Ok(photos)
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(String),
    /// API client error.
    #[error("api error: {0}")]
    Api(#[from] ApiError),
    /// Capture workflow error.
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
    /// Form submission error.
    #[error("form error: {0}")]
    Form(#[from] FormError),
}
