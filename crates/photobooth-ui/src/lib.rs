#![warn(missing_docs)]
//! # photobooth-ui
//!
//! ## Purpose
//! Front-end glue for the photobooth: form handlers and the booth screen
//! state model.
//!
//! ## Responsibilities
//! - Validate and submit the event creation, join and registration forms.
//! - Report outcomes through [`Notifier`] and follow redirects through
//!   [`Navigator`].
//! - Project capture workflow progress into a render-ready [`BoothViewState`].
//!
//! ## Data flow
//! Form values -> manager -> [`photobooth_api::ApiClient`] -> notifier and
//! navigator. Workflow notifications -> [`BoothView`] -> rendered screen.
//!
//! ## Ownership and lifetimes
//! Managers share one `Arc<ApiClient>` with the capture workflow. `BoothView`
//! owns its state behind a mutex so it can be shared with the workflow as an
//! observer while the shell reads snapshots.
//!
//! ## Error model
//! Every failure is shown through the notifier and returned as a
//! [`FormError`]. Nothing is retried.
//!
//! ## Security and privacy notes
//! Passwords are forwarded to the API client only and never logged.

mod booth_view;
mod forms;

use photobooth_api::ApiError;
use thiserror::Error;

pub use booth_view::{BoothView, BoothViewState, ERROR_DISPLAY_DURATION};
pub use forms::{
    CreateEventForm, EventManager, JoinEventForm, Navigator, Notifier, RegistrationForm,
    RegistrationManager,
};

/// Form submission error type.
#[derive(Debug, Error)]
pub enum FormError {
    /// A required field was blank; no request was sent.
    #[error("{0}")]
    Validation(String),
    /// The backend rejected the request.
    #[error(transparent)]
    Api(#[from] ApiError),
}
