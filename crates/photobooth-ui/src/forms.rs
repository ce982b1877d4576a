//! Form handlers for event creation, event join and account registration.

use std::sync::Arc;

use photobooth_api::{ApiClient, NewEvent, Registration};

use crate::FormError;

/// Shows transient feedback messages.
pub trait Notifier: Send + Sync {
    /// Displays an error message.
    fn show_error(&self, message: &str);
    /// Displays a success message.
    fn show_success(&self, message: &str);
}

/// Moves the user to another page.
pub trait Navigator: Send + Sync {
    /// Navigates to `url`.
    fn navigate(&self, url: &str);
}

/// Raw values of the event creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateEventForm {
    /// Event name as typed.
    pub name: String,
    /// QR base URL as typed, empty for the server default.
    pub qr_base_url: String,
}

/// Raw values of the join form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinEventForm {
    /// Join code as typed.
    pub code: String,
}

/// Raw values of the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    /// Login email.
    pub email: String,
    /// Given name, optional.
    pub first_name: String,
    /// Family name, optional.
    pub last_name: String,
    /// Password.
    pub password1: String,
    /// Password confirmation.
    pub password2: String,
}

/// Handles the event creation and join forms.
#[derive(Clone)]
pub struct EventManager {
    api: Arc<ApiClient>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl EventManager {
    /// Creates a manager sharing `api`.
    pub fn new(
        api: Arc<ApiClient>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            notifier,
            navigator,
        }
    }

    /// Submits the event creation form.
    ///
    /// On success shows the server message and opens the new event's page.
    ///
    /// # Errors
    /// [`FormError::Validation`] for a blank name (nothing is sent),
    /// [`FormError::Api`] when the backend rejects the request.
    pub async fn handle_create_event(&self, form: &CreateEventForm) -> Result<String, FormError> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(self.reject("Event name is required"));
        }

        let request = NewEvent {
            name: name.to_string(),
            qr_base_url: form.qr_base_url.clone(),
        };
        let created = self
            .api
            .create_event(&request)
            .await
            .map_err(|error| self.fail(error))?;

        log::info!("event created: {name}");
        self.notifier.show_success(&created.message);
        if let Some(event) = &created.event {
            self.navigator.navigate(&self.api.event_page_url(&event.id));
        }
        Ok(created.message)
    }

    /// Submits the join form. Codes are matched case-insensitively, so the
    /// trimmed code is upper-cased before sending.
    ///
    /// # Errors
    /// [`FormError::Validation`] for a blank code (nothing is sent),
    /// [`FormError::Api`] when the backend rejects the code.
    pub async fn handle_join_event(&self, form: &JoinEventForm) -> Result<String, FormError> {
        let code = form.code.trim();
        if code.is_empty() {
            return Err(self.reject("Event code is required"));
        }

        let joined = self
            .api
            .join_event(&code.to_uppercase())
            .await
            .map_err(|error| self.fail(error))?;

        self.notifier.show_success(&joined.message);
        if let Some(redirect) = joined.redirect_url.as_deref() {
            self.navigator.navigate(redirect);
        }
        Ok(joined.message)
    }

    fn reject(&self, message: &str) -> FormError {
        self.notifier.show_error(message);
        FormError::Validation(message.to_string())
    }

    fn fail(&self, error: photobooth_api::ApiError) -> FormError {
        log::warn!("event form request failed: {error}");
        self.notifier.show_error(&error.to_string());
        FormError::Api(error)
    }
}

/// Handles the account registration form.
#[derive(Clone)]
pub struct RegistrationManager {
    api: Arc<ApiClient>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl RegistrationManager {
    /// Creates a manager sharing `api`.
    pub fn new(
        api: Arc<ApiClient>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            notifier,
            navigator,
        }
    }

    /// Submits the registration form and opens the event list on success.
    ///
    /// Password rules are enforced by the server; only presence is checked here.
    ///
    /// # Errors
    /// [`FormError::Validation`] for a missing email or password,
    /// [`FormError::Api`] when the backend rejects the registration.
    pub async fn handle_registration(&self, form: &RegistrationForm) -> Result<String, FormError> {
        let email = form.email.trim();
        let missing = if email.is_empty() {
            Some("Email is required")
        } else if form.password1.is_empty() {
            Some("Password is required")
        } else if form.password2.is_empty() {
            Some("Password confirmation is required")
        } else {
            None
        };
        if let Some(message) = missing {
            self.notifier.show_error(message);
            return Err(FormError::Validation(message.to_string()));
        }

        let registration = Registration {
            email: email.to_string(),
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            password1: form.password1.clone(),
            password2: form.password2.clone(),
        };
        let registered = match self.api.register_user(&registration).await {
            Ok(registered) => registered,
            Err(error) => {
                log::warn!("registration failed: {error}");
                self.notifier.show_error(&error.to_string());
                return Err(FormError::Api(error));
            }
        };

        self.notifier.show_success(&registered.message);
        self.navigator.navigate(&self.api.events_page_url());
        Ok(registered.message)
    }
}
