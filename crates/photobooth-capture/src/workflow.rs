//! The booth capture cycle: camera lifecycle, countdown, encode and upload.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use photobooth_api::{ApiClient, CaptureRequest, LegacyCaptureRequest};
use photobooth_core::{
    CameraSettings, CaptureContext, CapturedPhoto, ContextId, ContextKind, Frame, GuestDetails,
    PhotoId, encode_jpeg_data_uri,
};

use crate::camera::{CameraDevice, CameraStream, VideoConstraints};
use crate::countdown::run_countdown;
use crate::observer::{CaptureObserver, CaptureState, NoopObserver, PhotoReady};
use crate::{CAMERA_REQUIRED_MESSAGE, CameraError, CaptureError, NO_CONTEXT_MESSAGE};

/// How long the flash overlay stays visible.
pub const FLASH_DURATION: Duration = Duration::from_millis(200);

/// Where the workflow gets its capture context from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextSource {
    /// Context embedded by the hosting page.
    Provided(CaptureContext),
    /// Context loaded from the backend during initialization.
    Fetch {
        /// Whether the id names an event or a session.
        kind: ContextKind,
        /// Id to look up.
        id: ContextId,
    },
    /// No context; capture stays disabled.
    Absent,
}

/// Drives one booth screen from camera acquisition to stored photos.
///
/// Build it with [`CaptureWorkflow::new`], call [`CaptureWorkflow::initialize`]
/// once, then share it (for example behind `Arc`) and call
/// [`CaptureWorkflow::capture_photo`] per shutter press. Call
/// [`CaptureWorkflow::teardown`] when leaving the screen; dropping the workflow
/// releases the camera as well.
pub struct CaptureWorkflow {
    api: Arc<ApiClient>,
    camera: Arc<dyn CameraDevice>,
    observer: Arc<dyn CaptureObserver>,
    context_source: ContextSource,
    settings: CameraSettings,
    context: Mutex<Option<CaptureContext>>,
    stream: Mutex<Option<Box<dyn CameraStream>>>,
    state: Mutex<CaptureState>,
    last_photo_id: Mutex<Option<PhotoId>>,
    capturing: AtomicBool,
}

impl CaptureWorkflow {
    /// Creates an idle workflow. Nothing is loaded until `initialize`.
    pub fn new(
        api: Arc<ApiClient>,
        camera: Arc<dyn CameraDevice>,
        context_source: ContextSource,
    ) -> Self {
        Self {
            api,
            camera,
            observer: Arc::new(NoopObserver),
            context_source,
            settings: CameraSettings::default(),
            context: Mutex::new(None),
            stream: Mutex::new(None),
            state: Mutex::new(CaptureState::Idle),
            last_photo_id: Mutex::new(None),
            capturing: AtomicBool::new(false),
        }
    }

    /// Routes progress notifications to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn CaptureObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Loads settings and context, then acquires the camera.
    ///
    /// Settings fall back to defaults when the backend cannot serve them. A
    /// missing context is reported to the observer but does not stop the
    /// camera from starting; captures are rejected until a context exists.
    ///
    /// # Errors
    /// Returns [`CaptureError::CameraAccess`] when the camera cannot be opened
    /// or never delivers a frame. The workflow is left in
    /// [`CaptureState::Error`] and does not retry.
    pub async fn initialize(&mut self) -> Result<(), CaptureError> {
        self.set_state(CaptureState::Initializing);

        self.settings = match self.api.camera_settings().await {
            Ok(settings) => settings,
            Err(error) => {
                log::warn!("camera settings unavailable, using defaults: {error}");
                CameraSettings::default()
            }
        };

        let context = self.load_context().await;
        match &context {
            Some(context) => {
                log::info!(
                    "capture context loaded: {} ({} photos)",
                    context.id,
                    context.photo_count
                );
                self.observer.on_photo_count(context.photo_count);
            }
            None => {
                log::warn!("no capture context available; capture disabled");
                self.observer.on_error(NO_CONTEXT_MESSAGE);
            }
        }
        *lock(&self.context) = context;

        let constraints = VideoConstraints::from_settings(&self.settings);
        let mut stream = match self.camera.open(&constraints).await {
            Ok(stream) => stream,
            Err(error) => return Err(self.camera_failure(error)),
        };
        let info = match stream.ready().await {
            Ok(info) => info,
            Err(error) => {
                stream.stop();
                return Err(self.camera_failure(error));
            }
        };
        log::info!("camera ready at {}x{}", info.width, info.height);

        *lock(&self.stream) = Some(stream);
        self.set_state(CaptureState::Ready);
        Ok(())
    }

    /// Runs one countdown, capture and upload cycle for `guest`.
    ///
    /// # Errors
    /// - [`CaptureError::AlreadyCapturing`] while another cycle is running.
    /// - [`CaptureError::MissingContext`] when no context was loaded; no
    ///   request is sent.
    /// - [`CaptureError::NotReady`] when the camera is not streaming.
    /// - [`CaptureError::Upload`] when both the primary and the legacy upload
    ///   failed.
    pub async fn capture_photo(&self, guest: &GuestDetails) -> Result<PhotoReady, CaptureError> {
        let Some(_guard) = CapturingGuard::acquire(&self.capturing) else {
            log::debug!("capture requested while another capture is running");
            return Err(CaptureError::AlreadyCapturing);
        };

        let Some(context) = self.context() else {
            self.observer.on_error(NO_CONTEXT_MESSAGE);
            return Err(CaptureError::MissingContext);
        };
        if lock(&self.stream).is_none() {
            self.observer.on_error(CaptureError::NotReady.user_message());
            return Err(CaptureError::NotReady);
        }

        let result = self.run_cycle(&context, guest).await;
        match &result {
            Ok(photo) => {
                log::info!("photo {} stored for {}", photo.photo_id, context.id);
                self.set_state(CaptureState::Ready);
            }
            Err(error) => {
                log::error!("capture failed: {error}");
                self.set_state(CaptureState::Error);
                self.observer.on_error(error.user_message());
            }
        }
        result
    }

    async fn run_cycle(
        &self,
        context: &CaptureContext,
        guest: &GuestDetails,
    ) -> Result<PhotoReady, CaptureError> {
        self.set_state(CaptureState::CountingDown);
        let observer = &self.observer;
        run_countdown(self.settings.countdown, |remaining| {
            observer.on_countdown_tick(remaining)
        })
        .await;

        self.set_state(CaptureState::Capturing);
        let frame = self.grab_frame()?;
        let image = encode_jpeg_data_uri(&frame, self.settings.quality)?;
        self.observer.on_flash(FLASH_DURATION);

        let photo = CapturedPhoto {
            image,
            guest: guest.clone(),
        };
        self.set_state(CaptureState::Uploading);
        let photo_id = self.upload(context, &photo).await?;
        *lock(&self.last_photo_id) = Some(photo_id.clone());

        let count = self.refresh_photo_count(context).await;
        self.observer.on_photo_count(count);

        let ready = PhotoReady {
            download_url: self.api.download_url(&photo_id),
            qr_url: self.api.photo_qr_url(&photo_id),
            photo_id,
            image: photo.image,
        };
        self.observer.on_photo_ready(&ready);
        Ok(ready)
    }

    fn grab_frame(&self) -> Result<Frame, CaptureError> {
        let mut stream = lock(&self.stream);
        let stream = stream.as_mut().ok_or(CaptureError::NotReady)?;
        stream.grab_frame().map_err(CaptureError::Stream)
    }

    /// Primary upload, then exactly one legacy attempt on any failure.
    async fn upload(
        &self,
        context: &CaptureContext,
        photo: &CapturedPhoto,
    ) -> Result<PhotoId, CaptureError> {
        let primary = match self
            .api
            .capture_photo(&CaptureRequest::new(&context.id, photo))
            .await
        {
            Ok(result) if result.success => result
                .photo_id
                .ok_or_else(|| "response carried no photo_id".to_string()),
            Ok(result) => Err(result
                .message
                .or(result.error)
                .unwrap_or_else(|| "Failed to capture photo".to_string())),
            Err(error) => Err(error.to_string()),
        };

        let primary = match primary {
            Ok(photo_id) => return Ok(photo_id),
            Err(primary) => primary,
        };
        log::warn!("primary upload failed ({primary}); retrying legacy endpoint");

        let fallback = match self
            .api
            .legacy_capture(&LegacyCaptureRequest::new(context, photo))
            .await
        {
            Ok(result) => result
                .photo_id
                .ok_or_else(|| "response carried no photo_id".to_string()),
            Err(error) => Err(error.to_string()),
        };

        fallback.map_err(|fallback| CaptureError::Upload { primary, fallback })
    }

    async fn refresh_photo_count(&self, context: &CaptureContext) -> u64 {
        let fetched = match self.api.event_info(&context.id).await {
            Ok(event) => Some(event.photo_count),
            Err(error) => {
                log::debug!("photo count refresh failed, counting locally: {error}");
                None
            }
        };

        let mut current = lock(&self.context);
        match current.as_mut() {
            Some(current) => {
                current.photo_count = fetched.unwrap_or(current.photo_count + 1);
                current.photo_count
            }
            None => fetched.unwrap_or(context.photo_count + 1),
        }
    }

    async fn load_context(&self) -> Option<CaptureContext> {
        match &self.context_source {
            ContextSource::Provided(context) => Some(context.clone()),
            ContextSource::Fetch { kind, id } => match self.api.event_info(id).await {
                Ok(event) => Some(CaptureContext {
                    kind: *kind,
                    id: event.id,
                    name: event.name,
                    photo_count: event.photo_count,
                }),
                Err(error) => {
                    log::warn!("loading capture context {id} failed: {error}");
                    None
                }
            },
            ContextSource::Absent => None,
        }
    }

    fn camera_failure(&self, error: CameraError) -> CaptureError {
        log::error!("camera acquisition failed: {error}");
        self.set_state(CaptureState::Error);
        self.observer.on_error(CAMERA_REQUIRED_MESSAGE);
        CaptureError::CameraAccess(error)
    }

    /// Stops every camera track and returns to [`CaptureState::Idle`].
    pub fn teardown(&self) {
        if let Some(mut stream) = lock(&self.stream).take() {
            stream.stop();
            log::info!("camera released");
        }
        self.set_state(CaptureState::Idle);
    }

    fn set_state(&self, state: CaptureState) {
        *lock(&self.state) = state;
        log::debug!("capture state -> {state:?}");
        self.observer.on_state(state);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CaptureState {
        *lock(&self.state)
    }

    /// Whether a capture cycle is running.
    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::Acquire)
    }

    /// Settings in effect; defaults until initialized.
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Loaded capture context with its current photo count.
    pub fn context(&self) -> Option<CaptureContext> {
        lock(&self.context).clone()
    }

    /// Id of the last successfully stored photo.
    pub fn last_photo_id(&self) -> Option<PhotoId> {
        lock(&self.last_photo_id).clone()
    }

    /// Camera tracks still running.
    pub fn active_tracks(&self) -> usize {
        lock(&self.stream)
            .as_ref()
            .map_or(0, |stream| stream.active_tracks())
    }
}

impl Drop for CaptureWorkflow {
    fn drop(&mut self) {
        let stream = self
            .stream
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(mut stream) = stream.take() {
            log::warn!("capture workflow dropped without teardown; releasing camera");
            stream.stop();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the re-entrancy flag for one capture cycle.
struct CapturingGuard<'a>(&'a AtomicBool);

impl<'a> CapturingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for CapturingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);

        let guard = CapturingGuard::acquire(&flag).expect("first acquire succeeds");
        assert!(CapturingGuard::acquire(&flag).is_none());
        assert!(flag.load(Ordering::Acquire));

        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(CapturingGuard::acquire(&flag).is_some());
    }
}
