//! Camera acquisition seams and the bundled camera backends.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use photobooth_core::{CameraSettings, Frame};
use thiserror::Error;

/// Preferred camera orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FacingMode {
    /// Front camera, facing the guest.
    #[default]
    User,
    /// Rear camera.
    Environment,
}

/// Ideal stream constraints derived from [`CameraSettings`].
///
/// Devices treat every value as a preference and may pick the closest mode
/// they support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
    /// Ideal width in pixels.
    pub ideal_width: u32,
    /// Ideal height in pixels.
    pub ideal_height: u32,
    /// Ideal frame rate.
    pub ideal_frame_rate: u32,
    /// Preferred camera.
    pub facing_mode: FacingMode,
}

impl VideoConstraints {
    /// Builds constraints from loaded camera settings.
    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self {
            ideal_width: settings.resolution.width,
            ideal_height: settings.resolution.height,
            ideal_frame_rate: settings.fps,
            facing_mode: FacingMode::User,
        }
    }
}

/// Native geometry reported by a stream once its first frame is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    /// Native frame width.
    pub width: u32,
    /// Native frame height.
    pub height: u32,
}

/// A camera that can be opened into a live stream.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Requests camera access with `constraints`.
    ///
    /// # Errors
    /// Returns [`CameraError::PermissionDenied`] or [`CameraError::NoDevice`]
    /// when no stream can be acquired.
    async fn open(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Box<dyn CameraStream>, CameraError>;
}

/// A live camera stream. Owning it holds the device lock.
#[async_trait]
pub trait CameraStream: Send {
    /// Resolves once the first frame is available.
    async fn ready(&mut self) -> Result<StreamInfo, CameraError>;

    /// Grabs the current frame at native resolution.
    fn grab_frame(&mut self) -> Result<Frame, CameraError>;

    /// Stops every track of the stream.
    fn stop(&mut self);

    /// Number of tracks still running.
    fn active_tracks(&self) -> usize;
}

/// Camera acquisition and streaming failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// The user or platform refused camera access.
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    /// No camera is available.
    #[error("no camera available: {0}")]
    NoDevice(String),
    /// The stream failed after acquisition.
    #[error("camera stream failure: {0}")]
    Stream(String),
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis() as u64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyntheticAccess {
    Granted,
    Denied,
    Missing,
}

/// Deterministic test-pattern camera for tests and offline runs.
///
/// Streams honor the ideal resolution unless a native resolution is pinned.
/// Open tracks are counted across all streams so callers can verify release.
#[derive(Debug)]
pub struct SyntheticCamera {
    access: SyntheticAccess,
    native: Option<StreamInfo>,
    live_tracks: Arc<AtomicUsize>,
    last_constraints: Mutex<Option<VideoConstraints>>,
}

impl SyntheticCamera {
    /// Camera that grants access.
    pub fn new() -> Self {
        Self::with_access(SyntheticAccess::Granted)
    }

    /// Camera whose permission prompt is refused.
    pub fn denied() -> Self {
        Self::with_access(SyntheticAccess::Denied)
    }

    /// Platform without any camera.
    pub fn unavailable() -> Self {
        Self::with_access(SyntheticAccess::Missing)
    }

    fn with_access(access: SyntheticAccess) -> Self {
        Self {
            access,
            native: None,
            live_tracks: Arc::new(AtomicUsize::new(0)),
            last_constraints: Mutex::new(None),
        }
    }

    /// Pins the native resolution regardless of constraints.
    pub fn with_native_resolution(mut self, width: u32, height: u32) -> Self {
        self.native = Some(StreamInfo { width, height });
        self
    }

    /// Tracks currently running across every opened stream.
    pub fn live_tracks(&self) -> usize {
        self.live_tracks.load(Ordering::SeqCst)
    }

    /// Constraints passed to the last `open` call.
    pub fn last_constraints(&self) -> Option<VideoConstraints> {
        *self
            .last_constraints
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CameraDevice for SyntheticCamera {
    async fn open(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Box<dyn CameraStream>, CameraError> {
        *self
            .last_constraints
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(*constraints);

        match self.access {
            SyntheticAccess::Denied => {
                return Err(CameraError::PermissionDenied(
                    "synthetic camera refused access".to_string(),
                ));
            }
            SyntheticAccess::Missing => {
                return Err(CameraError::NoDevice(
                    "synthetic platform has no camera".to_string(),
                ));
            }
            SyntheticAccess::Granted => {}
        }

        let info = self.native.unwrap_or(StreamInfo {
            width: constraints.ideal_width.max(1),
            height: constraints.ideal_height.max(1),
        });
        self.live_tracks.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(SyntheticStream {
            info,
            running: true,
            sequence: AtomicU64::new(0),
            live_tracks: self.live_tracks.clone(),
        }))
    }
}

#[derive(Debug)]
struct SyntheticStream {
    info: StreamInfo,
    running: bool,
    sequence: AtomicU64,
    live_tracks: Arc<AtomicUsize>,
}

#[async_trait]
impl CameraStream for SyntheticStream {
    async fn ready(&mut self) -> Result<StreamInfo, CameraError> {
        Ok(self.info)
    }

    fn grab_frame(&mut self) -> Result<Frame, CameraError> {
        if !self.running {
            return Err(CameraError::Stream("stream already stopped".to_string()));
        }

        let shift = (self.sequence.fetch_add(1, Ordering::SeqCst) % 255) as u8;
        let StreamInfo { width, height } = self.info;
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                let red = ((x * 255) / width.max(1)) as u8;
                let green = ((y * 255) / height.max(1)) as u8;
                rgba.extend_from_slice(&[red, green, shift, 255]);
            }
        }

        Frame::new(width, height, now_ms(), rgba)
            .map_err(|error| CameraError::Stream(error.to_string()))
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.live_tracks.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn active_tracks(&self) -> usize {
        usize::from(self.running)
    }
}

impl Drop for SyntheticStream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Camera that serves a still image decoded from disk on every grab.
///
/// Used by the headless booth to exercise the full capture cycle without a
/// capture device.
#[derive(Debug, Clone)]
pub struct StillImageCamera {
    path: PathBuf,
}

impl StillImageCamera {
    /// Creates a camera backed by the image at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CameraDevice for StillImageCamera {
    async fn open(
        &self,
        _constraints: &VideoConstraints,
    ) -> Result<Box<dyn CameraStream>, CameraError> {
        let decoded = image::open(&self.path).map_err(|error| match error {
            image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
                CameraError::NoDevice(format!("{} not found", self.path.display()))
            }
            image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
                CameraError::PermissionDenied(format!("{}: {io}", self.path.display()))
            }
            other => CameraError::Stream(format!("{}: {other}", self.path.display())),
        })?;
        let rgba = decoded.to_rgba8();

        Ok(Box::new(StillImageStream {
            info: StreamInfo {
                width: rgba.width(),
                height: rgba.height(),
            },
            rgba: Some(rgba.into_raw()),
        }))
    }
}

#[derive(Debug)]
struct StillImageStream {
    info: StreamInfo,
    rgba: Option<Vec<u8>>,
}

#[async_trait]
impl CameraStream for StillImageStream {
    async fn ready(&mut self) -> Result<StreamInfo, CameraError> {
        if self.info.width == 0 || self.info.height == 0 {
            return Err(CameraError::Stream("image has no pixels".to_string()));
        }
        Ok(self.info)
    }

    fn grab_frame(&mut self) -> Result<Frame, CameraError> {
        let rgba = self
            .rgba
            .clone()
            .ok_or_else(|| CameraError::Stream("stream already stopped".to_string()))?;
        Frame::new(self.info.width, self.info.height, now_ms(), rgba)
            .map_err(|error| CameraError::Stream(error.to_string()))
    }

    fn stop(&mut self) {
        self.rgba = None;
    }

    fn active_tracks(&self) -> usize {
        usize::from(self.rgba.is_some())
    }
}
