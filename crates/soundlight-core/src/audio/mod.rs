//! Audio capture backends.
//!
//! Platform capture lives behind the [`AudioBackend`] capability trait so
//! the visualizer never touches a host API directly. The cpal backend
//! (feature `audio`, default) captures real input devices; the mock backend
//! serves tests and headless demo runs.

pub mod analyzer;
#[cfg(feature = "audio")]
pub mod cpal_backend;
pub mod mock;

use thiserror::Error;

pub use analyzer::SpectrumAnalyzer;
#[cfg(feature = "audio")]
pub use cpal_backend::CpalBackend;
pub use mock::MockBackend;

/// One enumerated capture device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDeviceInfo {
    /// Backend-assigned id, usable with [`AudioBackend::start`]
    pub id: i32,
    /// Human-readable device name
    pub name: String,
    /// Whether this is the host's default input device
    pub is_default: bool,
}

/// An enumerated device list plus the recommended default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceList {
    /// Devices in backend enumeration order
    pub devices: Vec<AudioDeviceInfo>,
    /// Index into `devices` the host recommends, if any
    pub recommended: Option<usize>,
}

/// Audio capture errors
#[derive(Error, Debug)]
pub enum AudioError {
    /// The backend has not been initialized
    #[error("audio host is not initialized")]
    NotInitialized,

    /// Capture was requested on an id no device carries
    #[error("no input device matches id {0}")]
    UnknownDevice(i32),

    /// The host has no default input device
    #[error("no default input device available")]
    NoDefaultDevice,

    /// The device's sample format is not supported
    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Device enumeration failed
    #[cfg(feature = "audio")]
    #[error("device enumeration failed: {0}")]
    Devices(#[from] cpal::DevicesError),

    /// Querying the device's stream configuration failed
    #[cfg(feature = "audio")]
    #[error("stream configuration failed: {0}")]
    StreamConfig(#[from] cpal::DefaultStreamConfigError),

    /// Building the input stream failed
    #[cfg(feature = "audio")]
    #[error("stream creation failed: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    /// Starting the input stream failed
    #[cfg(feature = "audio")]
    #[error("stream start failed: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// Any other capture failure
    #[error("capture failure: {0}")]
    Capture(String),
}

/// Result type for capture operations
pub type Result<T> = std::result::Result<T, AudioError>;

/// Capability interface over a platform audio capture host.
///
/// Implementations are selected at startup; the visualizer only ever calls
/// through this trait. All methods are called from the visualizer's thread.
pub trait AudioBackend {
    /// Acquire the platform host. Called lazily before enumeration or
    /// capture; idempotent.
    fn init(&mut self) -> Result<()>;

    /// Whether [`init`](Self::init) has succeeded.
    fn is_inited(&self) -> bool;

    /// Enumerate capture devices and the recommended default.
    fn enumerate_devices(&mut self) -> Result<DeviceList>;

    /// Start capturing from `device` (`-1` = host default input).
    fn start(&mut self, device: i32) -> Result<()>;

    /// Stop capturing. Idempotent.
    fn stop(&mut self);

    /// Refresh `spectrum` with the newest magnitude data. The slice length
    /// is the mapper's fixed spectrum size.
    fn fill_spectrum(&mut self, spectrum: &mut [f32]) -> Result<()>;
}
