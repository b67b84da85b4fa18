//! Soundlight Core - Audio-reactive ambient LED color pipeline
//!
//! This crate contains the full visualizer pipeline, including:
//! - Spectrum-to-LED mapping (logarithmic bucketing, peak decay, interpolation)
//! - Liquid-mode color generator
//! - Audio capture backend abstraction (cpal + mock)
//! - Configuration snapshots

#![warn(missing_docs)]

use thiserror::Error;

pub mod audio;
pub mod color;
pub mod config;
pub mod liquid;
pub mod logging;
pub mod mapper;
pub mod visualizer;

// --- Re-exports grouped by category ---

// Audio capture
pub use audio::{AudioBackend, AudioDeviceInfo, AudioError, DeviceList};

// Mapping pipeline
pub use color::Rgb;
pub use config::{MapperTuning, VisualizerConfig};
pub use liquid::LiquidColorGenerator;
pub use mapper::SpectrumMapper;
pub use visualizer::{SoundVisualizer, VisualizerEvent};

// Logging & diagnostics
pub use logging::LogConfig;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// The spectrum buffer length is not a non-zero power of two
    #[error("spectrum size must be a non-zero power of two, got {0}")]
    InvalidSpectrumSize(usize),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
