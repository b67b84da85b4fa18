//! Programmable mock backend for tests and headless demo runs.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{AudioBackend, AudioDeviceInfo, AudioError, DeviceList, Result};

/// Shared, externally mutable state of a [`MockBackend`].
#[derive(Debug, Default)]
pub struct MockState {
    /// Magnitudes served by `fill_spectrum` (zero-filled past the end)
    pub spectrum: Vec<f32>,
    /// Make `init` fail
    pub fail_init: bool,
    /// Make `start` fail
    pub fail_start: bool,
    /// Whether `init` has succeeded
    pub inited: bool,
    /// Whether capture is running
    pub running: bool,
    /// Number of successful `start` calls
    pub starts: u32,
    /// Number of `stop` calls
    pub stops: u32,
    /// Device id passed to the last `start`
    pub last_device: i32,
}

/// In-memory [`AudioBackend`] with scriptable devices, spectra and
/// failures. Keep a [`handle`](MockBackend::handle) to drive it from a test
/// after the visualizer has taken ownership of the backend.
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
    devices: Vec<AudioDeviceInfo>,
    recommended: Option<usize>,
}

impl MockBackend {
    /// A backend with two fake devices, the first recommended.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                last_device: -1,
                ..MockState::default()
            })),
            devices: vec![
                AudioDeviceInfo {
                    id: 0,
                    name: "Mock loopback".into(),
                    is_default: true,
                },
                AudioDeviceInfo {
                    id: 1,
                    name: "Mock microphone".into(),
                    is_default: false,
                },
            ],
            recommended: Some(0),
        }
    }

    /// Replace the enumerated device list.
    pub fn with_devices(mut self, devices: Vec<AudioDeviceInfo>, recommended: Option<usize>) -> Self {
        self.devices = devices;
        self.recommended = recommended;
        self
    }

    /// Handle for mutating the backend state after handing it off.
    pub fn handle(&self) -> Arc<Mutex<MockState>> {
        Arc::clone(&self.state)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for MockBackend {
    fn init(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_init {
            return Err(AudioError::Capture("mock init failure".into()));
        }
        state.inited = true;
        Ok(())
    }

    fn is_inited(&self) -> bool {
        self.state.lock().inited
    }

    fn enumerate_devices(&mut self) -> Result<DeviceList> {
        if !self.state.lock().inited {
            return Err(AudioError::NotInitialized);
        }
        Ok(DeviceList {
            devices: self.devices.clone(),
            recommended: self.recommended,
        })
    }

    fn start(&mut self, device: i32) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_start {
            return Err(AudioError::Capture("mock start failure".into()));
        }
        state.running = true;
        state.starts += 1;
        state.last_device = device;
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.state.lock();
        state.running = false;
        state.stops += 1;
    }

    fn fill_spectrum(&mut self, spectrum: &mut [f32]) -> Result<()> {
        let state = self.state.lock();
        if !state.running {
            return Err(AudioError::Capture("capture is not running".into()));
        }
        let n = spectrum.len().min(state.spectrum.len());
        spectrum[..n].copy_from_slice(&state.spectrum[..n]);
        spectrum[n..].fill(0.0);
        Ok(())
    }
}
