//! Sound visualizer manager.
//!
//! Ties the capture backend, the spectrum mapper and the liquid generator
//! together, owns the configuration snapshot, and emits the per-frame LED
//! color sequence to subscribers.

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, error, warn};

use crate::audio::{AudioBackend, DeviceList};
use crate::color::Rgb;
use crate::config::{MapperTuning, VisualizerConfig};
use crate::liquid::LiquidColorGenerator;
use crate::mapper::SpectrumMapper;
use crate::Result;

const EVENT_QUEUE_DEPTH: usize = 16;

/// Events emitted by the visualizer.
#[derive(Debug, Clone, PartialEq)]
pub enum VisualizerEvent {
    /// A recomputed LED color sequence, in physical LED order
    LedColors(Vec<Rgb>),
    /// The enumerated capture devices, answering a device list request
    DeviceList(DeviceList),
}

/// Audio-reactive LED color visualizer.
///
/// All methods are meant to be called from one thread; the per-frame entry
/// point is [`update_colors`](Self::update_colors). Backend failures never
/// propagate: they disable the visualizer and are logged (silent degrade).
pub struct SoundVisualizer {
    backend: Box<dyn AudioBackend>,
    mapper: SpectrumMapper,
    generator: LiquidColorGenerator,
    config: VisualizerConfig,
    enabled: bool,
    events: Sender<VisualizerEvent>,
    subscriber: Receiver<VisualizerEvent>,
}

impl SoundVisualizer {
    /// Create a visualizer over `backend` with the default mapper tuning.
    pub fn new(
        config: VisualizerConfig,
        spectrum_len: usize,
        backend: Box<dyn AudioBackend>,
    ) -> Result<Self> {
        Self::with_tuning(config, spectrum_len, backend, MapperTuning::default())
    }

    /// Create a visualizer with explicit mapper tuning.
    pub fn with_tuning(
        config: VisualizerConfig,
        spectrum_len: usize,
        backend: Box<dyn AudioBackend>,
        tuning: MapperTuning,
    ) -> Result<Self> {
        let mapper = SpectrumMapper::new(spectrum_len, config.num_leds, tuning)?;
        let generator = LiquidColorGenerator::new(config.liquid_speed);
        let (events, subscriber) = bounded(EVENT_QUEUE_DEPTH);
        Ok(Self {
            backend,
            mapper,
            generator,
            config,
            enabled: false,
            events,
            subscriber,
        })
    }

    /// A receiver of the visualizer's events. Frames are dropped rather
    /// than blocking when no subscriber keeps up.
    pub fn subscribe(&self) -> Receiver<VisualizerEvent> {
        self.subscriber.clone()
    }

    /// The current configuration snapshot.
    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    /// Whether the visualizer is running.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The most recently computed LED colors.
    pub fn colors(&self) -> &[Rgb] {
        self.mapper.colors()
    }

    /// Enable or disable the visualizer.
    ///
    /// Enabling lazily initializes the backend and starts capture on the
    /// configured device; any failure forces the visualizer off. Disabling
    /// stops capture and the liquid generator.
    pub fn set_enabled(&mut self, on: bool) {
        if !on {
            self.backend.stop();
            self.generator.stop();
            self.enabled = false;
            return;
        }

        if !self.backend.is_inited() {
            if let Err(e) = self.backend.init() {
                error!("audio backend init failed: {e}");
                self.enabled = false;
                return;
            }
        }
        match self.backend.start(self.config.device) {
            Ok(()) => {
                self.enabled = true;
                if self.config.liquid_mode {
                    self.generator.start();
                }
            }
            Err(e) => {
                error!("audio capture start failed: {e}");
                self.enabled = false;
            }
        }
    }

    /// Per-frame update: refresh the spectrum, recompute all LED colors and
    /// emit the sequence to subscribers (subject to change-gating).
    pub fn update_colors(&mut self) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.backend.fill_spectrum(self.mapper.spectrum_mut()) {
            warn!("spectrum refresh failed: {e}");
            return;
        }
        let (from, to) = if self.config.liquid_mode {
            (Rgb::BLACK, self.generator.current())
        } else {
            (self.config.min_color, self.config.max_color)
        };
        let config = &self.config;
        let changed = self.mapper.update(from, to, |i| config.is_led_enabled(i));
        if changed || !self.config.send_only_if_changed {
            let _ = self
                .events
                .try_send(VisualizerEvent::LedColors(self.mapper.colors().to_vec()));
        }
    }

    /// Enumerate capture devices, emitting a
    /// [`VisualizerEvent::DeviceList`] and returning the list.
    ///
    /// A backend failure disables the visualizer and yields `None`.
    pub fn request_device_list(&mut self) -> Option<DeviceList> {
        if !self.backend.is_inited() {
            if let Err(e) = self.backend.init() {
                error!("audio backend init failed: {e}");
                self.enabled = false;
                return None;
            }
        }
        match self.backend.enumerate_devices() {
            Ok(list) => {
                let _ = self.events.try_send(VisualizerEvent::DeviceList(list.clone()));
                Some(list)
            }
            Err(e) => {
                error!("device enumeration failed: {e}");
                None
            }
        }
    }

    /// Switch the capture device; if running, capture is stopped and
    /// restarted around the swap. Peak state does not survive the gap.
    pub fn set_device(&mut self, device: i32) {
        debug!(device, "switching audio device");
        let was_enabled = self.enabled;
        if was_enabled {
            self.set_enabled(false);
        }
        self.config.device = device;
        if was_enabled {
            self.set_enabled(true);
        }
    }

    /// Set the color emitted at zero spectral energy.
    pub fn set_min_color(&mut self, color: Rgb) {
        debug!(?color, "min color");
        self.config.min_color = color;
    }

    /// Set the color emitted at full spectral energy.
    pub fn set_max_color(&mut self, color: Rgb) {
        debug!(?color, "max color");
        self.config.max_color = color;
    }

    /// Toggle liquid mode. Disabling it while running forces one immediate
    /// recompute against the static endpoints.
    pub fn set_liquid_mode(&mut self, on: bool) {
        debug!(on, "liquid mode");
        self.config.liquid_mode = on;
        if on && self.enabled {
            self.generator.start();
        } else {
            self.generator.stop();
            if self.enabled {
                self.update_colors();
            }
        }
    }

    /// Set the liquid generator speed. Accepted as-is.
    pub fn set_liquid_speed(&mut self, speed: i32) {
        debug!(speed, "liquid speed");
        self.config.liquid_speed = speed;
        self.generator.set_speed(speed);
    }

    /// Toggle change-gating of the emitted frames.
    pub fn set_send_only_if_changed(&mut self, on: bool) {
        debug!(on, "send only if changed");
        self.config.send_only_if_changed = on;
    }

    /// Change the LED count, discarding all color and peak state.
    pub fn set_num_leds(&mut self, num_leds: usize) {
        debug!(num_leds, "LED count");
        self.config.num_leds = num_leds;
        self.mapper.set_num_leds(num_leds);
    }

    /// Replace the configuration snapshot (a settings-change notification).
    ///
    /// Resizes the LED arrays, forwards the liquid speed and reconciles the
    /// generator with the new mode flags.
    pub fn apply_config(&mut self, config: VisualizerConfig) {
        self.generator.set_speed(config.liquid_speed);
        if config.num_leds != self.mapper.num_leds() {
            self.mapper.set_num_leds(config.num_leds);
        }
        if self.enabled {
            if config.liquid_mode {
                self.generator.start();
            } else {
                self.generator.stop();
            }
        }
        self.config = config;
    }

    /// Zero all colors and peaks and reset the liquid generator.
    pub fn reset(&mut self) {
        self.mapper.reset();
        self.generator.reset();
    }
}
