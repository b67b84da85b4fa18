//! Liquid-mode color generator.
//!
//! An independently clocked color source: once started it drifts its hue
//! toward uniformly random targets on its own update thread, decoupled from
//! the mapper's per-frame cadence. The current color can be read at any
//! time from any thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use palette::{FromColor, Hsv, Srgb};
use parking_lot::Mutex;
use rand::Rng;
use tracing::debug;

use crate::color::Rgb;

const TICK_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug)]
struct GeneratorState {
    /// Current hue in degrees
    hue: f32,
    /// Hue the generator is drifting toward
    target: f32,
    /// Degrees stepped per tick scale; any value accepted, effective
    /// minimum is 1
    speed: i32,
    /// False until first start and after a stopped reset; current() reads
    /// black while unlit
    lit: bool,
}

impl GeneratorState {
    fn step(&mut self) {
        let step = self.speed.max(1) as f32 * 0.1;
        // shortest angular distance, in [-180, 180)
        let diff = (self.target - self.hue + 540.0).rem_euclid(360.0) - 180.0;
        if diff.abs() <= step {
            self.hue = self.target;
            self.target = rand::rng().random_range(0.0..360.0);
        } else if diff > 0.0 {
            self.hue = (self.hue + step).rem_euclid(360.0);
        } else {
            self.hue = (self.hue - step).rem_euclid(360.0);
        }
    }

    fn color(&self) -> Rgb {
        if !self.lit {
            return Rgb::BLACK;
        }
        let rgb: Srgb = Srgb::from_color(Hsv::new(self.hue, 1.0, 1.0));
        Rgb::new(
            (rgb.red * 255.0).clamp(0.0, 255.0) as u8,
            (rgb.green * 255.0).clamp(0.0, 255.0) as u8,
            (rgb.blue * 255.0).clamp(0.0, 255.0) as u8,
        )
    }
}

/// Independently animating color source for liquid mode.
pub struct LiquidColorGenerator {
    state: Arc<Mutex<GeneratorState>>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl LiquidColorGenerator {
    /// Create a stopped generator. [`current`](Self::current) reads black
    /// until the first [`start`](Self::start).
    pub fn new(speed: i32) -> Self {
        Self {
            state: Arc::new(Mutex::new(GeneratorState {
                hue: 0.0,
                target: rand::rng().random_range(0.0..360.0),
                speed,
                lit: false,
            })),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Start the update thread. Idempotent.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        self.state.lock().lit = true;
        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);
        self.handle = Some(thread::spawn(move || {
            debug!("liquid color generator started");
            while running.load(Ordering::SeqCst) {
                state.lock().step();
                thread::sleep(TICK_INTERVAL);
            }
            debug!("liquid color generator stopped");
        }));
    }

    /// Stop the update thread. The last color stays readable.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Return to the initial state: hue 0, fresh random target, black
    /// while stopped.
    pub fn reset(&mut self) {
        let running = self.is_running();
        let mut state = self.state.lock();
        state.hue = 0.0;
        state.target = rand::rng().random_range(0.0..360.0);
        state.lit = running;
    }

    /// Change the drift speed; takes effect on the next tick.
    pub fn set_speed(&self, speed: i32) {
        self.state.lock().speed = speed;
    }

    /// Whether the update thread is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The generator's current color.
    pub fn current(&self) -> Rgb {
        self.state.lock().color()
    }
}

impl Drop for LiquidColorGenerator {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_before_first_start() {
        let generator = LiquidColorGenerator::new(50);
        assert_eq!(generator.current(), Rgb::BLACK);
        assert!(!generator.is_running());
    }

    #[test]
    fn start_lights_up_and_stop_keeps_last_color() {
        let mut generator = LiquidColorGenerator::new(50);
        generator.start();
        assert!(generator.is_running());
        // Hue 0 at full saturation/value is red.
        assert_ne!(generator.current(), Rgb::BLACK);

        generator.stop();
        assert!(!generator.is_running());
        assert_ne!(generator.current(), Rgb::BLACK);
    }

    #[test]
    fn start_is_idempotent() {
        let mut generator = LiquidColorGenerator::new(50);
        generator.start();
        generator.start();
        generator.stop();
        assert!(!generator.is_running());
    }

    #[test]
    fn reset_while_stopped_goes_black() {
        let mut generator = LiquidColorGenerator::new(50);
        generator.start();
        generator.stop();
        generator.reset();
        assert_eq!(generator.current(), Rgb::BLACK);
    }

    #[test]
    fn step_converges_on_target() {
        let mut state = GeneratorState {
            hue: 10.0,
            target: 30.0,
            speed: 50, // 5 degrees per tick
            lit: true,
        };
        state.step();
        assert!((state.hue - 15.0).abs() < 1e-3);
        for _ in 0..3 {
            state.step();
        }
        // Arrived: hue snapped to 30 and a new target was drawn.
        assert!((state.hue - 30.0).abs() < 1e-3);
    }

    #[test]
    fn step_takes_shortest_path_across_wraparound() {
        let mut state = GeneratorState {
            hue: 350.0,
            target: 10.0,
            speed: 50,
            lit: true,
        };
        state.step();
        assert!((state.hue - 355.0).abs() < 1e-3, "hue was {}", state.hue);
    }
}
