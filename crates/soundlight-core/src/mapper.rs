//! Spectrum-to-LED mapping.
//!
//! Each frame the mapper folds a fixed-size magnitude spectrum into one
//! value per LED (logarithmically spaced buckets, bass gets the finest
//! resolution), runs a decaying peak-hold over it and interpolates each
//! LED's color between two endpoints.

use crate::color::Rgb;
use crate::config::MapperTuning;
use crate::{CoreError, Result};

/// Per-frame spectrum-to-color mapper.
///
/// Owns the spectrum buffer, the LED color array and the parallel peak-hold
/// array. The spectrum length is fixed at construction; the LED count can be
/// changed at any time, which resets all mapping state.
pub struct SpectrumMapper {
    spectrum: Vec<f32>,
    colors: Vec<Rgb>,
    peaks: Vec<i32>,
    frames: u64,
    tuning: MapperTuning,
}

impl SpectrumMapper {
    /// Create a mapper for a `spectrum_len`-bin magnitude spectrum driving
    /// `num_leds` LEDs.
    ///
    /// `spectrum_len` must be a non-zero power of two.
    pub fn new(spectrum_len: usize, num_leds: usize, tuning: MapperTuning) -> Result<Self> {
        if spectrum_len == 0 || !spectrum_len.is_power_of_two() {
            return Err(CoreError::InvalidSpectrumSize(spectrum_len));
        }
        Ok(Self {
            spectrum: vec![0.0; spectrum_len],
            colors: vec![Rgb::BLACK; num_leds],
            peaks: vec![0; num_leds],
            frames: 0,
            tuning,
        })
    }

    /// Mutable access to the spectrum buffer, for the capture backend to
    /// refresh before each [`update`](Self::update).
    pub fn spectrum_mut(&mut self) -> &mut [f32] {
        &mut self.spectrum
    }

    /// Fixed length of the spectrum buffer.
    pub fn spectrum_len(&self) -> usize {
        self.spectrum.len()
    }

    /// Current per-LED colors, in physical LED order.
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Current per-LED held peaks.
    pub fn peaks(&self) -> &[i32] {
        &self.peaks
    }

    /// Number of LEDs currently driven.
    pub fn num_leds(&self) -> usize {
        self.colors.len()
    }

    /// Frames processed since construction. Never reset.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Change the LED count, zeroing all colors and peaks.
    pub fn set_num_leds(&mut self, num_leds: usize) {
        self.colors = vec![Rgb::BLACK; num_leds];
        self.peaks = vec![0; num_leds];
    }

    /// Zero all colors and peaks at the current LED count.
    pub fn reset(&mut self) {
        self.colors.fill(Rgb::BLACK);
        self.peaks.fill(0);
    }

    /// The spectrum bucket `[start, end)` assigned to each LED, in LED
    /// order. Bucket `k` scans spectrum bins `start+1 ..= end` (the DC bin
    /// is never read).
    pub fn bucket_bounds(&self) -> Vec<(usize, usize)> {
        let n = self.colors.len();
        let mut bounds = Vec::with_capacity(n);
        let mut b0 = 0usize;
        for i in 0..n {
            let b1 = self.bucket_end(i, n, b0);
            bounds.push((b0, b1));
            b0 = b1;
        }
        bounds
    }

    /// Recompute all LED colors from the current spectrum contents.
    ///
    /// `from`/`to` are the interpolation endpoints for this frame and
    /// `led_enabled` gates each LED; disabled LEDs are forced to black.
    /// Returns whether any LED color differs from the previous frame.
    pub fn update<F>(&mut self, from: Rgb, to: Rgb, led_enabled: F) -> bool
    where
        F: Fn(usize) -> bool,
    {
        self.frames += 1;
        let n = self.colors.len();
        let mut changed = false;
        let mut b0 = 0usize;
        for i in 0..n {
            let b1 = self.bucket_end(i, n, b0);
            let mut peak = 0f32;
            while b0 < b1 {
                if peak < self.spectrum[1 + b0] {
                    peak = self.spectrum[1 + b0];
                }
                b0 += 1;
            }

            let spec_height = self.tuning.spec_height;
            // sqrt makes low magnitudes visible
            let mut val = (f64::from(peak).sqrt() * f64::from(spec_height)
                - f64::from(self.tuning.magnitude_offset)) as i32;
            val = val.clamp(0, spec_height);

            if self.tuning.decay_interval != 0 && self.frames % self.tuning.decay_interval == 0 {
                self.peaks[i] -= 1;
            }
            if self.peaks[i] < 0 {
                self.peaks[i] = 0;
            }
            if val > self.peaks[i] {
                self.peaks[i] = val;
            }
            if val < self.peaks[i] - self.tuning.rescale_threshold {
                // scale val according to the held peak
                val = val * spec_height / self.peaks[i];
            }

            if led_enabled(i) {
                let rgb = Rgb::lerp(from, to, f64::from(val) / f64::from(spec_height));
                if self.colors[i] != rgb {
                    changed = true;
                }
                self.colors[i] = rgb;
            } else {
                self.colors[i] = Rgb::BLACK;
            }
        }
        changed
    }

    /// Exclusive end of LED `i`'s bucket given the previous bucket's end
    /// `b0`. Guarantees at least one bin per bucket until the spectrum tail
    /// is exhausted, and never lets the scan index past the buffer.
    fn bucket_end(&self, i: usize, n: usize, b0: usize) -> usize {
        let last = self.spectrum.len() - 1;
        let mut b1 = if n <= 1 {
            last
        } else {
            2f64.powf(i as f64 * self.tuning.spectral_spread / (n - 1) as f64) as usize
        };
        if b1 > last {
            b1 = last;
        }
        if b1 <= b0 {
            b1 = (b0 + 1).min(last);
        }
        b1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper(spectrum_len: usize, num_leds: usize) -> SpectrumMapper {
        SpectrumMapper::new(spectrum_len, num_leds, MapperTuning::default()).unwrap()
    }

    #[test]
    fn rejects_bad_spectrum_sizes() {
        assert!(SpectrumMapper::new(0, 10, MapperTuning::default()).is_err());
        assert!(SpectrumMapper::new(1000, 10, MapperTuning::default()).is_err());
        assert!(SpectrumMapper::new(1024, 10, MapperTuning::default()).is_ok());
    }

    #[test]
    fn buckets_double_for_ten_leds() {
        // With spread 9.0 and N = 10 the boundary is exactly 2^i.
        let m = mapper(1024, 10);
        assert_eq!(
            m.bucket_bounds(),
            vec![
                (0, 1),
                (1, 2),
                (2, 4),
                (4, 8),
                (8, 16),
                (16, 32),
                (32, 64),
                (64, 128),
                (128, 256),
                (256, 512),
            ]
        );
    }

    #[test]
    fn single_led_scans_whole_spectrum() {
        let m = mapper(1024, 1);
        assert_eq!(m.bucket_bounds(), vec![(0, 1023)]);
    }

    #[test]
    fn zero_leds_is_a_no_op() {
        let mut m = mapper(1024, 0);
        assert!(!m.update(Rgb::BLACK, Rgb::WHITE, |_| true));
        assert!(m.colors().is_empty());
    }

    #[test]
    fn peak_decays_every_fifth_frame_and_floors_at_zero() {
        let mut m = mapper(1024, 2);
        m.spectrum_mut()[1] = 1.0;
        m.update(Rgb::BLACK, Rgb::WHITE, |_| true);
        assert_eq!(m.peaks()[0], 996); // sqrt(1) * 1000 - 4

        m.spectrum_mut()[1] = 0.0;
        for frame in 2..=4 {
            m.update(Rgb::BLACK, Rgb::WHITE, |_| true);
            assert_eq!(m.peaks()[0], 996, "no decay before frame 5 (at {frame})");
        }
        m.update(Rgb::BLACK, Rgb::WHITE, |_| true); // frame 5
        assert_eq!(m.peaks()[0], 995);
        for _ in 6..=10 {
            m.update(Rgb::BLACK, Rgb::WHITE, |_| true);
        }
        assert_eq!(m.peaks()[0], 994);

        // Run the peak down to zero; it must never underflow.
        for _ in 0..6000 {
            m.update(Rgb::BLACK, Rgb::WHITE, |_| true);
        }
        assert_eq!(m.peaks()[0], 0);
        assert_eq!(m.peaks()[1], 0);
    }

    #[test]
    fn transient_dip_is_rescaled_against_held_peak() {
        let mut m = mapper(1024, 2);
        m.spectrum_mut()[1] = 1.0;
        m.update(Rgb::BLACK, Rgb::WHITE, |_| true);
        assert_eq!(m.colors()[0], Rgb::new(253, 253, 253)); // 996/1000 of white

        // sqrt(0.25) = 0.5 exactly: raw val 496, rescaled 496 * 1000 / 996 = 497.
        m.spectrum_mut()[1] = 0.25;
        m.update(Rgb::BLACK, Rgb::WHITE, |_| true);
        assert_eq!(m.peaks()[0], 996);
        assert_eq!(m.colors()[0], Rgb::new(126, 126, 126)); // 497/1000 of white
    }

    #[test]
    fn disabled_led_stays_black_and_keeps_decay_state() {
        let mut m = mapper(1024, 2);
        m.spectrum_mut()[1] = 1.0;
        m.spectrum_mut()[2] = 1.0;
        m.update(Rgb::BLACK, Rgb::WHITE, |i| i != 0);
        assert_eq!(m.colors()[0], Rgb::BLACK);
        assert_ne!(m.colors()[1], Rgb::BLACK);
        // The peak tracker runs regardless of the enable flag.
        assert_eq!(m.peaks()[0], 996);
    }

    #[test]
    fn resize_zeroes_colors_and_peaks_but_not_frames() {
        let mut m = mapper(1024, 3);
        m.spectrum_mut()[1] = 1.0;
        m.update(Rgb::BLACK, Rgb::WHITE, |_| true);
        assert!(m.frames() > 0);
        let frames = m.frames();

        m.set_num_leds(7);
        assert_eq!(m.colors(), vec![Rgb::BLACK; 7].as_slice());
        assert_eq!(m.peaks(), vec![0; 7].as_slice());
        assert_eq!(m.frames(), frames);
    }
}
