//! Windowed FFT magnitude analysis over a live sample stream.

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Converts raw input samples into a fixed-size magnitude spectrum.
///
/// Samples are written into a ring buffer; [`compute`](Self::compute) runs a
/// Hann-windowed forward FFT of twice the spectrum length and keeps the
/// positive-frequency magnitudes, DC at index 0.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    input: Vec<f32>,
    write_pos: usize,
    total_samples: u64,
    fft_buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    window: Vec<f32>,
    magnitudes: Vec<f32>,
}

impl SpectrumAnalyzer {
    /// Create an analyzer producing `spectrum_len` magnitude bins.
    pub fn new(spectrum_len: usize) -> Self {
        let fft_size = spectrum_len * 2;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch_len = fft.get_inplace_scratch_len();

        // Hann window
        let window: Vec<f32> = (0..fft_size)
            .map(|i| {
                let t = i as f32 / (fft_size - 1) as f32;
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * t).cos())
            })
            .collect();

        Self {
            fft,
            fft_size,
            input: vec![0.0; fft_size],
            write_pos: 0,
            total_samples: 0,
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            window,
            magnitudes: vec![0.0; spectrum_len],
        }
    }

    /// Number of magnitude bins produced.
    pub fn spectrum_len(&self) -> usize {
        self.magnitudes.len()
    }

    /// Append samples to the ring buffer. Non-finite samples are replaced
    /// with silence so they cannot contaminate the magnitudes.
    pub fn push_samples(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.input[self.write_pos] = if sample.is_finite() { sample } else { 0.0 };
            self.write_pos = (self.write_pos + 1) % self.fft_size;
        }
        self.total_samples += samples.len() as u64;
    }

    /// Recompute the magnitudes from the newest full window. A no-op until
    /// one full window of samples has been seen.
    pub fn compute(&mut self) {
        if self.total_samples < self.fft_size as u64 {
            return;
        }

        // Unwrap the ring buffer: the oldest sample sits at write_pos.
        for i in 0..self.fft_size {
            let src = (self.write_pos + i) % self.fft_size;
            self.fft_buffer[i] = Complex::new(self.input[src] * self.window[i], 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.scratch);

        let norm = 1.0 / (self.fft_size as f32).sqrt();
        for (i, magnitude) in self.magnitudes.iter_mut().enumerate() {
            *magnitude = self.fft_buffer[i].norm() * norm;
        }
    }

    /// Current magnitudes, DC at index 0.
    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    /// Copy the magnitudes into `out`, zero-filling any excess length.
    pub fn copy_magnitudes_into(&self, out: &mut [f32]) {
        let n = out.len().min(self.magnitudes.len());
        out[..n].copy_from_slice(&self.magnitudes[..n]);
        out[n..].fill(0.0);
    }

    /// Discard all buffered samples and zero the magnitudes.
    pub fn reset(&mut self) {
        self.input.fill(0.0);
        self.write_pos = 0;
        self.total_samples = 0;
        self.magnitudes.fill(0.0);
    }
}
