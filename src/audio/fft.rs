//! FFT spectrum probe and analysis utilities.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use super::analyzer::FrequencyProbe;
use super::frame::FrequencyFrame;
use super::source::AudioSignalSource;
use crate::params::audio_constants::{FFT_SIZE, FREQUENCY_BINS};
use crate::params::AnalyzerConfig;

/// Windowed FFT over the latest samples of a signal source
pub struct FftProbe {
    source: AudioSignalSource,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    samples: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    /// Smoothed linear magnitudes, carried across updates
    smoothed: Vec<f32>,
    smoothing: f32,
    min_decibels: f32,
    max_decibels: f32,
}

impl FftProbe {
    pub fn new(source: AudioSignalSource, config: &AnalyzerConfig) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        Self {
            source,
            fft,
            window: (0..FFT_SIZE).map(|i| blackman_window(i, FFT_SIZE)).collect(),
            samples: vec![0.0; FFT_SIZE],
            spectrum: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            smoothed: vec![0.0; FREQUENCY_BINS],
            smoothing: config.smoothing_time_constant,
            min_decibels: config.min_decibels,
            max_decibels: config.max_decibels,
        }
    }
}

impl FrequencyProbe for FftProbe {
    fn byte_frequency_data(&mut self, frame: &mut FrequencyFrame) {
        self.source.read_recent(&mut self.samples);

        // Apply Blackman window
        for ((bin, &s), &w) in self.spectrum.iter_mut().zip(&self.samples).zip(&self.window) {
            *bin = Complex::new(s * w, 0.0);
        }

        self.fft.process(&mut self.spectrum);

        let scale = 1.0 / FFT_SIZE as f32;
        for ((out, smoothed), bin) in frame
            .as_mut_slice()
            .iter_mut()
            .zip(self.smoothed.iter_mut())
            .zip(&self.spectrum)
        {
            let magnitude = bin.norm() * scale;
            *smoothed = self.smoothing * *smoothed + (1.0 - self.smoothing) * magnitude;
            *out = decibels_to_byte(
                linear_to_decibels(*smoothed),
                self.min_decibels,
                self.max_decibels,
            );
        }
    }
}

/// Blackman window (a = 0.16) over a periodic span of `size`
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let x = index as f32 / size as f32;
    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
}

/// Linear magnitude to dBFS; silence maps to negative infinity
pub fn linear_to_decibels(magnitude: f32) -> f32 {
    if magnitude <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * magnitude.log10()
    }
}

/// Map dBFS into [0, 255] over `[min_db, max_db]`, clamping outside
pub fn decibels_to_byte(db: f32, min_db: f32, max_db: f32) -> u8 {
    let scaled = (db - min_db) / (max_db - min_db) * 255.0;
    if scaled.is_nan() {
        return 0;
    }
    scaled.floor().clamp(0.0, 255.0) as u8
}
