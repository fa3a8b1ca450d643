//! Audio analysis configuration and constants.

/// Spectrum analysis configuration (browser analyser-node model)
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Blend factor between the previous and current spectrum (0 = no smoothing)
    /// Must lie in [0, 1)
    pub smoothing_time_constant: f32,

    /// Magnitude mapped to byte value 0 (dBFS)
    pub min_decibels: f32,

    /// Magnitude mapped to byte value 255 (dBFS)
    pub max_decibels: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyzerConfig {
    /// Validate configuration (decibel range must be non-empty, etc.)
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..1.0).contains(&self.smoothing_time_constant) {
            return Err(format!(
                "Smoothing time constant must be in [0, 1), got {}",
                self.smoothing_time_constant
            ));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(format!(
                "min_decibels ({}) must be below max_decibels ({})",
                self.min_decibels, self.max_decibels
            ));
        }
        Ok(())
    }
}

/// Audio constants (compile-time, fixed frame layout)
pub mod audio_constants {
    /// FFT window size (samples)
    pub const FFT_SIZE: usize = 64;

    /// Bins per frequency frame (half the FFT window)
    pub const FREQUENCY_BINS: usize = FFT_SIZE / 2;

    /// Samples retained by a capture tap
    /// 4096 = ~85ms @ 48kHz, far more than one FFT window
    pub const TAP_CAPACITY: usize = 4096;
}
