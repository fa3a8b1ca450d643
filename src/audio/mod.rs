//! Live audio capture and per-frame spectrum analysis.
//!
//! Capture streams are opened by a caller-owned [`AudioContext`]; the
//! renderer only holds read handles ([`AudioSignalSource`]) and turns them
//! into 32-bin byte spectra through an [`Analyzer`].

mod analyzer;
mod fft;
mod frame;
mod source;
mod wav;

use thiserror::Error;

// Re-export public types
pub use analyzer::{Analyzer, FixedProbe, FrequencyProbe};
pub use fft::{blackman_window, decibels_to_byte, linear_to_decibels, FftProbe};
pub use frame::FrequencyFrame;
pub use source::{AudioContext, AudioSignalSource, SampleTap, SignalSource};
pub use wav::WavSource;

/// Audio capture and decoding errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio input device found: {0}")]
    NoInputDevice(String),

    #[error("Failed to enumerate audio devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("Failed to get audio config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("Failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read WAV file: {0}")]
    Wav(#[from] hound::Error),

    #[error("Audio clip contains no samples")]
    EmptyClip,
}
