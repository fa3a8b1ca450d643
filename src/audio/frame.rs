//! Fixed-size byte spectrum shared between analysis and rendering.

use std::ops::Index;

use crate::params::audio_constants::FREQUENCY_BINS;

/// Byte-quantised spectral magnitudes, lowest frequency first.
///
/// Always fully initialised; a fresh frame is all zeros.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrequencyFrame([u8; FREQUENCY_BINS]);

impl Default for FrequencyFrame {
    fn default() -> Self {
        Self([0; FREQUENCY_BINS])
    }
}

impl FrequencyFrame {
    /// Build a frame from leading bins; the rest stay zero
    pub fn from_leading(leading: &[u8]) -> Self {
        let mut frame = Self::default();
        let n = leading.len().min(FREQUENCY_BINS);
        frame.0[..n].copy_from_slice(&leading[..n]);
        frame
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0
    }

    /// Bin 0 normalised to [0, 1]
    pub fn bass(&self) -> f32 {
        self.normalized(0)
    }

    /// Bin 1 normalised to [0, 1]
    pub fn mid(&self) -> f32 {
        self.normalized(1)
    }

    /// Bin 2 normalised to [0, 1]
    pub fn treble(&self) -> f32 {
        self.normalized(2)
    }

    pub fn normalized(&self, bin: usize) -> f32 {
        self.0[bin] as f32 / 255.0
    }

    pub fn is_silent(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl Index<usize> for FrequencyFrame {
    type Output = u8;

    fn index(&self, bin: usize) -> &u8 {
        &self.0[bin]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_frame_is_silent() {
        let frame = FrequencyFrame::default();
        assert!(frame.is_silent());
        assert_eq!(frame.as_slice().len(), FREQUENCY_BINS);
    }

    #[test]
    fn test_band_accessors() {
        let frame = FrequencyFrame::from_leading(&[255, 51, 0]);
        assert_eq!(frame.bass(), 1.0);
        assert!((frame.mid() - 0.2).abs() < 1e-6);
        assert_eq!(frame.treble(), 0.0);
        assert_eq!(frame[1], 51);
    }

    #[test]
    fn test_from_leading_truncates() {
        let long = [7u8; FREQUENCY_BINS + 8];
        let frame = FrequencyFrame::from_leading(&long);
        assert!(frame.as_slice().iter().all(|&b| b == 7));
    }
}
