//! Per-frame spectrum analyzer bound to one signal source.

use log::warn;

use super::fft::FftProbe;
use super::frame::FrequencyFrame;
use super::source::AudioSignalSource;
use crate::params::AnalyzerConfig;

/// Anything that can write a byte spectrum for the current instant
pub trait FrequencyProbe: Send {
    fn byte_frequency_data(&mut self, frame: &mut FrequencyFrame);
}

/// Converts a live signal into a [`FrequencyFrame`] refreshed once per tick.
///
/// Cheap to build; rebinding to another source means building a new one.
/// Without a source every frame stays all-zero.
pub struct Analyzer {
    probe: Option<Box<dyn FrequencyProbe>>,
    data: FrequencyFrame,
}

impl Analyzer {
    /// Bind to `source`; `None` yields a silent analyzer
    pub fn new(source: Option<AudioSignalSource>, config: &AnalyzerConfig) -> Self {
        let probe = source.map(|source| {
            let probe = match config.validate() {
                Ok(()) => FftProbe::new(source, config),
                Err(e) => {
                    warn!("Invalid analyzer config ({}), using defaults", e);
                    FftProbe::new(source, &AnalyzerConfig::default())
                }
            };
            Box::new(probe) as Box<dyn FrequencyProbe>
        });

        Self {
            probe,
            data: FrequencyFrame::default(),
        }
    }

    pub fn silent() -> Self {
        Self {
            probe: None,
            data: FrequencyFrame::default(),
        }
    }

    /// Analyzer over an arbitrary probe (synthetic or pre-analysed signals)
    pub fn from_probe<P>(probe: P) -> Self
    where
        P: FrequencyProbe + 'static,
    {
        Self {
            probe: Some(Box::new(probe)),
            data: FrequencyFrame::default(),
        }
    }

    /// Pull the latest spectrum into [`Analyzer::data`]
    pub fn update(&mut self) {
        if let Some(probe) = self.probe.as_mut() {
            probe.byte_frequency_data(&mut self.data);
        }
    }

    /// Most recent spectrum (all-zero before the first update)
    pub fn data(&self) -> &FrequencyFrame {
        &self.data
    }

    pub fn is_bound(&self) -> bool {
        self.probe.is_some()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::silent()
    }
}

/// Probe that reports the same spectrum on every update
#[derive(Debug, Clone)]
pub struct FixedProbe(pub FrequencyFrame);

impl FrequencyProbe for FixedProbe {
    fn byte_frequency_data(&mut self, frame: &mut FrequencyFrame) {
        *frame = self.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SampleTap;
    use std::sync::Arc;

    #[test]
    fn test_absent_source_reads_zero_before_update() {
        let analyzer = Analyzer::new(None, &AnalyzerConfig::default());
        assert!(!analyzer.is_bound());
        assert!(analyzer.data().is_silent());
    }

    #[test]
    fn test_absent_source_stays_zero_after_update() {
        let mut analyzer = Analyzer::new(None, &AnalyzerConfig::default());
        for _ in 0..3 {
            analyzer.update();
        }
        assert!(analyzer.data().is_silent());
    }

    #[test]
    fn test_fixed_probe_visible_after_update() {
        let frame = FrequencyFrame::from_leading(&[200, 150, 100]);
        let mut analyzer = Analyzer::from_probe(FixedProbe(frame));

        // Nothing read until update
        assert!(analyzer.data().is_silent());

        analyzer.update();
        assert_eq!(*analyzer.data(), frame);
    }

    #[test]
    fn test_invalid_config_falls_back() {
        let tap: AudioSignalSource = Arc::new(SampleTap::new(128));
        let config = AnalyzerConfig {
            min_decibels: 0.0,
            max_decibels: -10.0,
            ..Default::default()
        };

        let mut analyzer = Analyzer::new(Some(tap), &config);
        assert!(analyzer.is_bound());
        analyzer.update();
        assert!(analyzer.data().is_silent());
    }
}
