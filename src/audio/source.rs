//! Audio signal sources and the caller-owned capture context.
//!
//! The visualization core only ever reads from a source. Streams, devices
//! and their lifetimes belong to whoever built the [`AudioContext`].

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Sample;
use log::{info, warn};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use super::AudioError;
use crate::params::audio_constants::TAP_CAPACITY;

/// Something that can report the most recent mono samples of a live signal
pub trait SignalSource: Send + Sync {
    /// Fill `out` with the most recent samples, oldest first.
    ///
    /// Missing history is zero-filled at the front. Returns the number of
    /// real samples written.
    fn read_recent(&self, out: &mut [f32]) -> usize;
}

/// Shared, read-only handle to a live signal
pub type AudioSignalSource = Arc<dyn SignalSource>;

/// Bounded ring of recent mono samples fed by an audio callback
pub struct SampleTap {
    ring: Mutex<VecDeque<f32>>,
    capacity: usize,
}

impl SampleTap {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append samples, dropping the oldest past capacity
    pub fn push_samples<I>(&self, samples: I)
    where
        I: IntoIterator<Item = f32>,
    {
        let mut ring = self.ring.lock().unwrap_or_else(PoisonError::into_inner);
        for s in samples {
            if ring.len() == self.capacity {
                ring.pop_front();
            }
            ring.push_back(s);
        }
    }
}

impl Default for SampleTap {
    fn default() -> Self {
        Self::new(TAP_CAPACITY)
    }
}

impl SignalSource for SampleTap {
    fn read_recent(&self, out: &mut [f32]) -> usize {
        let ring = self.ring.lock().unwrap_or_else(PoisonError::into_inner);
        let n = ring.len().min(out.len());
        let pad = out.len() - n;
        out[..pad].fill(0.0);
        for (dst, src) in out[pad..].iter_mut().zip(ring.iter().skip(ring.len() - n)) {
            *dst = *src;
        }
        n
    }
}

/// Caller-owned capture session: one per call, hands out sample taps.
///
/// Dropping the context stops every stream it opened.
pub struct AudioContext {
    host: cpal::Host,
    streams: Vec<cpal::Stream>,
}

impl AudioContext {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
            streams: Vec::new(),
        }
    }

    /// Open a capture stream and return a tap fed by it.
    ///
    /// `device_name` selects an input device by exact name; `None` picks the
    /// host default.
    pub fn open_input(&mut self, device_name: Option<&str>) -> Result<Arc<SampleTap>, AudioError> {
        let device = match device_name {
            Some(name) => self
                .host
                .input_devices()?
                .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                .ok_or_else(|| AudioError::NoInputDevice(name.to_string()))?,
            None => self
                .host
                .default_input_device()
                .ok_or_else(|| AudioError::NoInputDevice("default".to_string()))?,
        };

        let supported = device.default_input_config()?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        info!(
            "Audio input: {} @ {}Hz, {} channel(s)",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            config.sample_rate.0,
            config.channels
        );

        let tap = Arc::new(SampleTap::default());
        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_capture::<f32>(&device, &config, Arc::clone(&tap))?,
            cpal::SampleFormat::I16 => build_capture::<i16>(&device, &config, Arc::clone(&tap))?,
            cpal::SampleFormat::U16 => build_capture::<u16>(&device, &config, Arc::clone(&tap))?,
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        };
        stream.play()?;

        self.streams.push(stream);
        Ok(tap)
    }
}

impl Default for AudioContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an input stream that downmixes to mono into `tap`
fn build_capture<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    tap: Arc<SampleTap>,
) -> Result<cpal::Stream, AudioError>
where
    T: cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    let channels = config.channels.max(1) as usize;
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            tap.push_samples(data.chunks(channels).map(|frame| {
                frame.iter().map(|s| s.to_sample::<f32>()).sum::<f32>() / channels as f32
            }));
        },
        |err| warn!("Audio input stream error: {}", err),
        None,
    )?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tap_reads_zeros() {
        let tap = SampleTap::new(16);
        let mut out = [1.0f32; 8];
        assert_eq!(tap.read_recent(&mut out), 0);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_partial_history_is_right_aligned() {
        let tap = SampleTap::new(16);
        tap.push_samples([0.1, 0.2, 0.3]);

        let mut out = [9.0f32; 5];
        assert_eq!(tap.read_recent(&mut out), 3);
        assert_eq!(out, [0.0, 0.0, 0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_tap_keeps_most_recent_samples() {
        let tap = SampleTap::new(4);
        tap.push_samples((0..10).map(|i| i as f32));

        let mut out = [0.0f32; 4];
        assert_eq!(tap.read_recent(&mut out), 4);
        assert_eq!(out, [6.0, 7.0, 8.0, 9.0]);

        let mut short = [0.0f32; 2];
        tap.read_recent(&mut short);
        assert_eq!(short, [8.0, 9.0]);
    }
}
