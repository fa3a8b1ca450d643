//! WAV file played back against the wall clock as a signal source.

use std::path::Path;
use std::time::Instant;

use super::source::SignalSource;
use super::AudioError;

/// Pre-decoded mono clip whose "current" position follows real time.
///
/// Nothing is sent to an output device; the clip only feeds analysis.
pub struct WavSource {
    samples: Vec<f32>,
    sample_rate: u32,
    started: Instant,
    looping: bool,
}

impl WavSource {
    /// Decode a WAV file (int or float), downmixing to mono
    pub fn open(path: impl AsRef<Path>, looping: bool) -> Result<Self, AudioError> {
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / full_scale))
                    .collect::<Result<_, _>>()?
            }
        };

        let samples: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        if samples.is_empty() {
            return Err(AudioError::EmptyClip);
        }

        Ok(Self::from_samples(samples, spec.sample_rate, looping, Instant::now()))
    }

    pub fn from_samples(
        samples: Vec<f32>,
        sample_rate: u32,
        looping: bool,
        started: Instant,
    ) -> Self {
        Self {
            samples,
            sample_rate,
            started,
            looping,
        }
    }

    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Sample index reached `elapsed_secs` after start
    fn position(&self, elapsed_secs: f64) -> usize {
        (elapsed_secs * self.sample_rate as f64) as usize
    }

    /// Copy the window ending at `end` (exclusive) into `out`
    fn window_ending_at(&self, end: usize, out: &mut [f32]) -> usize {
        let len = self.samples.len();
        if len == 0 {
            out.fill(0.0);
            return 0;
        }
        if self.looping {
            let start = end as i64 - out.len() as i64;
            for (i, dst) in out.iter_mut().enumerate() {
                let idx = (start + i as i64).rem_euclid(len as i64) as usize;
                *dst = if start + (i as i64) < 0 { 0.0 } else { self.samples[idx] };
            }
            return out.len().min(end);
        }

        // Past the end of a one-shot clip: silence
        if end > len {
            out.fill(0.0);
            return 0;
        }

        let n = end.min(out.len());
        let pad = out.len() - n;
        out[..pad].fill(0.0);
        out[pad..].copy_from_slice(&self.samples[end - n..end]);
        n
    }
}

impl SignalSource for WavSource {
    fn read_recent(&self, out: &mut [f32]) -> usize {
        let end = self.position(self.started.elapsed().as_secs_f64());
        self.window_ending_at(end, out)
    }
}
