//! Mono and stereo waveform buffers
//!
//! Samples are normalized floats, nominally in [-1.0, 1.0]. Transforms never
//! mutate a wave; they return a new one.

use super::SampleRate;
use crate::error::{Result, SynthError};
use serde::{Deserialize, Serialize};

/// One channel of audio at a known sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct MonoWave {
    samples: Vec<f64>,
    rate: SampleRate,
}

impl MonoWave {
    pub fn new(samples: Vec<f64>, rate: SampleRate) -> Self {
        Self { samples, rate }
    }

    /// A buffer of `len` zero samples
    pub fn silence(len: usize, rate: SampleRate) -> Self {
        Self::new(vec![0.0; len], rate)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    pub fn rate(&self) -> SampleRate {
        self.rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length in seconds
    pub fn duration(&self) -> f64 {
        self.len() as f64 / self.rate.as_f64()
    }

    /// Root mean square level; zero for an empty buffer
    pub fn rms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = self.samples.iter().map(|s| s * s).sum();
        (sum_sq / self.samples.len() as f64).sqrt()
    }

    /// Largest absolute sample
    pub fn peak(&self) -> f64 {
        self.samples.iter().fold(0.0f64, |acc, s| acc.max(s.abs()))
    }

    /// Append `other` after this wave
    pub fn concat(&self, other: &MonoWave) -> Result<MonoWave> {
        self.check_rate(other)?;
        let mut samples = Vec::with_capacity(self.len() + other.len());
        samples.extend_from_slice(&self.samples);
        samples.extend_from_slice(&other.samples);
        Ok(MonoWave::new(samples, self.rate))
    }

    /// Apply `f` to every sample
    pub fn map(&self, f: impl Fn(f64) -> f64) -> MonoWave {
        MonoWave::new(self.samples.iter().map(|&s| f(s)).collect(), self.rate)
    }

    pub(crate) fn check_rate(&self, other: &MonoWave) -> Result<()> {
        if self.rate != other.rate {
            return Err(SynthError::SampleRateMismatch {
                left: self.rate.hz(),
                right: other.rate.hz(),
            });
        }
        Ok(())
    }

    /// Fail unless `other` has the same rate and length
    pub(crate) fn check_aligned(&self, other: &MonoWave) -> Result<()> {
        self.check_rate(other)?;
        if self.len() != other.len() {
            return Err(SynthError::LengthMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        Ok(())
    }
}

/// Selects one side of a stereo pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Left,
    Right,
}

/// A left/right pair of equal-length mono waves
#[derive(Debug, Clone, PartialEq)]
pub struct StereoWave {
    left: MonoWave,
    right: MonoWave,
}

impl StereoWave {
    /// Pair two channels, which must share rate and length
    pub fn new(left: MonoWave, right: MonoWave) -> Result<Self> {
        left.check_aligned(&right)?;
        Ok(Self { left, right })
    }

    pub fn left(&self) -> &MonoWave {
        &self.left
    }

    pub fn right(&self) -> &MonoWave {
        &self.right
    }

    pub fn channel(&self, channel: Channel) -> &MonoWave {
        match channel {
            Channel::Left => &self.left,
            Channel::Right => &self.right,
        }
    }

    pub fn into_channels(self) -> (MonoWave, MonoWave) {
        (self.left, self.right)
    }

    pub fn rate(&self) -> SampleRate {
        self.left.rate()
    }

    /// Frames per channel
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn duration(&self) -> f64 {
        self.left.duration()
    }

    /// Replace one channel, keeping the other
    pub(crate) fn with_channel(&self, channel: Channel, wave: MonoWave) -> Result<StereoWave> {
        match channel {
            Channel::Left => StereoWave::new(wave, self.right.clone()),
            Channel::Right => StereoWave::new(self.left.clone(), wave),
        }
    }

    /// Both channels as `[left, right]` slices for gain-matrix application
    pub(crate) fn as_channels(&self) -> [&[f64]; 2] {
        [self.left.samples(), self.right.samples()]
    }

    /// Rebuild a pair from the output of a 2-row gain application
    pub(crate) fn from_channels(mut channels: Vec<Vec<f64>>, rate: SampleRate) -> Result<StereoWave> {
        if channels.len() != 2 {
            return Err(SynthError::ChannelCountMismatch {
                expected: 2,
                actual: channels.len(),
            });
        }
        let right = channels.pop().unwrap_or_default();
        let left = channels.pop().unwrap_or_default();
        StereoWave::new(MonoWave::new(left, rate), MonoWave::new(right, rate))
    }
}
