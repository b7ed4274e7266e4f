//! WAV file recorder
//!
//! Writes rendered sounds to 32-bit float WAV files.

use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

use super::Sound;
use crate::synth::SampleRate;

/// WAV file recorder
pub struct Recorder {
    writer: WavWriter<BufWriter<File>>,
    rate: SampleRate,
    channels: u16,
    frames_written: u64,
}

impl Recorder {
    /// Create a new recorder
    ///
    /// # Arguments
    /// * `path` - Output file path
    /// * `rate` - Sample rate of everything written
    /// * `channels` - 1 for mono, 2 for stereo
    pub fn new(path: &Path, rate: SampleRate, channels: u16) -> Result<Self> {
        if !(1..=2).contains(&channels) {
            bail!("recorder supports 1 or 2 channels, got {}", channels);
        }
        let spec = WavSpec {
            channels,
            sample_rate: rate.hz(),
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let writer = WavWriter::create(path, spec)
            .with_context(|| format!("failed to create WAV file: {:?}", path))?;

        Ok(Self {
            writer,
            rate,
            channels,
            frames_written: 0,
        })
    }

    pub fn rate(&self) -> SampleRate {
        self.rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Get the number of frames written
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Get the duration recorded in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames_written as f64 / self.rate.as_f64()
    }

    /// Append a sound, which must match the recorder's rate and channels
    pub fn write_sound(&mut self, sound: &Sound) -> Result<()> {
        if sound.rate() != self.rate {
            bail!(
                "sound is {} Hz, recorder is {} Hz",
                sound.rate().hz(),
                self.rate.hz()
            );
        }
        if sound.channels() != self.channels {
            bail!(
                "sound has {} channels, recorder has {}",
                sound.channels(),
                self.channels
            );
        }

        match sound {
            Sound::Mono(wave) => {
                for &s in wave.samples() {
                    self.write(s)?;
                }
            }
            Sound::Stereo(wave) => {
                for (&l, &r) in wave.left().samples().iter().zip(wave.right().samples()) {
                    self.write(l)?;
                    self.write(r)?;
                }
            }
        }
        self.frames_written += sound.len() as u64;
        Ok(())
    }

    fn write(&mut self, sample: f64) -> Result<()> {
        self.writer
            .write_sample(sample as f32)
            .context("failed to write sample")
    }

    /// Finalize the WAV file
    ///
    /// This must be called to properly close the file and write the header.
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize().context("failed to finalize WAV file")
    }
}

/// Write one sound to `path` as a complete WAV file
pub fn write_wav(path: &Path, sound: &Sound) -> Result<()> {
    let mut recorder = Recorder::new(path, sound.rate(), sound.channels())?;
    recorder.write_sound(sound)?;
    info!(path = ?path, seconds = recorder.duration_secs(), "wrote WAV");
    recorder.finalize()
}
