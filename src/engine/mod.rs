//! Playback adapter
//!
//! Hands finished buffers to an output backend. The synthesis core never
//! waits on playback: `play` returns a [`Handle`] the caller polls from its
//! own loop and can stop at any time.

mod mixer;
mod player;
mod recorder;

pub use mixer::Mixer;
pub use player::{default_device_name, list_output_devices, Player};
pub use recorder::{write_wav, Recorder};

use crate::synth::{MonoWave, SampleRate, StereoWave};
use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A finished buffer ready for output
#[derive(Debug, Clone, PartialEq)]
pub enum Sound {
    Mono(MonoWave),
    Stereo(StereoWave),
}

impl Sound {
    pub fn rate(&self) -> SampleRate {
        match self {
            Sound::Mono(wave) => wave.rate(),
            Sound::Stereo(wave) => wave.rate(),
        }
    }

    pub fn channels(&self) -> u16 {
        match self {
            Sound::Mono(_) => 1,
            Sound::Stereo(_) => 2,
        }
    }

    /// Frames per channel
    pub fn len(&self) -> usize {
        match self {
            Sound::Mono(wave) => wave.len(),
            Sound::Stereo(wave) => wave.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn duration(&self) -> f64 {
        self.len() as f64 / self.rate().as_f64()
    }
}

impl From<MonoWave> for Sound {
    fn from(wave: MonoWave) -> Self {
        Sound::Mono(wave)
    }
}

impl From<StereoWave> for Sound {
    fn from(wave: StereoWave) -> Self {
        Sound::Stereo(wave)
    }
}

/// Logical output group, each with its own gain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GainGroup {
    #[default]
    Effects,
    Music,
}

fn default_effects_gain() -> f32 {
    0.8
}
fn default_music_gain() -> f32 {
    0.5
}

/// Output gain per group, each in [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputGains {
    #[serde(default = "default_effects_gain")]
    pub effects: f32,
    #[serde(default = "default_music_gain")]
    pub music: f32,
}

impl Default for OutputGains {
    fn default() -> Self {
        Self {
            effects: default_effects_gain(),
            music: default_music_gain(),
        }
    }
}

impl OutputGains {
    pub fn get(&self, group: GainGroup) -> f32 {
        match group {
            GainGroup::Effects => self.effects,
            GainGroup::Music => self.music,
        }
    }

    pub fn set(&mut self, group: GainGroup, gain: f32) {
        let gain = gain.clamp(0.0, 1.0);
        match group {
            GainGroup::Effects => self.effects = gain,
            GainGroup::Music => self.music = gain,
        }
    }
}

/// Flags shared between a playing voice and its handle
#[derive(Debug, Default)]
pub(crate) struct VoiceState {
    stopped: AtomicBool,
    finished: AtomicBool,
}

impl VoiceState {
    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub(crate) fn finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }
}

/// Caller-side view of a sound handed to a backend
#[derive(Debug, Clone)]
pub struct Handle {
    state: Arc<VoiceState>,
}

impl Handle {
    pub(crate) fn new(state: Arc<VoiceState>) -> Self {
        Self { state }
    }

    /// True until the sound has played out or been stopped
    pub fn is_busy(&self) -> bool {
        !self.state.finished.load(Ordering::SeqCst) && !self.state.stopped.load(Ordering::SeqCst)
    }

    /// Ask the backend to drop the sound; takes effect on its next buffer
    pub fn stop(&self) {
        self.state.stopped.store(true, Ordering::SeqCst);
    }
}

/// Something that can play sounds
pub trait Backend {
    /// Queue `sound` on `group` and return immediately
    fn play(&self, sound: Sound, group: GainGroup) -> Result<Handle>;

    /// Channel count negotiated with the device
    fn channels(&self) -> u16;

    /// Rate sounds must be rendered at
    fn sample_rate(&self) -> SampleRate;
}

/// Lock the shared mixer and queue a sound, checking its rate
pub(crate) fn enqueue(
    mixer: &Mutex<Mixer>,
    rate: SampleRate,
    sound: Sound,
    group: GainGroup,
) -> Result<Handle> {
    if sound.rate() != rate {
        bail!(
            "sound rendered at {} Hz but backend runs at {} Hz",
            sound.rate().hz(),
            rate.hz()
        );
    }
    let mut mixer = mixer.lock().map_err(|_| anyhow!("mixer lock poisoned"))?;
    Ok(mixer.play(&sound, group))
}

/// A backend without a device; audio is pulled by the caller
pub struct OfflineBackend {
    mixer: Mutex<Mixer>,
    rate: SampleRate,
    channels: u16,
}

impl OfflineBackend {
    pub fn new(rate: SampleRate, channels: u16, gains: OutputGains) -> Self {
        let channels = channels.max(1);
        Self {
            mixer: Mutex::new(Mixer::new(channels, gains)),
            rate,
            channels,
        }
    }

    /// Render the next `frames` frames as interleaved samples
    pub fn pull<T>(&self, frames: usize) -> Result<Vec<T>>
    where
        T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>,
    {
        let mut data = vec![T::EQUILIBRIUM; frames * self.channels as usize];
        let mut mixer = self.mixer.lock().map_err(|_| anyhow!("mixer lock poisoned"))?;
        mixer.render(&mut data);
        Ok(data)
    }

    pub fn set_gain(&self, group: GainGroup, gain: f32) -> Result<()> {
        let mut mixer = self.mixer.lock().map_err(|_| anyhow!("mixer lock poisoned"))?;
        mixer.set_gain(group, gain);
        Ok(())
    }
}

impl Backend for OfflineBackend {
    fn play(&self, sound: Sound, group: GainGroup) -> Result<Handle> {
        enqueue(&self.mixer, self.rate, sound, group)
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> SampleRate {
        self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate() -> SampleRate {
        SampleRate::new(1000).unwrap()
    }

    fn gains() -> OutputGains {
        OutputGains {
            effects: 1.0,
            music: 0.5,
        }
    }

    #[test]
    fn test_sound_metadata() {
        let mono: Sound = MonoWave::silence(500, rate()).into();
        assert_eq!(mono.channels(), 1);
        assert!((mono.duration() - 0.5).abs() < 1e-12);

        let stereo: Sound = MonoWave::silence(10, rate()).split(crate::synth::PowerRule::Mean).unwrap().into();
        assert_eq!(stereo.channels(), 2);
        assert_eq!(stereo.len(), 10);
    }

    #[test]
    fn test_output_gains_clamped() {
        let mut g = OutputGains::default();
        g.set(GainGroup::Music, 1.5);
        assert_eq!(g.get(GainGroup::Music), 1.0);
        g.set(GainGroup::Effects, -0.2);
        assert_eq!(g.get(GainGroup::Effects), 0.0);
    }

    #[test]
    fn test_handle_busy_until_played_out() {
        let backend = OfflineBackend::new(rate(), 1, gains());
        let handle = backend
            .play(MonoWave::new(vec![0.5; 4], rate()).into(), GainGroup::Effects)
            .unwrap();
        assert!(handle.is_busy());

        let first: Vec<f32> = backend.pull(2).unwrap();
        assert_eq!(first, vec![0.5, 0.5]);
        assert!(handle.is_busy());

        let rest: Vec<f32> = backend.pull(4).unwrap();
        assert_eq!(rest, vec![0.5, 0.5, 0.0, 0.0]);
        assert!(!handle.is_busy());
    }

    #[test]
    fn test_stop_silences_voice() {
        let backend = OfflineBackend::new(rate(), 1, gains());
        let handle = backend
            .play(MonoWave::new(vec![0.5; 100], rate()).into(), GainGroup::Effects)
            .unwrap();
        handle.stop();
        assert!(!handle.is_busy());
        let out: Vec<f32> = backend.pull(4).unwrap();
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_group_gain_applied() {
        let backend = OfflineBackend::new(rate(), 1, gains());
        backend
            .play(MonoWave::new(vec![0.8; 2], rate()).into(), GainGroup::Music)
            .unwrap();
        let out: Vec<f32> = backend.pull(2).unwrap();
        assert!(out.iter().all(|&s| (s - 0.4).abs() < 1e-6));
    }

    #[test]
    fn test_rate_mismatch_rejected() {
        let backend = OfflineBackend::new(rate(), 2, gains());
        let sound = MonoWave::silence(4, SampleRate::new(2000).unwrap()).into();
        assert!(backend.play(sound, GainGroup::Effects).is_err());
    }

    #[test]
    fn test_quantized_output() {
        let backend = OfflineBackend::new(rate(), 1, gains());
        backend
            .play(MonoWave::new(vec![1.0, -1.0, 0.0], rate()).into(), GainGroup::Effects)
            .unwrap();
        let out: Vec<i16> = backend.pull(3).unwrap();
        assert!(out[0] > 32000);
        assert!(out[1] < -32000);
        assert_eq!(out[2], 0);
    }
}
