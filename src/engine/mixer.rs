//! Mixer feeding the output device
//!
//! Holds every sound currently playing and sums them into the device
//! buffer:
//! - matches each sound's channel count to the device's
//! - applies the output gain of the sound's group
//! - clamps to [-1, 1] and converts to the device sample format

use super::{GainGroup, Handle, OutputGains, Sound, VoiceState};
use std::sync::Arc;

/// A sound being played, already laid out in device frames
struct Voice {
    /// Interleaved, `channels` samples per frame
    samples: Vec<f32>,
    position: usize,
    group: GainGroup,
    state: Arc<VoiceState>,
}

impl Voice {
    fn new(sound: &Sound, group: GainGroup, channels: usize) -> Self {
        Self {
            samples: interleave(sound, channels),
            position: 0,
            group,
            state: Arc::new(VoiceState::default()),
        }
    }

    fn is_done(&self) -> bool {
        self.position >= self.samples.len() || self.state.is_stopped()
    }
}

/// Lay a sound out as interleaved frames of `channels` samples
///
/// Mono is copied to every channel. Stereo is averaged for a mono device
/// and fills the first two channels of a wider one, leaving the rest silent.
fn interleave(sound: &Sound, channels: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(sound.len() * channels);
    match sound {
        Sound::Mono(wave) => {
            for &s in wave.samples() {
                out.extend(std::iter::repeat(s as f32).take(channels));
            }
        }
        Sound::Stereo(wave) => {
            for (&l, &r) in wave.left().samples().iter().zip(wave.right().samples()) {
                if channels == 1 {
                    out.push(((l + r) / 2.0) as f32);
                } else {
                    out.push(l as f32);
                    out.push(r as f32);
                    out.extend(std::iter::repeat(0.0).take(channels - 2));
                }
            }
        }
    }
    out
}

/// Sums active voices into device buffers
pub struct Mixer {
    channels: usize,
    gains: OutputGains,
    voices: Vec<Voice>,
    scratch: Vec<f32>,
}

impl Mixer {
    /// Create a mixer for a device with `channels` channels
    pub fn new(channels: u16, gains: OutputGains) -> Self {
        Self {
            channels: channels.max(1) as usize,
            gains,
            voices: Vec::new(),
            scratch: Vec::new(),
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn gains(&self) -> OutputGains {
        self.gains
    }

    pub fn set_gain(&mut self, group: GainGroup, gain: f32) {
        self.gains.set(group, gain);
    }

    /// Start a sound and return its handle
    pub fn play(&mut self, sound: &Sound, group: GainGroup) -> Handle {
        let voice = Voice::new(sound, group, self.channels);
        let handle = Handle::new(voice.state.clone());
        if voice.is_done() {
            voice.state.finish();
        } else {
            self.voices.push(voice);
        }
        handle
    }

    /// Number of voices still playing
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Fill an interleaved device buffer with the next block of audio
    pub fn render<T>(&mut self, data: &mut [T])
    where
        T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>,
    {
        self.scratch.clear();
        self.scratch.resize(data.len(), 0.0);

        for voice in &mut self.voices {
            if voice.state.is_stopped() {
                continue;
            }
            let gain = self.gains.get(voice.group);
            let remaining = &voice.samples[voice.position..];
            let n = remaining.len().min(self.scratch.len());
            for (acc, &s) in self.scratch.iter_mut().zip(&remaining[..n]) {
                *acc += s * gain;
            }
            voice.position += n;
        }

        self.voices.retain(|voice| {
            let done = voice.is_done();
            if done {
                voice.state.finish();
            }
            !done
        });

        for (out, &s) in data.iter_mut().zip(&self.scratch) {
            *out = T::from_sample(s.clamp(-1.0, 1.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{MonoWave, SampleRate, StereoWave};

    fn rate() -> SampleRate {
        SampleRate::new(1000).unwrap()
    }

    fn unity() -> OutputGains {
        OutputGains {
            effects: 1.0,
            music: 1.0,
        }
    }

    fn stereo(left: &[f64], right: &[f64]) -> Sound {
        StereoWave::new(
            MonoWave::new(left.to_vec(), rate()),
            MonoWave::new(right.to_vec(), rate()),
        )
        .unwrap()
        .into()
    }

    #[test]
    fn test_mono_to_stereo_device() {
        let mut mixer = Mixer::new(2, unity());
        mixer.play(&MonoWave::new(vec![0.25, -0.25], rate()).into(), GainGroup::Effects);
        let mut data = [0.0f32; 4];
        mixer.render(&mut data);
        assert_eq!(data, [0.25, 0.25, -0.25, -0.25]);
    }

    #[test]
    fn test_stereo_to_mono_device() {
        let mut mixer = Mixer::new(1, unity());
        mixer.play(&stereo(&[0.5, 1.0], &[0.0, 0.0]), GainGroup::Effects);
        let mut data = [0.0f32; 2];
        mixer.render(&mut data);
        assert_eq!(data, [0.25, 0.5]);
    }

    #[test]
    fn test_stereo_to_surround_device() {
        let mut mixer = Mixer::new(4, unity());
        mixer.play(&stereo(&[0.5], &[-0.5]), GainGroup::Effects);
        let mut data = [1.0f32; 4];
        mixer.render(&mut data);
        assert_eq!(data, [0.5, -0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_voices_sum_and_clip() {
        let mut mixer = Mixer::new(1, unity());
        mixer.play(&MonoWave::new(vec![0.75, 0.25], rate()).into(), GainGroup::Effects);
        mixer.play(&MonoWave::new(vec![0.75, 0.25], rate()).into(), GainGroup::Music);
        assert_eq!(mixer.active_voices(), 2);
        let mut data = [0.0f32; 2];
        mixer.render(&mut data);
        assert_eq!(data, [1.0, 0.5]);
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn test_empty_sound_finishes_immediately() {
        let mut mixer = Mixer::new(2, unity());
        let handle = mixer.play(&MonoWave::silence(0, rate()).into(), GainGroup::Effects);
        assert!(!handle.is_busy());
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn test_set_gain() {
        let mut mixer = Mixer::new(1, unity());
        mixer.set_gain(GainGroup::Effects, 0.0);
        mixer.play(&MonoWave::new(vec![0.5; 3], rate()).into(), GainGroup::Effects);
        let mut data = [1.0f32; 3];
        mixer.render(&mut data);
        assert_eq!(data, [0.0; 3]);
    }
}
