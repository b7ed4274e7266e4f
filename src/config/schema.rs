//! Configuration schema definitions

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::f64::consts::PI;

use crate::engine::{GainGroup, OutputGains};
use crate::synth::{Channel, EnvelopeParams, FilterType, PhaserParams, PowerRule, Waveform};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SfxConfig {
    /// Audio output settings
    pub audio: AudioConfig,

    /// Output gain per group
    #[serde(default)]
    pub gain: OutputGains,

    /// Named effect presets
    #[serde(default)]
    pub effects: Vec<EffectConfig>,
}

impl SfxConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate audio settings
        if self.audio.sample_rate < 8000 || self.audio.sample_rate > 192000 {
            bail!("Sample rate must be between 8000 and 192000");
        }
        if let Some(size) = self.audio.buffer_size {
            if !(64..=8192).contains(&size) {
                bail!("Buffer size must be between 64 and 8192");
            }
        }

        // Validate gains
        for (group, gain) in [("effects", self.gain.effects), ("music", self.gain.music)] {
            if !(0.0..=1.0).contains(&gain) {
                bail!("Gain for {} must be between 0.0 and 1.0", group);
            }
        }

        // Validate effects
        let mut names = HashSet::new();
        for effect in &self.effects {
            if !names.insert(effect.name.as_str()) {
                bail!("Duplicate effect name '{}'", effect.name);
            }
            if effect.notes.is_empty() {
                bail!("Effect '{}' has no notes", effect.name);
            }
            if effect.clamp <= 0.0 {
                bail!("Effect '{}' clamp limit must be positive", effect.name);
            }
        }

        Ok(())
    }

    /// Look up an effect by name
    pub fn effect(&self, name: &str) -> Option<&EffectConfig> {
        self.effects.iter().find(|e| e.name == name)
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz for offline rendering (default: 44100)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Output device name (None = default device)
    #[serde(default)]
    pub device: Option<String>,

    /// Buffer size hint in frames
    #[serde(default)]
    pub buffer_size: Option<u32>,
}

fn default_sample_rate() -> u32 { 44100 }

/// A named effect: generator, notes and transform chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectConfig {
    /// Unique name for this effect
    pub name: String,

    /// Output group (default: effects)
    #[serde(default)]
    pub group: GainGroup,

    /// Oscillator rendering each note
    pub generator: Waveform,

    /// Notes played back to back
    pub notes: Vec<NoteConfig>,

    /// Optional biquad filter
    #[serde(default)]
    pub filter: Option<FilterConfig>,

    /// Optional mono phaser
    #[serde(default)]
    pub phaser: Option<PhaserParams>,

    /// Optional attack/decay envelope
    #[serde(default)]
    pub envelope: Option<EnvelopeParams>,

    /// Target RMS level
    #[serde(default)]
    pub normalize_rms: Option<f64>,

    /// Symmetric clamp limit applied last (default: 1.0)
    #[serde(default = "default_clamp")]
    pub clamp: f64,

    /// Stereo stage; absent means the effect stays mono
    #[serde(default)]
    pub stereo: Option<StereoConfig>,
}

fn default_clamp() -> f64 { 1.0 }

/// One note of an effect
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NoteConfig {
    /// Frequency in Hz
    pub hz: f64,
    /// Duration in seconds
    pub sec: f64,
}

/// Biquad filter settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FilterConfig {
    pub kind: FilterType,
    pub cutoff: f64,
    #[serde(default = "default_q")]
    pub q: f64,
}

fn default_q() -> f64 { 0.707 }

/// Stereo imaging chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StereoConfig {
    /// Rule for the mono split (default: root_mean_square)
    #[serde(default = "default_rule")]
    pub rule: PowerRule,

    /// Static pan position in [-1, 1]
    #[serde(default)]
    pub pan: Option<f64>,

    /// Integer-sample delay widening
    #[serde(default)]
    pub haas: Option<HaasConfig>,

    /// Fractional-delay widening
    #[serde(default)]
    pub phase_widen: Option<PhaseWidenConfig>,

    /// Side gain for mid-side processing
    #[serde(default)]
    pub mid_side: Option<f64>,

    /// Phaser with offset sweeps per channel
    #[serde(default)]
    pub phaser: Option<StereoPhaserConfig>,
}

fn default_rule() -> PowerRule { PowerRule::RootMeanSquare }

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HaasConfig {
    pub channel: Channel,
    pub delay: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PhaseWidenConfig {
    pub channel: Channel,
    pub ref_hz: f64,
    pub phase_deg: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StereoPhaserConfig {
    #[serde(flatten)]
    pub params: PhaserParams,
    /// Right-channel sweep offset in radians (default: pi)
    #[serde(default = "default_phase_offset")]
    pub phase_offset: f64,
}

fn default_phase_offset() -> f64 { PI }
