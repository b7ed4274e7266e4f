//! Rendering configured effect presets

use crate::config::{EffectConfig, StereoConfig};
use crate::engine::Sound;
use crate::error::Result;
use crate::synth::{Generator, MonoWave, Note, SampleRate, Sequencer, StereoWave};
use tracing::debug;

/// Render an effect preset at `rate`
///
/// Mono stages run first (filter, phaser, envelope, RMS normalization,
/// clamp). If a stereo stage is configured the result is split and goes
/// through pan, Haas delay, phase widening, mid-side and the stereo phaser
/// in that order, after which both channels are clamped again.
pub fn render(effect: &EffectConfig, rate: SampleRate) -> Result<Sound> {
    let notes = effect
        .notes
        .iter()
        .map(|n| Note::new(n.hz, n.sec))
        .collect::<Result<Vec<_>>>()?;
    let generator = Generator::new(effect.generator, rate)?;
    let mut wave = Sequencer::new(generator).sequence(&notes)?;

    if let Some(filter) = &effect.filter {
        wave = wave.filter(filter.kind, filter.cutoff, filter.q)?;
    }
    if let Some(phaser) = &effect.phaser {
        wave = wave.phaser(phaser)?;
    }
    if let Some(envelope) = &effect.envelope {
        wave = wave.envelope(envelope)?;
    }
    if let Some(target) = effect.normalize_rms {
        wave = wave.normalize_rms(target);
    }
    wave = wave.clamp(-effect.clamp, effect.clamp)?;

    let sound = match &effect.stereo {
        None => Sound::Mono(wave),
        Some(stereo) => Sound::Stereo(render_stereo(stereo, wave, effect.clamp)?),
    };
    debug!(
        effect = %effect.name,
        frames = sound.len(),
        channels = sound.channels(),
        "rendered effect"
    );
    Ok(sound)
}

impl EffectConfig {
    /// Render this preset at `rate`
    pub fn render(&self, rate: SampleRate) -> Result<Sound> {
        render(self, rate)
    }
}

fn render_stereo(stereo: &StereoConfig, wave: MonoWave, limit: f64) -> Result<StereoWave> {
    let mut out = wave.split(stereo.rule)?;
    if let Some(pan) = stereo.pan {
        out = out.pan(pan, stereo.rule)?;
    }
    if let Some(haas) = &stereo.haas {
        out = out.haas_widen(haas.channel, haas.delay)?;
    }
    if let Some(widen) = &stereo.phase_widen {
        out = out.stereo_phase_widen(widen.channel, widen.ref_hz, widen.phase_deg)?;
    }
    if let Some(side_gain) = stereo.mid_side {
        out = out.stereo_mid_side(side_gain)?;
    }
    if let Some(phaser) = &stereo.phaser {
        out = out.stereo_phaser(&phaser.params, phaser.phase_offset)?;
    }
    // Mid-side gain and phaser feedback can push past the mono clamp
    let (left, right) = out.into_channels();
    StereoWave::new(left.clamp(-limit, limit)?, right.clamp(-limit, limit)?)
}
