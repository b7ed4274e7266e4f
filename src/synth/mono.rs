//! Transforms over mono buffers
//!
//! Every method returns a fresh wave and leaves `self` untouched.

use super::filter::{self, FilterType, PhaserParams};
use super::gain::{create_gain_matrix, PowerRule};
use super::oscillator::{am_gain, integrate_phase};
use super::{EnvelopeParams, MonoWave, SampleRate, StereoWave};
use crate::error::{Result, SynthError};

/// Below this RMS a buffer is treated as silent
const SILENCE_RMS: f64 = 1e-9;

impl MonoWave {
    /// Limit every sample to `[min, max]`
    pub fn clamp(&self, min: f64, max: f64) -> Result<MonoWave> {
        if !(min <= max) {
            return Err(SynthError::param("min", format!("{min} above max {max}")));
        }
        Ok(self.map(|s| s.clamp(min, max)))
    }

    /// Multiply by a constant gain
    pub fn scale(&self, gain: f64) -> MonoWave {
        self.map(|s| s * gain)
    }

    /// Downmix with `other` through a 2 -> 1 gain matrix
    pub fn mix(&self, other: &MonoWave, rule: PowerRule) -> Result<MonoWave> {
        self.check_aligned(other)?;
        let gains = create_gain_matrix(2, 1, 0.0, rule)?;
        let mut out = gains.apply(&[self.samples(), other.samples()])?;
        Ok(MonoWave::new(out.pop().unwrap_or_default(), self.rate()))
    }

    /// Tremolo driven by an external modulator in [-1, 1]
    pub fn amplitude_modulate(&self, modulator: &MonoWave, depth: f64) -> Result<MonoWave> {
        self.check_aligned(modulator)?;
        if !(0.0..=1.0).contains(&depth) {
            return Err(SynthError::param("depth", format!("{depth} outside [0, 1]")));
        }
        let samples = self
            .samples()
            .iter()
            .zip(modulator.samples())
            .map(|(s, m)| s * am_gain(*m, depth))
            .collect();
        Ok(MonoWave::new(samples, self.rate()))
    }

    /// A sine carrier at `base_hz` whose frequency follows `modulator`
    ///
    /// The output has the modulator's length and rate.
    pub fn frequency_modulate(modulator: &MonoWave, base_hz: f64, deviation_hz: f64) -> Result<MonoWave> {
        let rate = modulator.rate();
        rate.check_frequency(base_hz)?;
        if !deviation_hz.is_finite() || deviation_hz < 0.0 {
            return Err(SynthError::param("deviation_hz", "must be >= 0"));
        }
        let samples = integrate_phase(
            base_hz,
            deviation_hz,
            modulator.samples().iter().copied(),
            rate.as_f64(),
        );
        Ok(MonoWave::new(samples, rate))
    }

    /// Biquad low/high/band-pass
    pub fn filter(&self, filter_type: FilterType, cutoff: f64, q: f64) -> Result<MonoWave> {
        let samples = filter::biquad(self.samples(), self.rate(), filter_type, cutoff, q)?;
        Ok(MonoWave::new(samples, self.rate()))
    }

    /// Swept all-pass phaser
    pub fn phaser(&self, params: &PhaserParams) -> Result<MonoWave> {
        let samples = filter::phaser(self.samples(), self.rate(), params)?;
        Ok(MonoWave::new(samples, self.rate()))
    }

    /// Shape with an attack ramp and double exponential decay
    pub fn envelope(&self, params: &EnvelopeParams) -> Result<MonoWave> {
        let curve = params.curve(self.len(), self.rate())?;
        let samples = self.samples().iter().zip(curve).map(|(s, g)| s * g).collect();
        Ok(MonoWave::new(samples, self.rate()))
    }

    /// Scale to `target_rms`; a silent buffer comes back unchanged
    pub fn normalize_rms(&self, target_rms: f64) -> MonoWave {
        let rms = self.rms();
        if rms < SILENCE_RMS {
            return self.clone();
        }
        self.scale(target_rms / rms)
    }

    /// Turn this wave into one side of a stereo pair, or split it
    ///
    /// With `left` given, `self` becomes the right channel; with `right`
    /// given, `self` becomes the left. With neither, the wave is placed at
    /// centre through the 1 -> 2 pan law of `rule`. Giving both is an error.
    pub fn to_stereo(
        &self,
        left: Option<&MonoWave>,
        right: Option<&MonoWave>,
        rule: PowerRule,
    ) -> Result<StereoWave> {
        let rate = self.rate();
        match (left, right) {
            (Some(_), Some(_)) => Err(SynthError::param(
                "left/right",
                "supply at most one channel to merge with",
            )),
            (Some(left), None) => merge(left, self, rule, rate),
            (None, Some(right)) => merge(self, right, rule, rate),
            (None, None) => {
                let gains = create_gain_matrix(1, 2, 0.0, rule)?;
                StereoWave::from_channels(gains.apply(&[self.samples()])?, rate)
            }
        }
    }

    /// Centre-panned split; shorthand for `to_stereo(None, None, rule)`
    pub fn split(&self, rule: PowerRule) -> Result<StereoWave> {
        self.to_stereo(None, None, rule)
    }
}

fn merge(left: &MonoWave, right: &MonoWave, rule: PowerRule, rate: SampleRate) -> Result<StereoWave> {
    left.check_aligned(right)?;
    let gains = create_gain_matrix(2, 2, 0.0, rule)?;
    StereoWave::from_channels(gains.apply(&[left.samples(), right.samples()])?, rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{Generator, Note};

    fn rate() -> SampleRate {
        SampleRate::new(8000).unwrap()
    }

    fn wave(samples: &[f64]) -> MonoWave {
        MonoWave::new(samples.to_vec(), rate())
    }

    fn tone(hz: f64, sec: f64) -> MonoWave {
        Generator::sine(rate()).generate(&Note::new(hz, sec).unwrap()).unwrap()
    }

    #[test]
    fn test_clamp() {
        let out = wave(&[-2.0, -0.5, 0.5, 2.0]).clamp(-1.0, 1.0).unwrap();
        assert_eq!(out.samples(), &[-1.0, -0.5, 0.5, 1.0]);
        assert!(wave(&[0.0]).clamp(1.0, -1.0).is_err());
    }

    #[test]
    fn test_mix_additive_is_sum() {
        let a = tone(440.0, 0.05);
        let b = tone(660.0, 0.05);
        let mixed = a.mix(&b, PowerRule::Additive).unwrap();
        for ((m, x), y) in mixed.samples().iter().zip(a.samples()).zip(b.samples()) {
            assert!((m - (x + y)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_mix_mean_and_mismatch() {
        let out = wave(&[1.0, 0.0]).mix(&wave(&[0.0, -1.0]), PowerRule::Mean).unwrap();
        assert_eq!(out.samples(), &[0.5, -0.5]);
        assert!(wave(&[1.0]).mix(&wave(&[1.0, 1.0]), PowerRule::Mean).is_err());
    }

    #[test]
    fn test_amplitude_modulate() {
        let carrier = wave(&[1.0, 1.0, 1.0]);
        let modulator = wave(&[1.0, 0.0, -1.0]);
        let out = carrier.amplitude_modulate(&modulator, 1.0).unwrap();
        assert_eq!(out.samples(), &[1.0, 0.5, 0.0]);
        let half = carrier.amplitude_modulate(&modulator, 0.5).unwrap();
        assert_eq!(half.samples(), &[1.0, 0.75, 0.5]);
    }

    #[test]
    fn test_frequency_modulate_matches_generator() {
        let note = Note::new(440.0, 0.05).unwrap();
        let modulator = tone(7.0, 0.05);
        let external = MonoWave::frequency_modulate(&modulator, 440.0, 50.0).unwrap();
        let generated = Generator::fm(7.0, 50.0, rate()).unwrap().generate(&note).unwrap();
        assert_eq!(external.len(), generated.len());
        for (a, b) in external.samples().iter().zip(generated.samples()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_normalize_rms() {
        let out = tone(200.0, 0.1).normalize_rms(0.25);
        assert!((out.rms() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_silence_unchanged() {
        let silent = MonoWave::silence(64, rate());
        assert_eq!(silent.normalize_rms(0.5), silent);
    }

    #[test]
    fn test_envelope_applies_curve() {
        let out = wave(&[1.0; 8]).envelope(&EnvelopeParams::default()).unwrap();
        assert_eq!(out.samples()[0], 1.0);
        assert!(out.samples()[7] < 1.0);
    }

    #[test]
    fn test_to_stereo_split_center() {
        let stereo = wave(&[1.0, -1.0]).to_stereo(None, None, PowerRule::RootMeanSquare).unwrap();
        for s in stereo.left().samples().iter().chain(stereo.right().samples()) {
            assert!((s.abs() - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_to_stereo_merge() {
        let me = wave(&[0.1, 0.2]);
        let other = wave(&[0.3, 0.4]);
        let stereo = me.to_stereo(Some(&other), None, PowerRule::RootMeanSquare).unwrap();
        assert_eq!(stereo.left().samples(), other.samples());
        assert_eq!(stereo.right().samples(), me.samples());

        let stereo = me.to_stereo(None, Some(&other), PowerRule::Additive).unwrap();
        assert_eq!(stereo.left().samples(), me.samples());
        assert_eq!(stereo.right().samples(), other.samples());
    }

    #[test]
    fn test_to_stereo_both_is_error() {
        let me = wave(&[0.0]);
        assert!(me.to_stereo(Some(&me), Some(&me), PowerRule::Mean).is_err());
    }

    #[test]
    fn test_transforms_do_not_mutate() {
        let original = tone(300.0, 0.02);
        let copy = original.clone();
        let _ = original.scale(0.5);
        let _ = original.phaser(&PhaserParams::default());
        assert_eq!(original, copy);
    }
}
