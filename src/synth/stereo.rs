//! Stereo imaging: panning, widening, mid-side and the stereo phaser

use super::filter::PhaserParams;
use super::gain::{balance_law, create_gain_matrix, PowerRule};
use super::{Channel, MonoWave, StereoWave};
use crate::error::{Result, SynthError};
use std::f64::consts::PI;

impl StereoWave {
    /// Re-balance the pair with a static pan position in [-1, 1]
    pub fn pan(&self, pan: f64, rule: PowerRule) -> Result<StereoWave> {
        let gains = create_gain_matrix(2, 2, pan, rule)?;
        StereoWave::from_channels(gains.apply(&self.as_channels())?, self.rate())
    }

    /// Pan with a per-sample position curve
    pub fn modulate_pan(&self, pan_curve: &MonoWave, rule: PowerRule) -> Result<StereoWave> {
        self.left().check_aligned(pan_curve)?;
        if let Some(bad) = pan_curve.samples().iter().find(|p| !(-1.0..=1.0).contains(*p)) {
            return Err(SynthError::param("pan_curve", format!("{bad} outside [-1, 1]")));
        }

        let (left, right): (Vec<f64>, Vec<f64>) = pan_curve
            .samples()
            .iter()
            .zip(self.left().samples().iter().zip(self.right().samples()))
            .map(|(&pan, (l, r))| {
                let (gl, gr) = balance_law(pan, rule);
                (l * gl, r * gr)
            })
            .unzip();
        StereoWave::new(MonoWave::new(left, self.rate()), MonoWave::new(right, self.rate()))
    }

    /// Delay one channel by the time `phase_deg` spans at `ref_hz`
    ///
    /// The delay may be fractional; samples are linearly interpolated and
    /// positions outside the buffer read as silence.
    pub fn stereo_phase_widen(&self, channel: Channel, ref_hz: f64, phase_deg: f64) -> Result<StereoWave> {
        if !(ref_hz > 0.0 && ref_hz.is_finite()) {
            return Err(SynthError::param("ref_hz", "must be > 0"));
        }
        if !phase_deg.is_finite() {
            return Err(SynthError::param("phase_deg", "must be finite"));
        }
        let delay_sec = (phase_deg / 360.0) / ref_hz;
        let delay = delay_sec * self.rate().as_f64();
        let shifted = fractional_delay(self.channel(channel).samples(), delay);
        self.with_channel(channel, MonoWave::new(shifted, self.rate()))
    }

    /// Delay one channel by a whole number of samples, zero-filled
    pub fn haas_widen(&self, channel: Channel, delay_seconds: f64) -> Result<StereoWave> {
        if !(delay_seconds >= 0.0 && delay_seconds.is_finite()) {
            return Err(SynthError::param("delay_seconds", "must be >= 0"));
        }
        let source = self.channel(channel).samples();
        let delay = ((delay_seconds * self.rate().as_f64()).round() as usize).min(source.len());

        let mut shifted = vec![0.0; delay];
        shifted.extend_from_slice(&source[..source.len() - delay]);
        self.with_channel(channel, MonoWave::new(shifted, self.rate()))
    }

    /// Scale the side signal; `side_gain = 1` returns the input
    pub fn stereo_mid_side(&self, side_gain: f64) -> Result<StereoWave> {
        if !side_gain.is_finite() {
            return Err(SynthError::param("side_gain", "must be finite"));
        }
        let (left, right): (Vec<f64>, Vec<f64>) = self
            .left()
            .samples()
            .iter()
            .zip(self.right().samples())
            .map(|(l, r)| {
                let mid = (l + r) / 2.0;
                let side = (l - r) / 2.0 * side_gain;
                (mid + side, mid - side)
            })
            .unzip();
        StereoWave::new(MonoWave::new(left, self.rate()), MonoWave::new(right, self.rate()))
    }

    /// Phaser per channel, the right sweep offset by `phase_offset` radians
    pub fn stereo_phaser(&self, params: &PhaserParams, phase_offset: f64) -> Result<StereoWave> {
        let left = self.left().phaser(params)?;
        let right_params = PhaserParams {
            lfo_phase: params.lfo_phase + phase_offset,
            ..*params
        };
        let right = self.right().phaser(&right_params)?;
        StereoWave::new(left, right)
    }

    /// [`StereoWave::stereo_phaser`] with the sweeps in antiphase
    pub fn stereo_phaser_default(&self, params: &PhaserParams) -> Result<StereoWave> {
        self.stereo_phaser(params, PI)
    }
}

/// Read `input` at `i - delay` with linear interpolation
fn fractional_delay(input: &[f64], delay: f64) -> Vec<f64> {
    let at = |idx: i64| -> f64 {
        if idx < 0 || idx as usize >= input.len() {
            0.0
        } else {
            input[idx as usize]
        }
    };
    (0..input.len())
        .map(|i| {
            let pos = i as f64 - delay;
            let base = pos.floor();
            let frac = pos - base;
            let i0 = base as i64;
            at(i0) * (1.0 - frac) + at(i0 + 1) * frac
        })
        .collect()
}
