//! Filters applied to whole buffers
//!
//! Both the biquad and the phaser keep their recursion state on the stack of
//! a single call. Nothing carries over between buffers.

use super::SampleRate;
use crate::error::{Result, SynthError};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Biquad response type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
}

/// Normalized biquad coefficients
#[derive(Debug, Clone, Copy)]
struct Coefficients {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Coefficients {
    fn new(filter_type: FilterType, cutoff: f64, q: f64, fs: f64) -> Self {
        let omega = 2.0 * PI * cutoff / fs;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * q);

        let (b0, b1, b2) = match filter_type {
            FilterType::LowPass => ((1.0 - cos_omega) / 2.0, 1.0 - cos_omega, (1.0 - cos_omega) / 2.0),
            FilterType::HighPass => ((1.0 + cos_omega) / 2.0, -(1.0 + cos_omega), (1.0 + cos_omega) / 2.0),
            FilterType::BandPass => (alpha, 0.0, -alpha),
        };
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// Run a biquad over `input` and return the filtered copy
pub fn biquad(input: &[f64], rate: SampleRate, filter_type: FilterType, cutoff: f64, q: f64) -> Result<Vec<f64>> {
    if !(cutoff > 0.0 && cutoff < rate.nyquist()) {
        return Err(SynthError::FrequencyOutOfRange {
            hz: cutoff,
            nyquist: rate.nyquist(),
        });
    }
    if !(q > 0.0 && q.is_finite()) {
        return Err(SynthError::param("q", format!("{q} must be > 0")));
    }

    let c = Coefficients::new(filter_type, cutoff, q, rate.as_f64());
    // Direct Form II transposed
    let (mut z1, mut z2) = (0.0, 0.0);
    let output = input
        .iter()
        .map(|&x| {
            let y = c.b0 * x + z1;
            z1 = c.b1 * x - c.a1 * y + z2;
            z2 = c.b2 * x - c.a2 * y;
            y
        })
        .collect();
    Ok(output)
}

fn default_stages() -> usize {
    4
}
fn default_lfo_hz() -> f64 {
    0.5
}
fn default_min_fc() -> f64 {
    300.0
}
fn default_max_fc() -> f64 {
    1600.0
}
fn default_mix() -> f64 {
    0.5
}

/// Settings for the swept all-pass phaser
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaserParams {
    /// Number of first-order all-pass stages
    #[serde(default = "default_stages")]
    pub stages: usize,
    /// Sweep rate in Hz
    #[serde(default = "default_lfo_hz")]
    pub lfo_hz: f64,
    /// Lowest cutoff of the sweep
    #[serde(default = "default_min_fc")]
    pub min_fc: f64,
    /// Highest cutoff of the sweep
    #[serde(default = "default_max_fc")]
    pub max_fc: f64,
    /// Portion of the last stage's output fed back into the input
    #[serde(default)]
    pub feedback: f64,
    /// Wet amount; 0 returns the dry input
    #[serde(default = "default_mix")]
    pub mix: f64,
    /// Starting phase of the sweep in radians
    #[serde(default)]
    pub lfo_phase: f64,
}

impl Default for PhaserParams {
    fn default() -> Self {
        Self {
            stages: default_stages(),
            lfo_hz: default_lfo_hz(),
            min_fc: default_min_fc(),
            max_fc: default_max_fc(),
            feedback: 0.0,
            mix: default_mix(),
            lfo_phase: 0.0,
        }
    }
}

impl PhaserParams {
    pub fn with_stages(mut self, stages: usize) -> Self {
        self.stages = stages;
        self
    }

    pub fn with_sweep(mut self, min_fc: f64, max_fc: f64) -> Self {
        self.min_fc = min_fc;
        self.max_fc = max_fc;
        self
    }

    pub fn with_lfo(mut self, lfo_hz: f64, lfo_phase: f64) -> Self {
        self.lfo_hz = lfo_hz;
        self.lfo_phase = lfo_phase;
        self
    }

    pub fn with_feedback(mut self, feedback: f64) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn with_mix(mut self, mix: f64) -> Self {
        self.mix = mix;
        self
    }

    pub fn validate(&self, rate: SampleRate) -> Result<()> {
        rate.check_frequency(self.lfo_hz)?;
        rate.check_frequency(self.min_fc)?;
        rate.check_frequency(self.max_fc)?;
        if self.min_fc > self.max_fc {
            return Err(SynthError::param(
                "min_fc",
                format!("{} above max_fc {}", self.min_fc, self.max_fc),
            ));
        }
        if !(self.feedback.abs() < 1.0) {
            return Err(SynthError::param("feedback", "magnitude must be below 1"));
        }
        if !(0.0..=1.0).contains(&self.mix) {
            return Err(SynthError::param("mix", format!("{} outside [0, 1]", self.mix)));
        }
        if !self.lfo_phase.is_finite() {
            return Err(SynthError::param("lfo_phase", "must be finite"));
        }
        Ok(())
    }
}

/// Swept cascade of first-order all-pass filters, blended with the input
///
/// Cutoff follows `min_fc + (max_fc - min_fc) * 0.5 * (1 + sin(2 pi lfo_hz t + lfo_phase))`
/// and each stage uses the bilinear-transform coefficient
/// `a = (1 - tan(pi fc / fs)) / (1 + tan(pi fc / fs))`.
pub fn phaser(input: &[f64], rate: SampleRate, params: &PhaserParams) -> Result<Vec<f64>> {
    params.validate(rate)?;
    let fs = rate.as_f64();
    let span = params.max_fc - params.min_fc;

    let mut x_prev = vec![0.0f64; params.stages];
    let mut y_prev = vec![0.0f64; params.stages];
    let mut last = 0.0f64;

    let output = input
        .iter()
        .enumerate()
        .map(|(n, &dry)| {
            let t = n as f64 / fs;
            let lfo = 0.5 * (1.0 + (2.0 * PI * params.lfo_hz * t + params.lfo_phase).sin());
            let fc = params.min_fc + span * lfo;
            let k = (PI * fc / fs).tan();
            let a = (1.0 - k) / (1.0 + k);

            let mut x = dry + params.feedback * last;
            for (xp, yp) in x_prev.iter_mut().zip(y_prev.iter_mut()) {
                let y = -a * x + *xp + a * *yp;
                *xp = x;
                *yp = y;
                x = y;
            }
            last = x;

            (1.0 - params.mix) * dry + params.mix * x
        })
        .collect();
    Ok(output)
}
