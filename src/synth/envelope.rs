//! Attack/decay amplitude envelope
//!
//! Linear attack ramp followed by the product of two exponential decays.

use super::SampleRate;
use crate::error::{Result, SynthError};
use serde::{Deserialize, Serialize};

fn default_decay_fast() -> f64 {
    0.2
}
fn default_decay_slow() -> f64 {
    1.0
}

/// Envelope timing, all in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeParams {
    /// Length of the linear 0 -> 1 ramp
    #[serde(default)]
    pub attack: f64,
    #[serde(default = "default_decay_fast")]
    pub decay_fast: f64,
    #[serde(default = "default_decay_slow")]
    pub decay_slow: f64,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack: 0.0,
            decay_fast: default_decay_fast(),
            decay_slow: default_decay_slow(),
        }
    }
}

impl EnvelopeParams {
    pub fn new(attack: f64) -> Self {
        Self {
            attack,
            ..Self::default()
        }
    }

    pub fn with_decays(mut self, decay_fast: f64, decay_slow: f64) -> Self {
        self.decay_fast = decay_fast;
        self.decay_slow = decay_slow;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.attack >= 0.0 && self.attack.is_finite()) {
            return Err(SynthError::param("attack", "must be >= 0"));
        }
        if !(self.decay_fast > 0.0) {
            return Err(SynthError::param("decay_fast", "must be > 0"));
        }
        if !(self.decay_slow > 0.0) {
            return Err(SynthError::param("decay_slow", "must be > 0"));
        }
        Ok(())
    }

    /// Gain curve of `len` samples
    ///
    /// `exp(-t / decay_slow) * exp(-t / decay_fast)` everywhere, with the
    /// first `attack * rate` samples replaced by an inclusive 0 -> 1 ramp.
    pub fn curve(&self, len: usize, rate: SampleRate) -> Result<Vec<f64>> {
        self.validate()?;
        let mut curve: Vec<f64> = (0..len)
            .map(|i| {
                let t = rate.time_of(i);
                (-t / self.decay_slow).exp() * (-t / self.decay_fast).exp()
            })
            .collect();

        let attack_len = rate.samples_for(self.attack).min(len);
        match attack_len {
            0 => {}
            1 => curve[0] = 0.0,
            n => {
                let step = 1.0 / (n - 1) as f64;
                for (i, gain) in curve.iter_mut().take(n).enumerate() {
                    *gain = i as f64 * step;
                }
            }
        }
        Ok(curve)
    }
}
