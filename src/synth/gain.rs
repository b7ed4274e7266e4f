//! Gain matrices for mixing, panning and downmixing
//!
//! A gain matrix maps `n_in` channels onto `n_out` channels. The power rule
//! decides how the coefficients are scaled so that combining or splitting
//! channels keeps the perceived level where the caller wants it.

use crate::error::{Result, SynthError};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;

/// How a gain matrix preserves or redistributes signal power
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerRule {
    /// Plain sum, no scaling
    Additive,
    /// Average of the inputs
    Mean,
    /// Equal-power scaling
    RootMeanSquare,
    /// Scaled so the loudest coefficient sits at unity
    Peak,
}

/// A dense `n_out x n_in` matrix of gain coefficients
#[derive(Debug, Clone, PartialEq)]
pub struct GainMatrix {
    n_in: usize,
    n_out: usize,
    /// Row-major, one row per output channel
    gains: Vec<f64>,
}

impl GainMatrix {
    /// Build a matrix from explicit rows
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_out = rows.len();
        let n_in = rows.first().map(Vec::len).unwrap_or(0);
        if n_out == 0 || n_in == 0 {
            return Err(SynthError::param("rows", "gain matrix must not be empty"));
        }
        if let Some(bad) = rows.iter().find(|row| row.len() != n_in) {
            return Err(SynthError::LengthMismatch {
                left: n_in,
                right: bad.len(),
            });
        }
        Ok(Self {
            n_in,
            n_out,
            gains: rows.into_iter().flatten().collect(),
        })
    }

    pub fn n_in(&self) -> usize {
        self.n_in
    }

    pub fn n_out(&self) -> usize {
        self.n_out
    }

    /// Coefficient routing input `col` to output `row`
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.gains[row * self.n_in + col]
    }

    /// Coefficients feeding output `row`
    pub fn row(&self, row: usize) -> &[f64] {
        &self.gains[row * self.n_in..(row + 1) * self.n_in]
    }

    /// Multiply `(n_out x n_in) @ (n_in x n_samples)`
    ///
    /// Every channel must have the same length and the channel count must
    /// equal the matrix input count.
    pub fn apply<C: AsRef<[f64]>>(&self, channels: &[C]) -> Result<Vec<Vec<f64>>> {
        if channels.len() != self.n_in {
            return Err(SynthError::ChannelCountMismatch {
                expected: self.n_in,
                actual: channels.len(),
            });
        }
        let len = channels[0].as_ref().len();
        if let Some(bad) = channels.iter().find(|c| c.as_ref().len() != len) {
            return Err(SynthError::LengthMismatch {
                left: len,
                right: bad.as_ref().len(),
            });
        }

        let output = (0..self.n_out)
            .map(|row| {
                let gains = self.row(row);
                (0..len)
                    .map(|i| {
                        gains
                            .iter()
                            .zip(channels)
                            .map(|(g, c)| g * c.as_ref()[i])
                            .sum()
                    })
                    .collect()
            })
            .collect();
        Ok(output)
    }
}

/// Free-function form of [`GainMatrix::apply`]
pub fn apply_gain_matrix<C: AsRef<[f64]>>(gains: &GainMatrix, signal: &[C]) -> Result<Vec<Vec<f64>>> {
    gains.apply(signal)
}

/// Left/right gains of the mono-to-stereo pan law at `pan` in [-1, 1]
pub fn pan_law(pan: f64, rule: PowerRule) -> (f64, f64) {
    let t = (pan + 1.0) / 2.0;
    match rule {
        PowerRule::Additive => (1.0 - t, t),
        PowerRule::Mean => ((1.0 - t) / 2.0, t / 2.0),
        PowerRule::RootMeanSquare => {
            let theta = (pan + 1.0) * FRAC_PI_4;
            (theta.cos(), theta.sin())
        }
        PowerRule::Peak => {
            let (l, r) = (1.0 - t, t);
            let peak = l.abs().max(r.abs());
            (l / peak, r / peak)
        }
    }
}

/// Per-channel gains for re-balancing an existing stereo pair
///
/// The pan law is taken relative to its own centre value and capped at
/// unity, so `pan = 0` is an exact passthrough and a hard pan silences the
/// opposite side without boosting the near one.
pub fn balance_law(pan: f64, rule: PowerRule) -> (f64, f64) {
    let (l, r) = pan_law(pan, rule);
    let (l0, r0) = pan_law(0.0, rule);
    ((l / l0).min(1.0), (r / r0).min(1.0))
}

/// Build the gain matrix for an `n_in -> n_out` channel mapping
///
/// Supported shapes: mono to stereo (pan law), many to mono (downmix) and
/// equal counts (identity, or a stereo balance when `n_in == n_out == 2`).
/// Anything else is refused rather than approximated.
///
/// The 2 -> 2 matrix is diagonal but only the identity at `pan = 0`. Off
/// centre it attenuates the far channel by [`balance_law`], so callers
/// wanting a pure passthrough of a stereo pair must pass `pan = 0`.
pub fn create_gain_matrix(n_in: usize, n_out: usize, pan: f64, rule: PowerRule) -> Result<GainMatrix> {
    if !(-1.0..=1.0).contains(&pan) {
        return Err(SynthError::param("pan", format!("{pan} outside [-1, 1]")));
    }

    match (n_in, n_out) {
        (1, 2) => {
            let (l, r) = pan_law(pan, rule);
            GainMatrix::from_rows(vec![vec![l], vec![r]])
        }
        (n, 1) if n > 1 => {
            let n_f = n as f64;
            let scale = match rule {
                PowerRule::Additive => 1.0,
                PowerRule::Mean => 1.0 / n_f,
                PowerRule::RootMeanSquare => 1.0 / n_f.sqrt(),
                PowerRule::Peak => 1.0 / n_f,
            };
            GainMatrix::from_rows(vec![vec![scale; n]])
        }
        (2, 2) => {
            let (l, r) = balance_law(pan, rule);
            GainMatrix::from_rows(vec![vec![l, 0.0], vec![0.0, r]])
        }
        (a, b) if a == b && a > 0 => {
            let rows = (0..a)
                .map(|row| (0..a).map(|col| if row == col { 1.0 } else { 0.0 }).collect())
                .collect();
            GainMatrix::from_rows(rows)
        }
        _ => Err(SynthError::UnsupportedGainShape { n_in, n_out, rule }),
    }
}
