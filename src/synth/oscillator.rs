//! Oscillators rendering a note into a mono buffer

use super::{MonoWave, SampleRate};
use crate::error::{Result, SynthError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A frequency held for a duration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    hz: f64,
    sec: f64,
}

impl Note {
    /// Create a note; the Nyquist bound is checked by the generator
    pub fn new(hz: f64, sec: f64) -> Result<Self> {
        if !hz.is_finite() || hz < 0.0 {
            return Err(SynthError::InvalidNote(format!("frequency {hz} must be >= 0")));
        }
        if !sec.is_finite() || sec <= 0.0 {
            return Err(SynthError::InvalidNote(format!("duration {sec} must be > 0")));
        }
        Ok(Self { hz, sec })
    }

    pub fn hz(&self) -> f64 {
        self.hz
    }

    pub fn sec(&self) -> f64 {
        self.sec
    }
}

/// Waveform shapes and their fixed parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Waveform {
    Sine {
        #[serde(default)]
        phase_offset: f64,
    },
    /// Sign of the sine
    Square,
    /// Skewed ramp; `geometry` -1 falls only, 1 rises only, 0 is a triangle
    Sawtooth {
        #[serde(default)]
        geometry: f64,
    },
    /// Sine whose frequency swings by `deviation_hz` at `mod_freq`
    Fm { mod_freq: f64, deviation_hz: f64 },
    /// Sine whose amplitude dips by `depth` at `mod_freq`
    Am { mod_freq: f64, depth: f64 },
    /// Sample-and-hold noise, one fresh value every `1 / hz` seconds
    WhiteNoise {
        #[serde(default)]
        seed: Option<u64>,
    },
}

/// A waveform bound to a sample rate, reusable across notes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Generator {
    waveform: Waveform,
    rate: SampleRate,
}

impl Generator {
    /// Bind a waveform, validating its parameters once
    pub fn new(waveform: Waveform, rate: SampleRate) -> Result<Self> {
        match waveform {
            Waveform::Sine { phase_offset } if !phase_offset.is_finite() => {
                return Err(SynthError::param("phase_offset", "must be finite"));
            }
            Waveform::Sawtooth { geometry } if !(-1.0..=1.0).contains(&geometry) => {
                return Err(SynthError::param("geometry", format!("{geometry} outside [-1, 1]")));
            }
            Waveform::Fm { mod_freq, deviation_hz } => {
                rate.check_frequency(mod_freq)?;
                if !deviation_hz.is_finite() || deviation_hz < 0.0 {
                    return Err(SynthError::param("deviation_hz", "must be >= 0"));
                }
            }
            Waveform::Am { mod_freq, depth } => {
                rate.check_frequency(mod_freq)?;
                if !(0.0..=1.0).contains(&depth) {
                    return Err(SynthError::param("depth", format!("{depth} outside [0, 1]")));
                }
            }
            _ => {}
        }
        Ok(Self { waveform, rate })
    }

    pub fn sine(rate: SampleRate) -> Self {
        Self {
            waveform: Waveform::Sine { phase_offset: 0.0 },
            rate,
        }
    }

    pub fn square(rate: SampleRate) -> Self {
        Self {
            waveform: Waveform::Square,
            rate,
        }
    }

    pub fn sawtooth(geometry: f64, rate: SampleRate) -> Result<Self> {
        Self::new(Waveform::Sawtooth { geometry }, rate)
    }

    pub fn fm(mod_freq: f64, deviation_hz: f64, rate: SampleRate) -> Result<Self> {
        Self::new(Waveform::Fm { mod_freq, deviation_hz }, rate)
    }

    pub fn am(mod_freq: f64, depth: f64, rate: SampleRate) -> Result<Self> {
        Self::new(Waveform::Am { mod_freq, depth }, rate)
    }

    pub fn white_noise(seed: Option<u64>, rate: SampleRate) -> Self {
        Self {
            waveform: Waveform::WhiteNoise { seed },
            rate,
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn rate(&self) -> SampleRate {
        self.rate
    }

    /// Render one note, `int(rate * sec)` samples long
    pub fn generate(&self, note: &Note) -> Result<MonoWave> {
        self.rate.check_frequency(note.hz())?;
        let n = self.rate.samples_for(note.sec());
        let fs = self.rate.as_f64();
        let hz = note.hz();
        let t = |i: usize| i as f64 / fs;

        let samples = match self.waveform {
            Waveform::Sine { phase_offset } => (0..n).map(|i| sine(hz, t(i), phase_offset)).collect(),
            Waveform::Square => (0..n).map(|i| sign(sine(hz, t(i), 0.0))).collect(),
            Waveform::Sawtooth { geometry } => {
                let duty = (geometry + 1.0) / 2.0;
                (0..n)
                    .map(|i| 2.0 * skewed_ramp((hz * t(i)).rem_euclid(1.0), duty) - 1.0)
                    .collect()
            }
            Waveform::Fm { mod_freq, deviation_hz } => {
                let deviation = (0..n).map(|i| (2.0 * PI * mod_freq * t(i)).sin());
                integrate_phase(hz, deviation_hz, deviation, fs)
            }
            Waveform::Am { mod_freq, depth } => (0..n)
                .map(|i| {
                    let m = (2.0 * PI * mod_freq * t(i)).sin();
                    sine(hz, t(i), 0.0) * am_gain(m, depth)
                })
                .collect(),
            Waveform::WhiteNoise { seed } => match seed {
                Some(seed) => held_noise(n, hz, fs, &mut StdRng::seed_from_u64(seed)),
                None => held_noise(n, hz, fs, &mut rand::thread_rng()),
            },
        };

        Ok(MonoWave::new(samples, self.rate))
    }
}

fn sine(hz: f64, t: f64, phase_offset: f64) -> f64 {
    (2.0 * PI * hz * t + phase_offset).sin()
}

fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Rise over the first `duty` of the cycle, fall over the rest, in [0, 1]
fn skewed_ramp(phase: f64, duty: f64) -> f64 {
    if duty <= 0.0 {
        1.0 - phase
    } else if duty >= 1.0 {
        phase
    } else if phase < duty {
        phase / duty
    } else {
        (1.0 - phase) / (1.0 - duty)
    }
}

/// Envelope of amplitude modulation for a modulator value in [-1, 1]
pub(crate) fn am_gain(modulator: f64, depth: f64) -> f64 {
    (1.0 - depth) + depth * 0.5 * (1.0 + modulator)
}

/// Sine of the running integral of `base_hz + deviation_hz * m(t)`
///
/// The phase starts at zero, so the first sample is always `sin(0)`.
pub(crate) fn integrate_phase(
    base_hz: f64,
    deviation_hz: f64,
    modulator: impl Iterator<Item = f64>,
    fs: f64,
) -> Vec<f64> {
    let mut phase = 0.0f64;
    modulator
        .map(|m| {
            let out = phase.sin();
            let freq = base_hz + deviation_hz * m;
            phase = (phase + 2.0 * PI * freq / fs).rem_euclid(2.0 * PI);
            out
        })
        .collect()
}

/// Uniform values in [-1, 1], each held for `round(fs / hz)` samples
fn held_noise<R: Rng>(n: usize, hz: f64, fs: f64, rng: &mut R) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    if hz == 0.0 {
        // A zero-rate hold never refreshes
        return vec![rng.gen_range(-1.0..=1.0); n];
    }
    let period = fs / hz;
    // A hold longer than the note is the whole note
    let hold = (period.round() as usize).clamp(1, n);
    let draws = ((n as f64 / period).ceil() as usize).max(n.div_ceil(hold));

    let mut samples = Vec::with_capacity(n);
    for _ in 0..draws {
        let value = rng.gen_range(-1.0..=1.0);
        let take = hold.min(n - samples.len());
        samples.extend(std::iter::repeat(value).take(take));
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(hz: u32) -> SampleRate {
        SampleRate::new(hz).unwrap()
    }

    #[test]
    fn test_note_validation() {
        assert!(Note::new(440.0, 0.5).is_ok());
        assert!(Note::new(0.0, 0.5).is_ok());
        assert!(Note::new(-1.0, 0.5).is_err());
        assert!(Note::new(440.0, 0.0).is_err());
        assert!(Note::new(440.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_sine_quarter_period() {
        let wave = Generator::sine(rate(8000))
            .generate(&Note::new(1000.0, 0.01).unwrap())
            .unwrap();
        assert_eq!(wave.len(), 80);
        assert!(wave.samples()[0].abs() < 1e-12);
        // 8 samples per cycle, so index 2 is a quarter period
        assert!((wave.samples()[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_sine_phase_offset() {
        let gen = Generator::new(Waveform::Sine { phase_offset: PI / 2.0 }, rate(8000)).unwrap();
        let wave = gen.generate(&Note::new(100.0, 0.01).unwrap()).unwrap();
        assert!((wave.samples()[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_square_is_sign_of_sine() {
        let wave = Generator::square(rate(8000))
            .generate(&Note::new(1000.0, 0.001).unwrap())
            .unwrap();
        let s = wave.samples();
        assert_eq!(s.len(), 8);
        assert_eq!(s[0], 0.0);
        assert_eq!(&s[1..4], &[1.0, 1.0, 1.0]);
        assert_eq!(&s[5..8], &[-1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_sawtooth_shapes() {
        let note = Note::new(1.0, 1.0).unwrap();
        let rise = Generator::sawtooth(1.0, rate(4)).unwrap().generate(&note).unwrap();
        assert_eq!(rise.samples(), &[-1.0, -0.5, 0.0, 0.5]);

        let fall = Generator::sawtooth(-1.0, rate(4)).unwrap().generate(&note).unwrap();
        assert_eq!(fall.samples(), &[1.0, 0.5, 0.0, -0.5]);

        let triangle = Generator::sawtooth(0.0, rate(4)).unwrap().generate(&note).unwrap();
        assert_eq!(triangle.samples(), &[-1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_sawtooth_geometry_range() {
        assert!(Generator::sawtooth(1.5, rate(8000)).is_err());
    }

    #[test]
    fn test_fm_without_deviation_is_sine() {
        let note = Note::new(440.0, 0.01).unwrap();
        let fm = Generator::fm(5.0, 0.0, rate(44100)).unwrap().generate(&note).unwrap();
        let sine = Generator::sine(rate(44100)).generate(&note).unwrap();
        for (a, b) in fm.samples().iter().zip(sine.samples()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_fm_stays_in_range() {
        let note = Note::new(440.0, 0.1).unwrap();
        let wave = Generator::fm(30.0, 200.0, rate(44100)).unwrap().generate(&note).unwrap();
        assert!(wave.samples().iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_am_full_depth_envelope() {
        // Modulator at sin(0) = 0 gives half gain at full depth
        assert_eq!(am_gain(0.0, 1.0), 0.5);
        assert_eq!(am_gain(1.0, 1.0), 1.0);
        assert_eq!(am_gain(-1.0, 1.0), 0.0);
        assert_eq!(am_gain(-1.0, 0.0), 1.0);
        assert!(Generator::am(5.0, 1.5, rate(8000)).is_err());
    }

    #[test]
    fn test_white_noise_runs() {
        let wave = Generator::white_noise(Some(7), rate(1000))
            .generate(&Note::new(10.0, 1.0).unwrap())
            .unwrap();
        assert_eq!(wave.len(), 1000);
        for run in wave.samples().chunks(100) {
            assert!(run.iter().all(|&s| s == run[0]));
            assert!((-1.0..=1.0).contains(&run[0]));
        }
        let distinct = wave.samples().chunks(100).map(|r| r[0]).collect::<Vec<_>>();
        assert!(distinct.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_white_noise_seed_is_deterministic() {
        let note = Note::new(500.0, 0.05).unwrap();
        let gen = Generator::white_noise(Some(42), rate(8000));
        assert_eq!(gen.generate(&note).unwrap(), gen.generate(&note).unwrap());
    }

    #[test]
    fn test_white_noise_uneven_period_fills_length() {
        // 8000 / 3000 rounds to a hold of 3 samples
        let wave = Generator::white_noise(None, rate(8000))
            .generate(&Note::new(3000.0, 0.0125).unwrap())
            .unwrap();
        assert_eq!(wave.len(), 100);
    }

    #[test]
    fn test_white_noise_sub_hertz() {
        // The hold period is far longer than the note
        let wave = Generator::white_noise(Some(1), rate(8000))
            .generate(&Note::new(1e-9, 0.01).unwrap())
            .unwrap();
        assert_eq!(wave.len(), 80);
        assert!(wave.samples().iter().all(|&s| s == wave.samples()[0]));
    }

    #[test]
    fn test_nyquist_rejected() {
        let gen = Generator::sine(rate(8000));
        let err = gen.generate(&Note::new(4000.0, 0.1).unwrap()).unwrap_err();
        assert!(matches!(err, SynthError::FrequencyOutOfRange { .. }));
    }
}
