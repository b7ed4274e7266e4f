//! Note sequencer

use super::{Generator, MonoWave, Note};
use crate::error::Result;

/// Renders a series of notes through one generator, back to back
///
/// Each note is truncated to whole samples on its own, so the total length
/// is the sum of the per-note lengths rather than `rate * total_duration`.
#[derive(Debug, Clone, Copy)]
pub struct Sequencer {
    generator: Generator,
}

impl Sequencer {
    pub fn new(generator: Generator) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    /// Concatenate the rendered notes in order
    pub fn sequence(&self, notes: &[Note]) -> Result<MonoWave> {
        let rate = self.generator.rate();
        let total = notes.iter().map(|n| rate.samples_for(n.sec())).sum();

        let mut samples = Vec::with_capacity(total);
        for note in notes {
            samples.extend(self.generator.generate(note)?.into_samples());
        }
        Ok(MonoWave::new(samples, rate))
    }
}

impl Generator {
    /// Shorthand for `Sequencer::new(*self).sequence(notes)`
    pub fn sequence(&self, notes: &[Note]) -> Result<MonoWave> {
        Sequencer::new(*self).sequence(notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::SampleRate;

    fn rate() -> SampleRate {
        SampleRate::new(8000).unwrap()
    }

    #[test]
    fn test_single_note_length() {
        let gen = Generator::sawtooth(0.3, rate()).unwrap();
        for sec in [0.01, 0.0333, 0.5, 1.23456] {
            let note = Note::new(220.0, sec).unwrap();
            assert_eq!(gen.sequence(&[note]).unwrap().len(), rate().samples_for(sec));
        }
    }

    #[test]
    fn test_per_note_truncation() {
        // 0.00019 s is 1.52 samples at 8 kHz; each note keeps one
        let note = Note::new(100.0, 0.00019).unwrap();
        let wave = Generator::sine(rate()).sequence(&[note; 10]).unwrap();
        assert_eq!(wave.len(), 10);
    }

    #[test]
    fn test_sequence_concatenates() {
        let gen = Generator::fm(6.0, 40.0, rate()).unwrap();
        let n1 = Note::new(440.0, 0.02).unwrap();
        let n2 = Note::new(660.0, 0.03).unwrap();
        let joined = gen.sequence(&[n1, n2]).unwrap();
        let parts = gen.sequence(&[n1]).unwrap().concat(&gen.sequence(&[n2]).unwrap()).unwrap();
        assert_eq!(joined, parts);
    }

    #[test]
    fn test_empty_sequence() {
        let wave = Generator::square(rate()).sequence(&[]).unwrap();
        assert!(wave.is_empty());
    }

    #[test]
    fn test_out_of_range_note_fails() {
        let notes = [Note::new(440.0, 0.1).unwrap(), Note::new(5000.0, 0.1).unwrap()];
        assert!(Generator::sine(rate()).sequence(&notes).is_err());
    }

    #[test]
    fn test_configured_rate_scenario() {
        let rate = crate::synth::configure(8000).unwrap();
        let wave = Sequencer::new(Generator::sine(rate))
            .sequence(&[Note::new(1000.0, 0.01).unwrap()])
            .unwrap();
        assert_eq!(wave.len(), 80);
        assert!(wave.samples()[0].abs() < 1e-12);
        assert!((wave.samples()[18] - 1.0).abs() < 1e-9);
    }
}
