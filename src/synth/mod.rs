//! Synthesis core
//!
//! Oscillators, the note sequencer, gain matrices and the mono/stereo
//! transform chain. Everything works on whole buffers at an explicit
//! sample rate.

mod context;
mod envelope;
pub mod filter;
pub mod gain;
mod mono;
mod oscillator;
mod sequencer;
mod stereo;
mod wave;

pub use context::{configure, sample_rate, SampleRate};
pub use envelope::EnvelopeParams;
pub use filter::{FilterType, PhaserParams};
pub use gain::{apply_gain_matrix, create_gain_matrix, GainMatrix, PowerRule};
pub use oscillator::{Generator, Note, Waveform};
pub use sequencer::Sequencer;
pub use wave::{Channel, MonoWave, StereoWave};
