//! sfxsynth - Procedural sound effects from waveform synthesis
//!
//! Builds short effects (impacts, zaps, whooshes, ambient loops) from
//! oscillators, envelopes, filters and stereo imaging at runtime, then hands
//! them to a playback backend.

pub mod config;
pub mod effect;
pub mod engine;
pub mod error;
pub mod synth;

pub use config::SfxConfig;
pub use engine::{Backend, GainGroup, Handle, Player, Sound};
pub use error::{Result, SynthError};
