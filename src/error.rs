//! Error types for the synthesis core

use crate::synth::PowerRule;
use thiserror::Error;

/// Precondition failures raised by the synthesis core
///
/// Every variant is a programmer error: the caller passed a shape, rate or
/// parameter the engine cannot honor. Nothing here is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(u32),

    #[error("sample rate used before configure()")]
    NotConfigured,

    #[error("sample rate already configured at {current} Hz, refusing {requested} Hz")]
    AlreadyConfigured { current: u32, requested: u32 },

    #[error("invalid note: {0}")]
    InvalidNote(String),

    #[error("frequency {hz} Hz outside [0, {nyquist}) for this sample rate")]
    FrequencyOutOfRange { hz: f64, nyquist: f64 },

    #[error("gain matrix not implemented for {n_in} -> {n_out} channels with {rule:?}")]
    UnsupportedGainShape {
        n_in: usize,
        n_out: usize,
        rule: PowerRule,
    },

    #[error("gain matrix expects {expected} input channels, signal has {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },

    #[error("sample rate mismatch: {left} Hz vs {right} Hz")]
    SampleRateMismatch { left: u32, right: u32 },

    #[error("buffer length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl SynthError {
    pub(crate) fn param(name: &'static str, reason: impl Into<String>) -> Self {
        SynthError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result alias for synthesis operations
pub type Result<T> = std::result::Result<T, SynthError>;
