//! Sample-rate context shared by every generator and filter

use crate::error::{Result, SynthError};
use std::sync::OnceLock;

static CONFIGURED: OnceLock<SampleRate> = OnceLock::new();

/// The timebase every synthesis call is computed against
///
/// Passed explicitly into generators and transforms. The process-wide
/// slot set by [`configure`] is a convenience for callers that only know
/// the rate once the audio backend has negotiated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampleRate(u32);

impl SampleRate {
    /// Create a sample rate, rejecting zero
    pub fn new(hz: u32) -> Result<Self> {
        if hz == 0 {
            return Err(SynthError::InvalidSampleRate(hz));
        }
        Ok(Self(hz))
    }

    /// Samples per second
    pub fn hz(&self) -> u32 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }

    pub fn nyquist(&self) -> f64 {
        self.as_f64() / 2.0
    }

    /// Number of whole samples covering `seconds`, truncated
    pub fn samples_for(&self, seconds: f64) -> usize {
        (self.as_f64() * seconds) as usize
    }

    /// Time in seconds of sample `index`
    pub fn time_of(&self, index: usize) -> f64 {
        index as f64 / self.as_f64()
    }

    /// Reject frequencies at or above Nyquist, or negative ones
    pub fn check_frequency(&self, hz: f64) -> Result<()> {
        if !hz.is_finite() || hz < 0.0 || hz >= self.nyquist() {
            return Err(SynthError::FrequencyOutOfRange {
                hz,
                nyquist: self.nyquist(),
            });
        }
        Ok(())
    }
}

/// Set the process-wide sample rate
///
/// Repeating the call with the same rate is accepted; a different rate is
/// refused since buffers already built against the first one would not be
/// rescaled.
pub fn configure(hz: u32) -> Result<SampleRate> {
    let rate = SampleRate::new(hz)?;
    let current = *CONFIGURED.get_or_init(|| rate);
    if current != rate {
        return Err(SynthError::AlreadyConfigured {
            current: current.hz(),
            requested: hz,
        });
    }
    Ok(current)
}

/// Read the process-wide sample rate, failing if [`configure`] never ran
pub fn sample_rate() -> Result<SampleRate> {
    CONFIGURED.get().copied().ok_or(SynthError::NotConfigured)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rate_rejected() {
        assert_eq!(SampleRate::new(0), Err(SynthError::InvalidSampleRate(0)));
    }

    #[test]
    fn test_samples_for_truncates() {
        let rate = SampleRate::new(8000).unwrap();
        assert_eq!(rate.samples_for(0.01), 80);
        assert_eq!(rate.samples_for(0.00019), 1);
        assert_eq!(rate.nyquist(), 4000.0);
    }

    #[test]
    fn test_frequency_bounds() {
        let rate = SampleRate::new(8000).unwrap();
        assert!(rate.check_frequency(0.0).is_ok());
        assert!(rate.check_frequency(3999.9).is_ok());
        assert!(rate.check_frequency(4000.0).is_err());
        assert!(rate.check_frequency(-1.0).is_err());
        assert!(rate.check_frequency(f64::NAN).is_err());
    }

    #[test]
    fn test_configure_is_sticky() {
        // Other tests configure 8000 Hz too; the slot is process-wide
        let rate = configure(8000).unwrap();
        assert_eq!(rate.hz(), 8000);
        assert_eq!(sample_rate().unwrap(), rate);
        assert!(configure(8000).is_ok());
        assert_eq!(
            configure(44100),
            Err(SynthError::AlreadyConfigured {
                current: 8000,
                requested: 44100
            })
        );
    }
}
