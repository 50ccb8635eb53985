//! Sound engine configuration.
//!
//! [`SoundConfig`] is passed to [`Sound::init`](crate::Sound::init) once and
//! fixes the sample-clock timer input, the ramp playback rate, the quiescent
//! output level and the sample alignment handed to the converter.

use crate::backend::timer_period;
use crate::{Error, Sample};

/// Timer input clock assumed by [`SoundConfig::default`].
pub const DEFAULT_TIMER_CLOCK_HZ: u32 = 48_000_000;

/// Rate at which anti-pop ramps are clocked out, in samples per second.
///
/// With [`RAMP_SAMPLE_COUNT`](crate::RAMP_SAMPLE_COUNT) samples this makes
/// every ramp last 4 ms.
pub const DEFAULT_RAMP_SAMPLE_RATE: u32 = 32_000;

/// How sample words are laid out in the converter's data register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleFormat {
    /// 12-bit value in the upper bits of a 16-bit word.
    Bits12Left,
    /// 12-bit value in the lower bits of a 16-bit word (0..=4095).
    Bits12Right,
    /// 8-bit value in the lower byte.
    Bits8Right,
}

/// Sound engine configuration.
///
/// # Example
///
/// ```
/// use sound_dac::{SampleFormat, SoundConfig};
///
/// let config = SoundConfig::new(84_000_000)
///     .silence(0x8000)
///     .format(SampleFormat::Bits12Left);
/// assert!(config.validate().is_ok());
/// ```
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoundConfig {
    /// Input clock of the sample-clock timer (Hz).
    pub timer_clock_hz: u32,
    /// Playback rate of anti-pop ramps (samples per second).
    pub ramp_sample_rate: u32,
    /// Output level ramped to on stop and ramped from when starting cold.
    ///
    /// Zero matches a unipolar amplifier input. Set the converter midpoint
    /// when the analog stage is biased around mid-scale.
    pub silence: Sample,
    /// Alignment of sample words for the converter.
    pub format: SampleFormat,
}

impl SoundConfig {
    /// Create a config for a sample-clock timer running at `timer_clock_hz`.
    pub const fn new(timer_clock_hz: u32) -> Self {
        Self {
            timer_clock_hz,
            ramp_sample_rate: DEFAULT_RAMP_SAMPLE_RATE,
            silence: 0,
            format: SampleFormat::Bits12Left,
        }
    }

    /// Set the ramp playback rate.
    pub const fn ramp_sample_rate(mut self, rate: u32) -> Self {
        self.ramp_sample_rate = rate;
        self
    }

    /// Set the quiescent output level.
    pub const fn silence(mut self, level: Sample) -> Self {
        self.silence = level;
        self
    }

    /// Set the converter sample alignment.
    pub const fn format(mut self, format: SampleFormat) -> Self {
        self.format = format;
        self
    }

    /// Check that the timer can produce the ramp rate.
    pub fn validate(&self) -> Result<(), Error> {
        self.ramp_period().map(|_| ())
    }

    /// Timer period used while a ramp is playing.
    pub(crate) fn ramp_period(&self) -> Result<u32, Error> {
        timer_period(self.timer_clock_hz, self.ramp_sample_rate).ok_or(Error::InvalidArgument)
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMER_CLOCK_HZ)
    }
}
