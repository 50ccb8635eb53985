//! Periodic waveform generator.
//!
//! Renders exactly one period of a sine, triangle, sawtooth or square wave
//! into a sample buffer, scaled to `0..=amplitude`. The result can be handed
//! straight to [`Sound::start`](crate::Sound::start), which loops it.

use core::f32::consts::PI;

use libm::cosf;

use crate::{Error, Sample};

/// Waveform shape.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaveType {
    /// `(1 - cos(2πt)) / 2`: starts and ends at zero.
    Sine = 0,
    /// Rises to the peak at half period, falls back to zero.
    Triangle = 1,
    /// Rises linearly over the whole period.
    Sawtooth = 2,
    /// Low for the first half, high for the second, half level at exactly 0.5.
    Square = 3,
}

impl WaveType {
    /// Normalized level (0.0..=1.0) at `phase` (0.0..1.0).
    fn level(self, phase: f32) -> f32 {
        match self {
            WaveType::Sine => (1.0 - cosf(2.0 * PI * phase)) / 2.0,
            WaveType::Triangle => {
                if phase < 0.5 {
                    phase * 2.0
                } else {
                    (1.0 - phase) * 2.0
                }
            }
            WaveType::Sawtooth => phase,
            WaveType::Square => {
                if phase < 0.5 {
                    0.0
                } else if phase == 0.5 {
                    0.5
                } else {
                    1.0
                }
            }
        }
    }
}

impl TryFrom<u8> for WaveType {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Error> {
        match code {
            0 => Ok(WaveType::Sine),
            1 => Ok(WaveType::Triangle),
            2 => Ok(WaveType::Sawtooth),
            3 => Ok(WaveType::Square),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// Fill `buffer` with one period of `wave` at `amplitude`.
///
/// Sample `i` is taken at phase `i / buffer.len()`, so the buffer loops
/// seamlessly. An empty buffer is rejected with [`Error::InvalidArgument`].
pub fn generate(buffer: &mut [Sample], wave: WaveType, amplitude: Sample) -> Result<(), Error> {
    if buffer.is_empty() {
        return Err(Error::InvalidArgument);
    }

    let len = buffer.len() as f32;
    let amplitude = amplitude as f32;
    for (i, sample) in buffer.iter_mut().enumerate() {
        let phase = i as f32 / len;
        *sample = (wave.level(phase) * amplitude) as Sample;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sawtooth_is_phase_times_amplitude() {
        let mut buf = [0; 4];
        generate(&mut buf, WaveType::Sawtooth, 4000).unwrap();
        assert_eq!(buf, [0, 1000, 2000, 3000]);
    }

    #[test]
    fn square_has_half_level_at_midpoint() {
        let mut buf = [0; 4];
        generate(&mut buf, WaveType::Square, 1000).unwrap();
        assert_eq!(buf, [0, 0, 500, 1000]);
    }

    #[test]
    fn triangle_peaks_at_half_period() {
        let mut buf = [0; 8];
        generate(&mut buf, WaveType::Triangle, 800).unwrap();
        assert_eq!(buf, [0, 200, 400, 600, 800, 600, 400, 200]);
    }

    #[test]
    fn sine_starts_at_zero_and_peaks_at_half_period() {
        let mut buf = [0; 64];
        generate(&mut buf, WaveType::Sine, 4095).unwrap();

        assert_eq!(buf[0], 0);
        assert!(buf[32] >= 4094);
        assert!(buf[16].abs_diff(2047) <= 1);
        assert!(buf[48].abs_diff(2047) <= 1);
        // Symmetric around the peak.
        for i in 1..32 {
            assert!(buf[i].abs_diff(buf[64 - i]) <= 1, "asymmetry at {}", i);
        }
    }

    #[test]
    fn single_sample_buffer_is_phase_zero() {
        for wave in [WaveType::Sine, WaveType::Triangle, WaveType::Sawtooth, WaveType::Square] {
            let mut buf = [0xFFFF; 1];
            generate(&mut buf, wave, 1000).unwrap();
            assert_eq!(buf, [0]);
        }
    }

    #[test]
    fn empty_buffer_is_rejected() {
        assert_eq!(
            generate(&mut [], WaveType::Sine, 1000),
            Err(Error::InvalidArgument)
        );
    }

    #[test]
    fn raw_wave_codes() {
        assert_eq!(WaveType::try_from(0), Ok(WaveType::Sine));
        assert_eq!(WaveType::try_from(3), Ok(WaveType::Square));
        assert_eq!(WaveType::try_from(4), Err(Error::InvalidArgument));
    }
}
