//! Anti-pop ramps.
//!
//! A click is an instantaneous jump of the speaker membrane. Before every
//! change of what is being played the engine emits a short linear ramp from
//! the sample currently on the output to the sample that comes next.

use crate::Sample;

/// Samples in every ramp.
pub const RAMP_SAMPLE_COUNT: usize = 128;

/// Scratch buffer holding the ramp currently being emitted.
pub type RampBuffer = [Sample; RAMP_SAMPLE_COUNT];

/// Fill `buffer` with an open-ended linear ramp from `start` towards `end`.
///
/// With `N = buffer.len()` and `step = (end - start) / N`, sample `i` is
/// `start + step * (i + 1)`, truncated. The first sample already moves away
/// from `start`; the last one lands on (or within one step of) `end`.
pub fn fill_ramp(buffer: &mut [Sample], start: Sample, end: Sample) {
    if buffer.is_empty() {
        return;
    }

    let from = start as f32;
    let step = (end as f32 - from) / buffer.len() as f32;
    for (i, sample) in buffer.iter_mut().enumerate() {
        *sample = (from + step * (i + 1) as f32) as Sample;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(start: Sample, end: Sample, i: usize) -> Sample {
        let step = (end as f32 - start as f32) / RAMP_SAMPLE_COUNT as f32;
        (start as f32 + step * (i + 1) as f32) as Sample
    }

    #[test]
    fn rising_ramp_follows_formula() {
        let mut ramp: RampBuffer = [0; RAMP_SAMPLE_COUNT];
        fill_ramp(&mut ramp, 0, 0x8000);

        for (i, &s) in ramp.iter().enumerate() {
            assert_eq!(s, expected(0, 0x8000, i));
        }
        assert!(ramp[0] > 0);
        assert!(ramp.windows(2).all(|w| w[0] <= w[1]));
        let step = 0x8000 / RAMP_SAMPLE_COUNT as u32;
        assert!(0x8000 - ramp[RAMP_SAMPLE_COUNT - 1] as u32 <= step);
    }

    #[test]
    fn falling_ramp_follows_formula() {
        let mut ramp: RampBuffer = [0; RAMP_SAMPLE_COUNT];
        fill_ramp(&mut ramp, 4000, 1000);

        for (i, &s) in ramp.iter().enumerate() {
            assert_eq!(s, expected(4000, 1000, i));
        }
        assert!(ramp[0] < 4000);
        assert!(ramp.windows(2).all(|w| w[0] >= w[1]));
        assert!(ramp[RAMP_SAMPLE_COUNT - 1] >= 1000);
        assert!(ramp[RAMP_SAMPLE_COUNT - 1] - 1000 <= 24);
    }

    #[test]
    fn flat_ramp_holds_level() {
        let mut ramp: RampBuffer = [0; RAMP_SAMPLE_COUNT];
        fill_ramp(&mut ramp, 1234, 1234);
        assert!(ramp.iter().all(|&s| s == 1234));
    }

    #[test]
    fn empty_buffer_is_left_alone() {
        fill_ramp(&mut [], 0, u16::MAX);
    }
}
