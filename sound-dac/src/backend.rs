//! Hardware transfer backend abstraction.
//!
//! The sound engine never touches registers. It drives a clock-paced,
//! DMA-fed converter through [`TransferBackend`], which a board crate
//! implements on top of its HAL (DMA stream + DAC channel + basic timer).

use crate::config::SampleFormat;
use crate::Sample;

/// Transfer engine mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferMode {
    /// Emit the buffer once, then raise the completion interrupt.
    OneShot,
    /// Loop the buffer until stopped.
    AutoRepeat,
}

/// Buffered, clock-paced output transfer engine.
///
/// All methods are called either from the foreground with the completion
/// interrupt masked, or from the completion interrupt itself, so an
/// implementation never sees two calls at once.
pub trait TransferBackend {
    /// Select one-shot or auto-repeating mode for the next [`start`](Self::start).
    fn configure(&mut self, mode: TransferMode);

    /// Start emitting `len` samples from `samples` at the current timer period.
    ///
    /// Clears any stale transfer-complete flag before arming the transfer.
    ///
    /// # Safety
    ///
    /// `samples..samples + len` must stay valid and unmodified until the
    /// transfer is stopped or replaced by another `start`.
    unsafe fn start(&mut self, samples: *const Sample, len: usize, format: SampleFormat);

    /// Stop the transfer. Synchronous: no sample is fetched after this returns.
    fn stop(&mut self);

    /// Samples not yet emitted from the active buffer.
    ///
    /// Counts down while the transfer runs and reloads when an auto-repeating
    /// transfer wraps.
    fn remaining(&self) -> usize;

    /// Program the sample-clock timer period (see [`timer_period`]).
    fn set_timer_period(&mut self, period: u32);

    /// Enable or mask the transfer-complete interrupt source.
    fn set_completion_irq(&mut self, enabled: bool);
}

/// Timer auto-reload value for `sample_rate` given a timer clocked at `clock_hz`.
///
/// `clock_hz / sample_rate - 1`, truncated. Returns `None` when the rate is zero
/// or faster than the timer clock.
pub const fn timer_period(clock_hz: u32, sample_rate: u32) -> Option<u32> {
    if sample_rate == 0 || sample_rate > clock_hz {
        return None;
    }
    Some(clock_hz / sample_rate - 1)
}
