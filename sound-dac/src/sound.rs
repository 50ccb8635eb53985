//! Pop-free playback state machine.
//!
//! [`Sound`] owns the transfer backend, the amplifier enable line and the
//! ramp scratch buffer. The foreground calls [`Sound::start`] and
//! [`Sound::stop`]; the transfer-complete interrupt calls
//! [`Sound::on_transfer_complete`].
//!
//! | From          | Event      | To          |
//! |---------------|------------|-------------|
//! | `Stopped`     | `start`    | `RampingUp` |
//! | `RampingUp`   | `start`    | `RampingUp` (pending sound replaced) |
//! | `Playing`     | `start`    | `RampingUp` |
//! | `RampingDown` | `start`    | `RampingUp` |
//! | `Stopped`     | `stop`     | `Stopped` (no-op) |
//! | any other     | `stop`     | `RampingDown` |
//! | `RampingUp`   | complete   | `Playing`   |
//! | `RampingDown` | complete   | `Stopped`   |
//!
//! Every transition into `RampingUp` or `RampingDown` emits a one-shot linear
//! ramp from the sample live on the output right now, so superseding a sound
//! mid-ramp or mid-loop never jumps.
//!
//! # Concurrency
//!
//! All mutable state sits behind an `embassy-sync` critical-section mutex.
//! Foreground calls additionally mask the completion interrupt source while
//! they reconfigure the backend and unmask it only once the new one-shot
//! transfer is armed. The state itself is mirrored in an atomic so
//! [`Sound::state`] never takes the lock.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU8, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::digital::OutputPin;

use crate::backend::{timer_period, TransferBackend, TransferMode};
use crate::config::SoundConfig;
use crate::ramp::{fill_ramp, RampBuffer, RAMP_SAMPLE_COUNT};
use crate::{Error, Sample};


/// Playback state.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackState {
    /// Output disabled, backend idle.
    Stopped = 0,
    /// A one-shot ramp towards the first sample of the pending sound is playing.
    RampingUp = 1,
    /// The target buffer is looping.
    Playing = 2,
    /// A one-shot ramp towards silence is playing.
    RampingDown = 3,
}

impl PlaybackState {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::RampingUp,
            2 => Self::Playing,
            3 => Self::RampingDown,
            _ => Self::Stopped,
        }
    }
}

/// Sound requested by the latest [`Sound::start`], waiting for its ramp to finish.
#[derive(Clone, Copy)]
struct Target {
    samples: &'static [Sample],
    sample_rate: u32,
    period: u32,
}

/// Buffer the backend is emitting.
#[derive(Clone, Copy)]
enum ActiveBuffer {
    Idle,
    Ramp,
    Target(&'static [Sample]),
}

struct Inner<B, P> {
    backend: B,
    enable: P,
    config: SoundConfig,
    ramp_period: u32,
    ramp: RampBuffer,
    active: ActiveBuffer,
    pending: Option<Target>,
}

/// Index of the sample being emitted, from the backend's countdown.
///
/// Out-of-range readings (counter reloaded on wrap, transfer not started yet,
/// or a racing backend) fall back to 0. That may cost an audible glitch but
/// never an out-of-bounds read.
fn live_index(active_len: usize, remaining: usize) -> usize {
    match active_len.checked_sub(remaining) {
        Some(index) if index < active_len => index,
        _ => 0,
    }
}

impl<B: TransferBackend, P: OutputPin> Inner<B, P> {
    /// Sample currently on the output.
    fn live_sample(&self) -> Sample {
        let samples: &[Sample] = match self.active {
            ActiveBuffer::Idle => return self.config.silence,
            ActiveBuffer::Ramp => &self.ramp,
            ActiveBuffer::Target(samples) => samples,
        };
        let index = live_index(samples.len(), self.backend.remaining());
        samples.get(index).copied().unwrap_or(self.config.silence)
    }

    fn set_output(&mut self, enabled: bool) {
        let res = if enabled {
            self.enable.set_high()
        } else {
            self.enable.set_low()
        };
        if res.is_err() {
            warn!("failed to drive output enable line (enabled={})", enabled);
        }
    }

    /// Replace whatever is playing with a one-shot ramp from `from` to `to`.
    fn play_ramp(&mut self, from: Sample, to: Sample) {
        self.backend.stop();
        fill_ramp(&mut self.ramp, from, to);

        self.backend.configure(TransferMode::OneShot);
        self.set_output(true);
        self.backend.set_timer_period(self.ramp_period);
        // SAFETY: the ramp lives inside a `'static` engine and is only
        // rewritten after `backend.stop()`.
        unsafe {
            self.backend
                .start(self.ramp.as_ptr(), RAMP_SAMPLE_COUNT, self.config.format)
        };
        self.active = ActiveBuffer::Ramp;
    }
}

/// Pop-free sound output engine.
///
/// Create it with [`Sound::new`] in a `static`, call [`Sound::init`] once with
/// the board's backend, and route the transfer-complete interrupt to
/// [`Sound::on_transfer_complete`].
///
/// # Example
///
/// ```ignore
/// static SOUND: Sound<DacDma, Output<'static>> = Sound::new();
///
/// #[interrupt]
/// fn DMA1_STREAM5() {
///     dma_clear_flags();
///     SOUND.on_transfer_complete();
/// }
///
/// SOUND.init(dac_dma, amp_enable, SoundConfig::new(84_000_000))?;
/// SOUND.start(&BEEP, 8_000)?;
/// // ...
/// SOUND.stop()?;
/// ```
pub struct Sound<B, P> {
    state: AtomicU8,
    inner: Mutex<CriticalSectionRawMutex, RefCell<Option<Inner<B, P>>>>,
}

impl<B, P> Sound<B, P> {
    /// Create an uninitialized engine in the `Stopped` state.
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(PlaybackState::Stopped as u8),
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Current playback state.
    pub fn state(&self) -> PlaybackState {
        PlaybackState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// True unless the engine is `Stopped`.
    pub fn is_active(&self) -> bool {
        self.state() != PlaybackState::Stopped
    }

    fn set_state(&self, state: PlaybackState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

impl<B, P> Default for Sound<B, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: TransferBackend, P: OutputPin> Sound<B, P> {
    /// Take ownership of the hardware and establish the `Stopped` state.
    ///
    /// Drives the output enable line low, stops the backend and masks the
    /// completion interrupt.
    pub fn init(&self, mut backend: B, mut enable: P, config: SoundConfig) -> Result<(), Error> {
        let ramp_period = config.ramp_period()?;

        self.inner.lock(|inner| {
            let mut inner = inner.borrow_mut();
            if inner.is_some() {
                return Err(Error::AlreadyInitialized);
            }

            backend.set_completion_irq(false);
            backend.stop();
            if enable.set_low().is_err() {
                warn!("failed to drive output enable line (enabled=false)");
            }

            *inner = Some(Inner {
                backend,
                enable,
                config,
                ramp_period,
                ramp: [config.silence; RAMP_SAMPLE_COUNT],
                active: ActiveBuffer::Idle,
                pending: None,
            });
            self.set_state(PlaybackState::Stopped);

            info!(
                "sound initialized: timer clock {} Hz, ramp {} Hz, silence {}",
                config.timer_clock_hz,
                config.ramp_sample_rate,
                config.silence
            );
            Ok(())
        })
    }

    /// Play `samples` in a loop at `sample_rate` samples per second.
    ///
    /// Ramps from whatever is on the output now to `samples[0]`, then loops
    /// `samples` once the ramp completes. A newer `start` before that
    /// completion replaces this request; only the latest one is played.
    ///
    /// `samples` must not be empty and the timer must be able to produce
    /// `sample_rate`; otherwise [`Error::InvalidArgument`] is returned and
    /// nothing changes.
    ///
    /// Takes `&'static self` because the backend is handed a pointer into the
    /// engine's ramp buffer.
    pub fn start(&'static self, samples: &'static [Sample], sample_rate: u32) -> Result<(), Error> {
        let Some(&first) = samples.first() else {
            warn!("start rejected: empty buffer");
            return Err(Error::InvalidArgument);
        };

        self.inner.lock(|inner| {
            let mut inner = inner.borrow_mut();
            let inner = inner.as_mut().ok_or(Error::NotInitialized)?;
            let Some(period) = timer_period(inner.config.timer_clock_hz, sample_rate) else {
                warn!("start rejected: sample rate {} Hz out of range", sample_rate);
                return Err(Error::InvalidArgument);
            };

            inner.backend.set_completion_irq(false);

            let state = self.state();
            let from = match state {
                PlaybackState::Stopped => inner.config.silence,
                _ => inner.live_sample(),
            };
            inner.play_ramp(from, first);
            inner.pending = Some(Target {
                samples,
                sample_rate,
                period,
            });
            self.set_state(PlaybackState::RampingUp);

            inner.backend.set_completion_irq(true);

            debug!(
                "sound start: {:?} -> RampingUp, ramp {} -> {}, {} samples at {} Hz",
                state,
                from,
                first,
                samples.len(),
                sample_rate
            );
            Ok(())
        })
    }

    /// Ramp down to silence and disable the output.
    ///
    /// A no-op when already `Stopped`. Always accepted otherwise, whatever is
    /// playing or ramping.
    pub fn stop(&'static self) -> Result<(), Error> {
        self.inner.lock(|inner| {
            let mut inner = inner.borrow_mut();
            let inner = inner.as_mut().ok_or(Error::NotInitialized)?;

            let state = self.state();
            if state == PlaybackState::Stopped {
                return Ok(());
            }

            inner.backend.set_completion_irq(false);

            let from = inner.live_sample();
            let silence = inner.config.silence;
            inner.play_ramp(from, silence);
            inner.pending = None;
            self.set_state(PlaybackState::RampingDown);

            inner.backend.set_completion_irq(true);

            debug!("sound stop: {:?} -> RampingDown, ramp {} -> {}", state, from, silence);
            Ok(())
        })
    }

    /// Transfer-complete handler. Call from the completion interrupt.
    ///
    /// Finishes a ramp: after a ramp up the pending sound starts looping, after
    /// a ramp down the output is disabled. Deliveries in any other state are
    /// ignored.
    pub fn on_transfer_complete(&self) {
        self.inner.lock(|inner| {
            let mut inner = inner.borrow_mut();
            let Some(inner) = inner.as_mut() else {
                warn!("transfer complete before init");
                return;
            };

            match self.state() {
                PlaybackState::RampingDown => {
                    inner.set_output(false);
                    inner.backend.stop();
                    inner.backend.set_completion_irq(false);
                    inner.active = ActiveBuffer::Idle;
                    self.set_state(PlaybackState::Stopped);
                    trace!("ramp down complete -> Stopped");
                }
                PlaybackState::RampingUp => {
                    let Some(target) = inner.pending.take() else {
                        // Unreachable through the public API: every ramp up
                        // records its target.
                        error!("ramp up complete without a pending sound");
                        return;
                    };

                    inner.backend.configure(TransferMode::AutoRepeat);
                    inner.set_output(true);
                    inner.backend.set_timer_period(target.period);
                    // SAFETY: `target.samples` is `'static` and immutable.
                    unsafe {
                        inner.backend.start(
                            target.samples.as_ptr(),
                            target.samples.len(),
                            inner.config.format,
                        )
                    };
                    inner.active = ActiveBuffer::Target(target.samples);
                    inner.backend.set_completion_irq(false);
                    self.set_state(PlaybackState::Playing);
                    trace!(
                        "ramp up complete -> Playing {} samples at {} Hz",
                        target.samples.len(),
                        target.sample_rate
                    );
                }
                state => {
                    warn!("spurious transfer complete in {:?}", state);
                }
            }
        })
    }

    /// Run `f` with exclusive access to the backend.
    ///
    /// Returns [`Error::NotInitialized`] before [`init`](Self::init).
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut B) -> R) -> Result<R, Error> {
        self.inner.lock(|inner| {
            let mut inner = inner.borrow_mut();
            let inner = inner.as_mut().ok_or(Error::NotInitialized)?;
            Ok(f(&mut inner.backend))
        })
    }
}
