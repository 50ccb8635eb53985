#![cfg_attr(not(test), no_std)]
#![doc = "Pop-free sound output for a DMA-fed DAC clocked by a timer."]
#![doc = ""]
#![doc = "[`Sound`] plays a caller-supplied waveform buffer in a loop and ramps the"]
#![doc = "output linearly whenever playback starts, stops or switches, so the"]
#![doc = "speaker never sees a step. [`generate`] renders single periods of basic"]
#![doc = "waveforms to feed it. Hardware access goes through [`TransferBackend`]."]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod backend;
pub mod config;
mod error;
pub mod ramp;
pub mod sound;
pub mod wave;

pub use backend::{timer_period, TransferBackend, TransferMode};
pub use config::{SampleFormat, SoundConfig};
pub use error::Error;
pub use ramp::RAMP_SAMPLE_COUNT;
pub use sound::{PlaybackState, Sound};
pub use wave::{generate, WaveType};

/// One converter sample. `0..=u16::MAX`, aligned per [`SampleFormat`].
pub type Sample = u16;
