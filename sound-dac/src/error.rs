//! Error kinds shared by the sound engine and the waveform generator.

use core::fmt;

/// Sound driver error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// An argument was rejected before any state or hardware was touched:
    /// an empty buffer, an unknown wave type code, or a sample rate the
    /// sample-clock timer cannot produce.
    InvalidArgument,
    /// [`Sound::init`](crate::Sound::init) has not been called yet.
    NotInitialized,
    /// [`Sound::init`](crate::Sound::init) was called twice on the same engine.
    AlreadyInitialized,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument => f.write_str("invalid argument"),
            Error::NotInitialized => f.write_str("sound engine not initialized"),
            Error::AlreadyInitialized => f.write_str("sound engine already initialized"),
        }
    }
}
