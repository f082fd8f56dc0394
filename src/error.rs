//! Error types for the KY-017 driver.

use thiserror::Error;

/// Possible errors from the KY-017 driver.
///
/// The listener itself never fails: transitions and statistics updates are
/// infallible, and an unreadable pin at startup is treated as "no initial
/// record", not an error. What remains are the synchronous pin read and
/// lifecycle ordering.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Ky017Error<E> {
    /// The tilt input pin could not be read.
    #[error("failed to read tilt input pin: {0:?}")]
    Pin(E),
    /// `start()` was called before `initialize()`.
    #[error("driver not initialized")]
    NotInitialized,
    /// The input pin was already released by `stop()`.
    #[error("tilt input pin released")]
    PinReleased,
}

impl<E> From<E> for Ky017Error<E> {
    fn from(value: E) -> Self {
        Self::Pin(value)
    }
}
