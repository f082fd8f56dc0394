//! Driver lifecycle for the KY-017 tilt switch.

use std::sync::Arc;

use embedded_hal::digital::{InputPin, PinState};

use crate::clock::{Clock, SystemClock};
use crate::error::Ky017Error;
use crate::listener::TiltListener;
use crate::record::Measurement;
use crate::sink::RecordSink;

/// Host-facing lifecycle of a sensor driver.
///
/// Hooks are called in the strict order `initialize()`, `start()`,
/// `stop()`. `stop()` must stay safe to call repeatedly and after a
/// partially failed `initialize()`.
pub trait SensorDriver {
    type Error;

    /// Acquires initial state and seeds subscribers where possible.
    fn initialize(&mut self) -> Result<(), Self::Error>;

    /// Begins accepting transition callbacks.
    fn start(&mut self) -> Result<(), Self::Error>;

    /// Releases hardware resources. Idempotent.
    fn stop(&mut self) -> Result<(), Self::Error>;

    /// The most recent record, if any was produced yet.
    fn latest_record(&self) -> Option<Measurement>;

    /// Connection status of the underlying output.
    fn is_alive(&self) -> bool;
}

/// Driver for the KY-017 tilt switch sensor.
///
/// Owns the input pin as a scoped resource: acquired at construction,
/// released by [`stop`](SensorDriver::stop) even if earlier lifecycle
/// steps failed. Transition delivery itself is the host platform's
/// business; it obtains a shared listener through [`handle`](Self::handle)
/// and calls [`TiltListener::on_transition`] from its interrupt dispatch
/// thread.
pub struct Ky017<PIN, S, C = SystemClock> {
    pin: Option<PIN>,
    listener: Arc<TiltListener<S, C>>,
    initialized: bool,
}

impl<PIN, S> Ky017<PIN, S>
where
    PIN: InputPin,
    S: RecordSink,
{
    /// Creates a driver reading `pin` and publishing to `sink`, stamping
    /// records with the system wall clock.
    pub fn new(pin: PIN, sink: S) -> Self {
        Self::with_clock(pin, sink, SystemClock)
    }
}

impl<PIN, S, C> Ky017<PIN, S, C>
where
    PIN: InputPin,
    S: RecordSink,
    C: Clock,
{
    /// Creates a driver with an explicit clock.
    pub fn with_clock(pin: PIN, sink: S, clock: C) -> Self {
        Self {
            pin: Some(pin),
            listener: Arc::new(TiltListener::new(sink, clock)),
            initialized: false,
        }
    }

    /// Shared listener handle for the platform's interrupt layer to
    /// deliver transitions into.
    pub fn handle(&self) -> Arc<TiltListener<S, C>> {
        Arc::clone(&self.listener)
    }

    /// Synchronously reads the current pin level.
    pub fn read_level(&mut self) -> Result<PinState, Ky017Error<PIN::Error>> {
        let pin = self.pin.as_mut().ok_or(Ky017Error::PinReleased)?;

        if pin.is_low()? {
            Ok(PinState::Low)
        } else {
            Ok(PinState::High)
        }
    }
}

impl<PIN, S, C> SensorDriver for Ky017<PIN, S, C>
where
    PIN: InputPin,
    S: RecordSink,
    C: Clock,
{
    type Error = Ky017Error<PIN::Error>;

    /// Reads the current level and seeds the listener with it.
    ///
    /// A failed pin read is not fatal: the listener starts with no initial
    /// record and waits for the first transition.
    fn initialize(&mut self) -> Result<(), Self::Error> {
        let level = match self.read_level() {
            Ok(level) => Some(level),
            Err(err) => {
                log::debug!("initial pin read failed: {err}");
                None
            }
        };

        self.listener.initialize(level);
        self.initialized = true;
        Ok(())
    }

    fn start(&mut self) -> Result<(), Self::Error> {
        if !self.initialized {
            return Err(Ky017Error::NotInitialized);
        }

        log::debug!("listening for tilt transitions");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        if self.pin.take().is_some() {
            log::debug!("released tilt input pin");
        }

        Ok(())
    }

    fn latest_record(&self) -> Option<Measurement> {
        self.listener.latest_record()
    }

    fn is_alive(&self) -> bool {
        self.listener.is_alive()
    }
}
