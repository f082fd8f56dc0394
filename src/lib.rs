//! KY-017 Tilt Switch Sensor Driver
//!
//! This crate provides an event-driven driver for the KY-017 tilt switch,
//! converting GPIO pin-state transitions into timestamped measurement
//! records, publishing them to a subscriber sink, and tracking
//! sampling-interval statistics.
//!
//! # Features
//! - Reactive callback API: no polling loop, transitions are pushed in by
//!   the host's interrupt layer via [`TiltListener::on_transition`]
//! - Bounded rolling-average sampling-period estimator ([`TimingEstimator`])
//! - Platform-agnostic pin access through [`embedded-hal`] traits
//! - Logging through the [`log`] facade
//!
//! # Polarity
//! The KY-017 pulls its signal line LOW when tilted, so an electrically low
//! pin level is reported as `is_tilted = true`. This is fixed by the
//! hardware, not configurable.
//!
//! # Dependencies
//! This driver depends on the following `embedded-hal` traits:
//! - [`InputPin`] for the synchronous current-level read at startup
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`log`]: https://docs.rs/log
//! [`InputPin`]: embedded_hal::digital::InputPin

pub mod clock;
pub mod error;
pub mod ky017;
pub mod listener;
pub mod record;
pub mod sink;
pub mod timing;

pub use clock::{Clock, SystemClock};
pub use error::Ky017Error;
pub use ky017::{Ky017, SensorDriver};
pub use listener::TiltListener;
pub use record::{Measurement, RecordSchema, TextEncoding};
pub use sink::RecordSink;
pub use timing::TimingEstimator;
