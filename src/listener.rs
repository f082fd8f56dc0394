//! Transition listener: turns pin-state changes into published records.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use embedded_hal::digital::PinState;

use crate::clock::{Clock, SystemClock};
use crate::record::{Measurement, OUTPUT_NAME};
use crate::sink::RecordSink;
use crate::timing::TimingEstimator;

/// Listens for tilt-switch transitions and publishes measurement records.
///
/// The listener is purely reactive: the host's interrupt layer calls
/// [`on_transition`](Self::on_transition) once per physical level change,
/// possibly from any thread. Every method takes `&self`, so the listener
/// is typically shared behind an [`Arc`](std::sync::Arc) between the
/// driver and the interrupt layer.
pub struct TiltListener<S, C = SystemClock> {
    sink: S,
    clock: C,
    timing: TimingEstimator,
    // Single-writer flag, read without further synchronization. Readers on
    // other threads get an eventually-consistent view; this relaxed
    // guarantee is intentional and part of the contract.
    last_reading: AtomicBool,
    latest: Mutex<Option<Latest>>,
}

#[derive(Clone, Copy, Debug)]
struct Latest {
    record: Measurement,
    publish_time_millis: i64,
}

/// The KY-017 pulls the signal line low when tilted.
fn tilted(level: PinState) -> bool {
    matches!(level, PinState::Low)
}

impl<S, C> TiltListener<S, C>
where
    S: RecordSink,
    C: Clock,
{
    /// Creates a listener publishing to `sink`.
    ///
    /// The first transition's interval is measured from the creation time.
    pub fn new(sink: S, clock: C) -> Self {
        let start_millis = clock.now_millis();

        Self {
            sink,
            clock,
            timing: TimingEstimator::new(start_millis),
            last_reading: AtomicBool::new(false),
            latest: Mutex::new(None),
        }
    }

    /// Seeds subscribers with the current pin level, if one is available.
    ///
    /// With `Some(level)` a first record is synthesized at the current
    /// wall-clock time, stored as latest and published immediately, so
    /// subscribers have a value before any transition occurs. With `None`
    /// (the pin could not be read) nothing is published and the listener
    /// waits for the first transition; this is never an error.
    pub fn initialize(&self, initial_level: Option<PinState>) {
        let Some(level) = initial_level else {
            log::warn!("initial tilt state unavailable, waiting for first transition");
            return;
        };

        let is_tilted = tilted(level);
        self.last_reading.store(is_tilted, Ordering::Relaxed);

        let now_millis = self.clock.now_millis();
        let record = Measurement::from_event(now_millis, is_tilted);
        self.store_latest(record, now_millis);

        log::debug!("initial reading is_tilted: {is_tilted}");
        self.sink.publish(now_millis, OUTPUT_NAME, record);
    }

    /// Handles one pin-state transition delivered by the interrupt layer.
    ///
    /// Exactly one record is published and the timing statistics are
    /// updated exactly once per call; transitions are never coalesced or
    /// dropped, and out-of-order timestamps are propagated as delivered.
    /// The timing lock is released before the sink is invoked, so a slow
    /// subscriber never blocks the interrupt path.
    pub fn on_transition(&self, level: PinState, event_time_millis: i64) {
        let is_tilted = tilted(level);
        self.last_reading.store(is_tilted, Ordering::Relaxed);

        self.timing.observe(event_time_millis);

        let record = Measurement::from_event(event_time_millis, is_tilted);
        self.store_latest(record, self.clock.now_millis());

        log::debug!("publishing is_tilted: {is_tilted}");
        self.sink.publish(event_time_millis, OUTPUT_NAME, record);
    }

    /// Estimated average time between transitions in milliseconds.
    ///
    /// Sums every slot of the timing window, including the ones still
    /// zero before it fills; returns 0 if no transition was observed yet.
    pub fn average_sampling_period_millis(&self) -> f64 {
        self.timing.average_millis()
    }

    /// Whether the listener is considered operational.
    ///
    /// Always `true` in this implementation: no liveness probing is done.
    /// Wrappers may strengthen this (for instance with a last-event-age
    /// threshold) but the default contract is "available unless explicitly
    /// marked dead".
    pub fn is_alive(&self) -> bool {
        true
    }

    /// The most recent record, seeded or transition-built.
    ///
    /// `None` until the first publish, which a consumer observes when the
    /// pin was unreadable at startup and no transition has arrived yet.
    pub fn latest_record(&self) -> Option<Measurement> {
        self.lock_latest().as_ref().map(|latest| latest.record)
    }

    /// Wall-clock time of the most recent publish, in epoch milliseconds.
    pub fn latest_record_time_millis(&self) -> Option<i64> {
        self.lock_latest()
            .as_ref()
            .map(|latest| latest.publish_time_millis)
    }

    /// Last known tilt reading.
    ///
    /// Relaxed load of the single-writer flag; see the field note on
    /// eventual consistency. Defaults to `false` before any reading.
    pub fn last_reading(&self) -> bool {
        self.last_reading.load(Ordering::Relaxed)
    }

    fn store_latest(&self, record: Measurement, publish_time_millis: i64) {
        *self.lock_latest() = Some(Latest {
            record,
            publish_time_millis,
        });
    }

    fn lock_latest(&self) -> MutexGuard<'_, Option<Latest>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn estimator(&self) -> &TimingEstimator {
        &self.timing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::sink::CollectingSink;
    use std::sync::Arc;
    use std::thread;

    fn listener_at(
        start_millis: i64,
    ) -> (
        TiltListener<Arc<CollectingSink>, Arc<ManualClock>>,
        Arc<CollectingSink>,
        Arc<ManualClock>,
    ) {
        let sink = Arc::new(CollectingSink::new());
        let clock = Arc::new(ManualClock::new(start_millis));
        let listener = TiltListener::new(Arc::clone(&sink), Arc::clone(&clock));
        (listener, sink, clock)
    }

    #[test]
    fn test_initialize_with_level_seeds_and_publishes() {
        let (listener, sink, _clock) = listener_at(1_000);

        listener.initialize(Some(PinState::Low));

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].publish_time_millis, 1_000);
        assert_eq!(events[0].source_id, "ky017");
        assert_eq!(
            events[0].record,
            Measurement {
                sample_time_seconds: 1.0,
                is_tilted: true,
            }
        );
        assert_eq!(listener.latest_record(), Some(events[0].record));
        assert_eq!(listener.latest_record_time_millis(), Some(1_000));
        assert!(listener.last_reading());
    }

    #[test]
    fn test_initialize_without_level_publishes_nothing() {
        let (listener, sink, _clock) = listener_at(1_000);

        listener.initialize(None);

        assert_eq!(sink.len(), 0);
        assert_eq!(listener.latest_record(), None);
        assert_eq!(listener.latest_record_time_millis(), None);
        assert!(!listener.last_reading());
    }

    #[test]
    fn test_transition_scenario_records_and_average() {
        let (listener, sink, clock) = listener_at(1_000);

        listener.initialize(Some(PinState::Low));

        clock.set(1_500);
        listener.on_transition(PinState::High, 1_500);

        clock.set(2_200);
        listener.on_transition(PinState::Low, 2_200);

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[1].record,
            Measurement {
                sample_time_seconds: 1.5,
                is_tilted: false,
            }
        );
        assert_eq!(events[1].publish_time_millis, 1_500);
        assert_eq!(
            events[2].record,
            Measurement {
                sample_time_seconds: 2.2,
                is_tilted: true,
            }
        );

        // Intervals 500 and 700 over the ten-slot window.
        assert_eq!(listener.average_sampling_period_millis(), 120.0);
    }

    #[test]
    fn test_one_publish_per_transition_with_polarity() {
        let (listener, sink, _clock) = listener_at(0);

        let levels = [
            PinState::Low,
            PinState::High,
            PinState::Low,
            PinState::High,
            PinState::Low,
        ];
        for (n, level) in levels.into_iter().enumerate() {
            listener.on_transition(level, (n as i64 + 1) * 100);
        }

        let events = sink.events();
        assert_eq!(events.len(), levels.len());
        for (event, level) in events.iter().zip(levels) {
            assert_eq!(event.record.is_tilted, matches!(level, PinState::Low));
        }
    }

    #[test]
    fn test_latest_record_replaced_not_merged() {
        let (listener, _sink, clock) = listener_at(0);

        clock.set(100);
        listener.on_transition(PinState::Low, 100);
        clock.set(300);
        listener.on_transition(PinState::High, 300);

        assert_eq!(
            listener.latest_record(),
            Some(Measurement {
                sample_time_seconds: 0.3,
                is_tilted: false,
            })
        );
        assert_eq!(listener.latest_record_time_millis(), Some(300));
    }

    #[test]
    fn test_average_idempotent_between_transitions() {
        let (listener, _sink, _clock) = listener_at(0);

        listener.on_transition(PinState::Low, 640);

        let first = listener.average_sampling_period_millis();
        assert_eq!(listener.average_sampling_period_millis(), first);
    }

    #[test]
    fn test_is_alive_stub() {
        let (listener, _sink, _clock) = listener_at(0);
        assert!(listener.is_alive());
    }

    #[test]
    fn test_concurrent_transitions_publish_all_and_keep_stats() {
        let (listener, sink, _clock) = listener_at(0);

        thread::scope(|scope| {
            for n in 1..=8i64 {
                let listener = &listener;
                scope.spawn(move || {
                    listener.on_transition(PinState::Low, n * 100);
                });
            }
        });

        assert_eq!(sink.len(), 8);
        assert_eq!(listener.estimator().sample_count(), 8);
    }
}
