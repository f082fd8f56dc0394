//! Bounded rolling estimate of the inter-transition sampling period.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default number of intervals kept in the timing window.
pub const DEFAULT_TIMING_SAMPLES: usize = 10;

/// Fixed-capacity circular buffer of inter-event intervals.
///
/// The buffer, the write cursor and the last-event timestamp are guarded
/// jointly by a single mutex: all three are updated as a group so a
/// concurrent [`average_millis`](Self::average_millis) never observes a
/// cursor mid-update. The lock is held only for the read-modify-write,
/// recording an event is O(1) and averaging is O(capacity).
///
/// The window always holds the most recent `min(sample_count, N)`
/// intervals, overwritten in modulo-capacity order. `sample_count` never
/// decreases; the estimator has no terminal state and runs for the
/// lifetime of the listener.
#[derive(Debug)]
pub struct TimingEstimator<const N: usize = DEFAULT_TIMING_SAMPLES> {
    window: Mutex<TimingWindow<N>>,
}

#[derive(Debug)]
struct TimingWindow<const N: usize> {
    intervals: [i64; N],
    sample_count: u64,
    last_event_millis: i64,
}

impl<const N: usize> TimingEstimator<N> {
    /// Creates an estimator whose first interval will be measured from
    /// `start_millis`.
    pub fn new(start_millis: i64) -> Self {
        const { assert!(N > 0, "timing window capacity must be non-zero") }

        Self {
            window: Mutex::new(TimingWindow {
                intervals: [0; N],
                sample_count: 0,
                last_event_millis: start_millis,
            }),
        }
    }

    /// Records an event timestamp, storing the interval since the previous
    /// event in the next circular slot.
    ///
    /// Returns the recorded interval in milliseconds. Negative intervals
    /// are stored as delivered: events arriving out of timestamp order are
    /// propagated faithfully, never re-sorted.
    pub fn observe(&self, event_time_millis: i64) -> i64 {
        let mut window = self.lock();

        let interval = event_time_millis - window.last_event_millis;
        let slot = (window.sample_count % N as u64) as usize;
        window.intervals[slot] = interval;
        window.last_event_millis = event_time_millis;
        window.sample_count += 1;

        interval
    }

    /// Average interval over all `N` slots in milliseconds.
    ///
    /// Zero-initialized slots are included in the sum before the window
    /// fills, which biases the average low early in a session. Returns 0
    /// if no event was ever observed.
    pub fn average_millis(&self) -> f64 {
        let window = self.lock();

        let total: i64 = window.intervals.iter().sum();
        total as f64 / N as f64
    }

    /// Number of events observed so far.
    pub fn sample_count(&self) -> u64 {
        self.lock().sample_count
    }

    /// Window capacity.
    pub const fn capacity(&self) -> usize {
        N
    }

    #[cfg(test)]
    pub(crate) fn last_event_millis(&self) -> i64 {
        self.lock().last_event_millis
    }

    // A poisoned lock only means another thread panicked mid-update of the
    // triple; the window stays usable, so the poison flag is absorbed
    // rather than propagated into the callback path.
    fn lock(&self) -> MutexGuard<'_, TimingWindow<N>> {
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
