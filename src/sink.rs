//! Publish boundary between the listener and its subscribers.

use std::sync::Arc;

use crate::record::Measurement;

/// Destination for published measurement records.
///
/// The sink owns fan-out: subscriber lifecycles, retries and delivery
/// failures are its responsibility. The listener publishes exactly once
/// per transition, never holds a lock across the call, and keeps only the
/// latest record in memory for synchronous query.
pub trait RecordSink {
    /// Accepts a record together with its publish timestamp and the stable
    /// identifier of the emitting output.
    fn publish(&self, publish_time_millis: i64, source_id: &str, record: Measurement);
}

impl<S: RecordSink + ?Sized> RecordSink for Arc<S> {
    fn publish(&self, publish_time_millis: i64, source_id: &str, record: Measurement) {
        (**self).publish(publish_time_millis, source_id, record);
    }
}

#[cfg(test)]
pub(crate) use collecting::{CollectingSink, PublishedEvent};
