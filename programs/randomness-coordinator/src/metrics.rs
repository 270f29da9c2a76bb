//! Counters for the coordinator's request and fulfillment paths.
//!
//! All counters are backed by atomics so a reporter may read them from
//! another thread through an `Arc<CoordinatorMetrics>`.

use std::sync::atomic::{AtomicU64, Ordering};

/// Aggregated coordinator metrics.
#[derive(Debug, Default)]
pub struct CoordinatorMetrics {
    /// Requests issued.
    pub requests_received: AtomicU64,
    /// Fulfillments whose handler ran and succeeded.
    pub fulfillments_delivered: AtomicU64,
    /// Authorized fulfillments for ids that were unknown or already fulfilled.
    pub fulfillments_discarded: AtomicU64,
    /// Fulfillment attempts from a caller other than the operator.
    pub unauthorized_attempts: AtomicU64,
    /// Fulfillment payloads that failed to decode.
    pub decode_failures: AtomicU64,
    /// Fulfillments aborted by a failing handler.
    pub handler_failures: AtomicU64,
    /// Events dropped from a full, undrained event buffer.
    pub events_dropped: AtomicU64,
}

impl CoordinatorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivery(&self) {
        self.fulfillments_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discard(&self) {
        self.fulfillments_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unauthorized(&self) {
        self.unauthorized_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_handler_failure(&self) {
        self.handler_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_event_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Fulfillment calls that reached the coordinator, whatever their outcome.
    pub fn fulfillment_attempts(&self) -> u64 {
        self.fulfillments_delivered.load(Ordering::Relaxed)
            + self.fulfillments_discarded.load(Ordering::Relaxed)
            + self.unauthorized_attempts.load(Ordering::Relaxed)
            + self.decode_failures.load(Ordering::Relaxed)
            + self.handler_failures.load(Ordering::Relaxed)
    }

    /// Serialize metrics as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "requests_received": self.requests_received.load(Ordering::Relaxed),
            "fulfillments_delivered": self.fulfillments_delivered.load(Ordering::Relaxed),
            "fulfillments_discarded": self.fulfillments_discarded.load(Ordering::Relaxed),
            "unauthorized_attempts": self.unauthorized_attempts.load(Ordering::Relaxed),
            "decode_failures": self.decode_failures.load(Ordering::Relaxed),
            "handler_failures": self.handler_failures.load(Ordering::Relaxed),
            "events_dropped": self.events_dropped.load(Ordering::Relaxed),
            "fulfillment_attempts": self.fulfillment_attempts(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let metrics = CoordinatorMetrics::new();
        assert_eq!(metrics.fulfillment_attempts(), 0);
        assert_eq!(metrics.to_json()["requests_received"], 0);
    }

    #[test]
    fn json_reflects_recorded_events() {
        let metrics = CoordinatorMetrics::new();
        metrics.record_request();
        metrics.record_request();
        metrics.record_delivery();
        metrics.record_discard();
        metrics.record_unauthorized();

        let json = metrics.to_json();
        assert_eq!(json["requests_received"], 2);
        assert_eq!(json["fulfillments_delivered"], 1);
        assert_eq!(json["fulfillments_discarded"], 1);
        assert_eq!(json["unauthorized_attempts"], 1);
        assert_eq!(json["fulfillment_attempts"], 3);
    }
}
