//! Dispatch counters for a bus.
//!
//! Thread-safe relaxed counters, readable at any time through
//! [`BusMetrics::snapshot`].
//!
//! ```
//! use magic_bus::Bus;
//!
//! let bus = Bus::new();
//! bus.post(String::from("nobody listens"));
//!
//! let snapshot = bus.metrics().snapshot();
//! assert_eq!(snapshot.posted, 2); // the message and its ReturnedMessage
//! assert_eq!(snapshot.returned, 1);
//! assert_eq!(snapshot.dead_letters_dropped, 1);
//! ```

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for bus activity.
#[derive(Debug, Default)]
pub struct BusMetrics {
    /// Messages dispatched, including synthesized ones.
    posted: AtomicU64,
    /// Successful mailbox deliveries.
    delivered: AtomicU64,
    /// Mailbox deliveries that returned an error.
    failed: AtomicU64,
    /// `ReturnedMessage`s synthesized.
    returned: AtomicU64,
    /// Unsubscribed `ReturnedMessage`s dropped.
    dead_letters_dropped: AtomicU64,
    /// Synthesized messages dropped for exceeding the nesting limit.
    depth_exceeded: AtomicU64,
}

impl BusMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_posted(&self) {
        self.posted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_returned(&self) {
        self.returned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dead_letter_dropped(&self) {
        self.dead_letters_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_depth_exceeded(&self) {
        self.depth_exceeded.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            posted: self.posted.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            returned: self.returned.load(Ordering::Relaxed),
            dead_letters_dropped: self.dead_letters_dropped.load(Ordering::Relaxed),
            depth_exceeded: self.depth_exceeded.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.posted.store(0, Ordering::Relaxed);
        self.delivered.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.returned.store(0, Ordering::Relaxed);
        self.dead_letters_dropped.store(0, Ordering::Relaxed);
        self.depth_exceeded.store(0, Ordering::Relaxed);
    }
}

/// Plain copy of [`BusMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub posted: u64,
    pub delivered: u64,
    pub failed: u64,
    pub returned: u64,
    pub dead_letters_dropped: u64,
    pub depth_exceeded: u64,
}

impl MetricsSnapshot {
    /// Fraction of deliveries that failed, or 0.0 with no deliveries.
    #[must_use]
    pub fn failure_rate(&self) -> f64 {
        let attempts = self.delivered + self.failed;
        if attempts == 0 {
            return 0.0;
        }
        self.failed as f64 / attempts as f64
    }
}
