//! Metrics hooks for encoding, hardening and linkage
//!
//! ## Usage
//!
//! ```ignore
//! use pprl_linkage::metrics::{Metrics, MetricsRecorder};
//!
//! let metrics = Metrics::new();
//!
//! let start = std::time::Instant::now();
//! dataset.encode_all(&encoder);
//! metrics.record_encoded(dataset.len(), start.elapsed());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Metrics collector for a linkage run
///
/// Thread-safe counters shared between the service and the runtime.
#[derive(Default)]
pub struct Metrics {
    /// Records turned into Bloom filters
    pub records_encoded: AtomicU64,
    /// Bit vectors produced by hardening passes
    pub vectors_hardened: AtomicU64,
    /// Dice computations performed by the scan
    pub comparisons: AtomicU64,
    /// Characteristic subsets fully linked
    pub subsets_linked: AtomicU64,
    /// Cumulative encoding time in nanoseconds
    pub encode_time_ns: AtomicU64,
    /// Cumulative hardening time in nanoseconds
    pub harden_time_ns: AtomicU64,
    /// Cumulative scan time in nanoseconds
    pub scan_time_ns: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a batch of encoded records
    pub fn record_encoded(&self, count: usize, duration: Duration) {
        self.records_encoded.fetch_add(count as u64, Ordering::Relaxed);
        self.encode_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Record one hardening pass over `count` vectors
    pub fn record_hardened(&self, count: usize, duration: Duration) {
        self.vectors_hardened.fetch_add(count as u64, Ordering::Relaxed);
        self.harden_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Record a finished subset scan
    ///
    /// # Arguments
    /// * `comparisons` - Dice computations across both variants
    /// * `duration` - Wall time of the scan
    pub fn record_subset_linked(&self, comparisons: u64, duration: Duration) {
        self.subsets_linked.fetch_add(1, Ordering::Relaxed);
        self.comparisons.fetch_add(comparisons, Ordering::Relaxed);
        self.scan_time_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_encoded: self.records_encoded.load(Ordering::Relaxed),
            vectors_hardened: self.vectors_hardened.load(Ordering::Relaxed),
            comparisons: self.comparisons.load(Ordering::Relaxed),
            subsets_linked: self.subsets_linked.load(Ordering::Relaxed),
            avg_encode_ns: self.avg_encode_time_ns(),
            avg_harden_ns: self.avg_harden_time_ns(),
            avg_scan_ms: self.avg_scan_time_ms(),
        }
    }

    /// Average encoding time per record in nanoseconds
    pub fn avg_encode_time_ns(&self) -> u64 {
        average(&self.encode_time_ns, &self.records_encoded)
    }

    /// Average hardening time per vector in nanoseconds
    pub fn avg_harden_time_ns(&self) -> u64 {
        average(&self.harden_time_ns, &self.vectors_hardened)
    }

    /// Average scan time per subset in milliseconds
    pub fn avg_scan_time_ms(&self) -> u64 {
        average(&self.scan_time_ns, &self.subsets_linked) / 1_000_000
    }
}

fn average(total: &AtomicU64, count: &AtomicU64) -> u64 {
    let total = total.load(Ordering::Relaxed);
    let count = count.load(Ordering::Relaxed);
    if count > 0 {
        total / count
    } else {
        0
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default)]
pub struct MetricsSnapshot {
    pub records_encoded: u64,
    pub vectors_hardened: u64,
    pub comparisons: u64,
    pub subsets_linked: u64,
    pub avg_encode_ns: u64,
    pub avg_harden_ns: u64,
    pub avg_scan_ms: u64,
}

/// Trait for custom metrics recording implementations
pub trait MetricsRecorder: Send + Sync {
    fn record_encoded(&self, count: usize, duration: Duration);

    fn record_hardened(&self, count: usize, duration: Duration);

    fn record_subset_linked(&self, comparisons: u64, duration: Duration);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_encoded(&self, _: usize, _: Duration) {}
    fn record_hardened(&self, _: usize, _: Duration) {}
    fn record_subset_linked(&self, _: u64, _: Duration) {}
}

impl MetricsRecorder for Metrics {
    fn record_encoded(&self, count: usize, duration: Duration) {
        Metrics::record_encoded(self, count, duration);
    }

    fn record_hardened(&self, count: usize, duration: Duration) {
        Metrics::record_hardened(self, count, duration);
    }

    fn record_subset_linked(&self, comparisons: u64, duration: Duration) {
        Metrics::record_subset_linked(self, comparisons, duration);
    }
}
