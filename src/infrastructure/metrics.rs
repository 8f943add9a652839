//! Board counters
//!
//! Lock-free counters updated by the generator and the request handlers.
//! Logged by the generator after each cycle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime};

/// Service counters
pub struct BoardMetrics {
    /// Batches published to the snapshot store
    batches_published: AtomicU64,
    /// Batches that carried the real record
    real_entries: AtomicU64,
    /// Successful page renders
    page_renders: AtomicU64,
    /// Successful CSV exports
    csv_exports: AtomicU64,
    /// Requests answered with 500
    request_failures: AtomicU64,
    /// Last publish timestamp (Unix millis)
    last_publish_time: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

/// Counter snapshot for logging
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub batches_published: u64,
    pub real_entries: u64,
    pub page_renders: u64,
    pub csv_exports: u64,
    pub request_failures: u64,
    pub last_publish_ms: u64,
    pub uptime_seconds: u64,
}

impl BoardMetrics {
    pub fn new() -> Self {
        Self {
            batches_published: AtomicU64::new(0),
            real_entries: AtomicU64::new(0),
            page_renders: AtomicU64::new(0),
            csv_exports: AtomicU64::new(0),
            request_failures: AtomicU64::new(0),
            last_publish_time: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a published batch
    #[inline]
    pub fn record_publish(&self, with_real_entry: bool) {
        self.batches_published.fetch_add(1, Ordering::Relaxed);
        if with_real_entry {
            self.real_entries.fetch_add(1, Ordering::Relaxed);
        }

        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        self.last_publish_time.store(now, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_page_render(&self) {
        self.page_renders.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_csv_export(&self) {
        self.csv_exports.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_failure(&self) {
        self.request_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_published: self.batches_published.load(Ordering::Relaxed),
            real_entries: self.real_entries.load(Ordering::Relaxed),
            page_renders: self.page_renders.load(Ordering::Relaxed),
            csv_exports: self.csv_exports.load(Ordering::Relaxed),
            request_failures: self.request_failures.load(Ordering::Relaxed),
            last_publish_ms: self.last_publish_time.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for BoardMetrics {
    fn default() -> Self {
        Self::new()
    }
}
