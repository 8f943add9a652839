//! Generator task
//!
//! Owns the RNG and the cooldown. Each cycle builds a fresh batch, decides
//! whether the real record goes in, and publishes the result to the
//! snapshot store. Runs on a fixed interval until cancelled.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::Level;

use crate::core::{Batch, SnapshotStore};
use crate::generator::cooldown::RealEntryCooldown;
use crate::infrastructure::config::GeneratorConfig;
use crate::infrastructure::metrics::BoardMetrics;
use crate::log_generator;

/// Shortest interval between cycles
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Outcome of one generation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub records: usize,
    pub real_index: Option<usize>,
    pub generated_at: OffsetDateTime,
}

/// Periodic batch generator
pub struct Generator {
    rng: ChaCha8Rng,
    cooldown: RealEntryCooldown,
    real_name: String,
    emit_ids: bool,
    interval: Duration,
    store: Arc<SnapshotStore>,
    metrics: Arc<BoardMetrics>,
}

impl Generator {
    /// Create generator with the cooldown started relative to the current time
    pub fn new(
        config: &GeneratorConfig,
        real_name: impl Into<String>,
        store: Arc<SnapshotStore>,
        metrics: Arc<BoardMetrics>,
    ) -> Self {
        Self::starting_at(config, real_name, store, metrics, OffsetDateTime::now_utc())
    }

    /// Create generator with the cooldown started relative to `now`
    pub fn starting_at(
        config: &GeneratorConfig,
        real_name: impl Into<String>,
        store: Arc<SnapshotStore>,
        metrics: Arc<BoardMetrics>,
        now: OffsetDateTime,
    ) -> Self {
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let cooldown =
            RealEntryCooldown::started_at(config.base_window(), config.jitter(), now, &mut rng);

        Self {
            rng,
            cooldown,
            real_name: real_name.into(),
            emit_ids: config.emit_ids,
            interval: config.interval(),
            store,
            metrics,
        }
    }

    /// Replace the cooldown, e.g. to force or suppress the next injection
    pub fn with_cooldown(mut self, cooldown: RealEntryCooldown) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn cooldown(&self) -> &RealEntryCooldown {
        &self.cooldown
    }

    /// Build, maybe inject, publish
    pub fn run_cycle(&mut self, now: OffsetDateTime) -> CycleReport {
        let mut batch = Batch::generate(&mut self.rng, self.emit_ids, now);

        let real_index = if self.cooldown.is_due(now, &mut self.rng) {
            let idx = batch.inject_real(&mut self.rng, &self.real_name);
            self.cooldown.mark_included(now);
            idx
        } else {
            None
        };

        let report = CycleReport {
            records: batch.len(),
            real_index,
            generated_at: now,
        };

        self.store.publish(batch);
        self.metrics.record_publish(real_index.is_some());

        match real_index {
            Some(idx) => log_generator!(
                Level::INFO,
                "Published {} records, real entry at slot {}",
                report.records,
                idx
            ),
            None => log_generator!(Level::INFO, "Published {} records", report.records),
        }
        log_generator!(Level::DEBUG, "Metrics: {:?}", self.metrics.snapshot());

        report
    }

    /// Run cycles every interval until `shutdown` is cancelled
    ///
    /// The first cycle runs immediately. Intervals below [`MIN_INTERVAL`]
    /// are raised to it.
    pub async fn run(mut self, shutdown: CancellationToken) {
        let mut ticker = interval(self.interval.max(MIN_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log_generator!(Level::INFO, "Generator started, interval {:?}", self.interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    log_generator!(Level::INFO, "Generator stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_cycle(OffsetDateTime::now_utc());
                }
            }
        }
    }
}
