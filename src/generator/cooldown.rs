//! Real entry cooldown
//!
//! The real record is injected at most once per base window. Each check adds
//! a fresh random jitter on top of the window, so the actual gap between two
//! injections lands somewhere in `[window, window + jitter)` plus the tick
//! granularity of the generator.

use rand::Rng;
use std::time::Duration;
use time::OffsetDateTime;

/// Tracks when the real record was last included
#[derive(Debug, Clone)]
pub struct RealEntryCooldown {
    window: Duration,
    jitter: Duration,
    last_included: OffsetDateTime,
}

impl RealEntryCooldown {
    /// Create cooldown with an explicit last-inclusion time
    pub fn new(window: Duration, jitter: Duration, last_included: OffsetDateTime) -> Self {
        Self {
            window,
            jitter,
            last_included,
        }
    }

    /// Create cooldown pretending the last inclusion happened at a random
    /// whole minute within the past window
    pub fn started_at<R: Rng + ?Sized>(
        window: Duration,
        jitter: Duration,
        now: OffsetDateTime,
        rng: &mut R,
    ) -> Self {
        let window_minutes = window.as_secs() / 60;
        let minutes_ago = if window_minutes == 0 {
            0
        } else {
            rng.gen_range(0..window_minutes)
        };

        let last_included = checked_offset(Duration::from_secs(minutes_ago * 60))
            .and_then(|ago| now.checked_sub(ago))
            .unwrap_or(now);

        Self::new(window, jitter, last_included)
    }

    /// Whether `now` is past `last + window + jitter`, with jitter drawn per call
    ///
    /// A deadline beyond the representable date range is never due.
    pub fn is_due<R: Rng + ?Sized>(&self, now: OffsetDateTime, rng: &mut R) -> bool {
        let jitter_secs = self.jitter.as_secs();
        let extra = if jitter_secs == 0 {
            0
        } else {
            rng.gen_range(0..jitter_secs)
        };

        let deadline = self
            .window
            .checked_add(Duration::from_secs(extra))
            .and_then(checked_offset)
            .and_then(|wait| self.last_included.checked_add(wait));

        deadline.is_some_and(|deadline| now > deadline)
    }

    /// Reset the cooldown to start at `now`
    pub fn mark_included(&mut self, now: OffsetDateTime) {
        self.last_included = now;
    }

    pub fn last_included(&self) -> OffsetDateTime {
        self.last_included
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn jitter(&self) -> Duration {
        self.jitter
    }
}

fn checked_offset(duration: Duration) -> Option<time::Duration> {
    time::Duration::try_from(duration).ok()
}
