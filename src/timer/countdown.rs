//! Pausable countdown with pause-time accounting.

use std::time::{Duration, Instant};

/// A countdown computed from timestamps.
///
/// Elapsed and remaining time are derived on demand from the start instant
/// and the accumulated pause time, so repeated reads never drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownTimer {
    duration: Duration,
    started_at: Instant,
    total_paused: Duration,
    paused_at: Option<Instant>,
}

impl CountdownTimer {
    /// Start a countdown of `duration` at `now`.
    #[must_use]
    pub fn start(now: Instant, duration: Duration) -> Self {
        Self {
            duration,
            started_at: now,
            total_paused: Duration::ZERO,
            paused_at: None,
        }
    }

    /// Nominal duration, including any floor extensions.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether the countdown is frozen.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Freeze the countdown. Returns `false` if it was already paused.
    pub fn pause(&mut self, now: Instant) -> bool {
        if self.paused_at.is_some() {
            return false;
        }
        self.paused_at = Some(now);
        true
    }

    /// Unfreeze the countdown and return the time left.
    ///
    /// The remaining time is clamped to at least `floor` by extending the
    /// duration, so a resumed countdown never expires instantly. Returns
    /// `None` if the countdown was not paused.
    pub fn resume(&mut self, now: Instant, floor: Duration) -> Option<Duration> {
        let paused_at = self.paused_at.take()?;
        self.total_paused += now.saturating_duration_since(paused_at);
        Some(self.clamp_remaining(now, floor))
    }

    /// Replace the duration and return the new remaining time, at least `floor`.
    pub fn resize(&mut self, now: Instant, duration: Duration, floor: Duration) -> Duration {
        self.duration = duration;
        self.clamp_remaining(now, floor)
    }

    /// Set the duration so that exactly `remaining` is left from `now`.
    pub fn extend_to(&mut self, now: Instant, remaining: Duration) {
        self.duration = self.elapsed(now) + remaining;
    }

    /// Active (unpaused) time since the start.
    #[must_use]
    pub fn elapsed(&self, now: Instant) -> Duration {
        let end = self.paused_at.unwrap_or(now);
        end.saturating_duration_since(self.started_at)
            .saturating_sub(self.total_paused)
    }

    /// Wall-clock time since the start, pauses included.
    #[must_use]
    pub fn wall_elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    /// Total time spent paused, including a pause in progress.
    #[must_use]
    pub fn total_paused(&self, now: Instant) -> Duration {
        let current = self
            .paused_at
            .map_or(Duration::ZERO, |p| now.saturating_duration_since(p));
        self.total_paused + current
    }

    /// Time left before expiry.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        self.duration.saturating_sub(self.elapsed(now))
    }

    fn clamp_remaining(&mut self, now: Instant, floor: Duration) -> Duration {
        let elapsed = self.elapsed(now);
        if self.duration.saturating_sub(elapsed) < floor {
            self.duration = elapsed + floor;
        }
        self.remaining(now)
    }
}

/// Round a duration to the nearest whole second.
#[must_use]
pub fn whole_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_millis() >= 500)
}
