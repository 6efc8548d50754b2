use std::time::{Duration, Instant};

/// Wall-clock bookkeeping for one recording session.
///
/// `paused_total` only grows, and only when a pause ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationTracker {
    started_at: Instant,
    paused_at: Option<Instant>,
    paused_total: Duration,
}

impl DurationTracker {
    /// Starts tracking at `now`.
    pub fn start(now: Instant) -> Self {
        Self {
            started_at: now,
            paused_at: None,
            paused_total: Duration::ZERO,
        }
    }

    /// Marks the beginning of a pause. A second call while already paused
    /// keeps the original pause instant.
    pub fn pause(&mut self, now: Instant) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    /// Ends the current pause, adding its span to the paused total.
    pub fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += now.saturating_duration_since(paused_at);
        }
    }

    /// Whether a pause is in progress.
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Sum of completed pauses.
    pub fn paused_total(&self) -> Duration {
        self.paused_total
    }

    /// Active recording time at `now`.
    pub fn active(&self, now: Instant) -> Duration {
        active_duration(now, self.started_at, self.paused_total, self.paused_at)
    }
}

/// Elapsed time since `started_at` minus every paused span, including an
/// in-progress pause starting at `paused_at`. Never negative.
pub fn active_duration(
    now: Instant,
    started_at: Instant,
    paused_total: Duration,
    paused_at: Option<Instant>,
) -> Duration {
    let elapsed = now.saturating_duration_since(started_at);
    let in_progress = paused_at
        .map(|paused_at| now.saturating_duration_since(paused_at))
        .unwrap_or(Duration::ZERO);

    elapsed
        .saturating_sub(paused_total)
        .saturating_sub(in_progress)
}
