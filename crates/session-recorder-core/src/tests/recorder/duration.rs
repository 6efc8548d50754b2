use crate::{DurationTracker, active_duration};

use std::time::{Duration, Instant};

/// WHAT: Active time excludes completed pauses
/// WHY: Reported duration must reflect audio actually recorded
#[test]
fn given_completed_pause_when_computing_then_pause_excluded() {
    // Given: 10s elapsed with 3s of completed pauses
    let start = Instant::now();
    let now = start + Duration::from_secs(10);

    // When: Computing active time
    let active = active_duration(now, start, Duration::from_secs(3), None);

    // Then: 7s
    assert_eq!(active, Duration::from_secs(7));
}

/// WHAT: An in-progress pause is excluded too
/// WHY: Duration must freeze while paused
#[test]
fn given_pause_in_progress_when_computing_then_current_pause_excluded() {
    // Given: 10s elapsed, 2s paused earlier, paused again since second 6
    let start = Instant::now();
    let now = start + Duration::from_secs(10);
    let paused_at = start + Duration::from_secs(6);

    // When: Computing active time
    let active = active_duration(now, start, Duration::from_secs(2), Some(paused_at));

    // Then: 10 - 2 - 4 = 4s
    assert_eq!(active, Duration::from_secs(4));
}

/// WHAT: Duration never goes negative
/// WHY: Inconsistent inputs must not underflow into a panic or huge value
#[test]
fn given_paused_total_larger_than_elapsed_when_computing_then_zero() {
    // Given: More paused time than elapsed time
    let start = Instant::now();
    let now = start + Duration::from_secs(1);

    // When: Computing active time
    let active = active_duration(now, start, Duration::from_secs(5), None);

    // Then: Zero
    assert_eq!(active, Duration::ZERO);
}

/// WHAT: Tracker accumulates each pause span exactly once
/// WHY: paused_total may only grow when a pause ends, by that pause's span
#[test]
fn given_two_pauses_when_resuming_each_then_paused_total_is_their_sum() {
    // Given: A tracker started at t0
    let t0 = Instant::now();
    let mut tracker = DurationTracker::start(t0);

    // When: Pausing 2s..5s and 8s..9s
    tracker.pause(t0 + Duration::from_secs(2));
    assert_eq!(tracker.paused_total(), Duration::ZERO);
    tracker.resume(t0 + Duration::from_secs(5));
    tracker.pause(t0 + Duration::from_secs(8));
    tracker.resume(t0 + Duration::from_secs(9));

    // Then: 4s paused, 6s active at t=10s
    assert_eq!(tracker.paused_total(), Duration::from_secs(4));
    assert_eq!(tracker.active(t0 + Duration::from_secs(10)), Duration::from_secs(6));
    assert!(!tracker.is_paused());
}

/// WHAT: Repeated pause keeps the first pause instant
/// WHY: A duplicate pause must not shorten the excluded span
#[test]
fn given_paused_tracker_when_pausing_again_then_original_instant_kept() {
    // Given: A tracker paused at 2s
    let t0 = Instant::now();
    let mut tracker = DurationTracker::start(t0);
    tracker.pause(t0 + Duration::from_secs(2));

    // When: Pausing again at 4s and resuming at 6s
    tracker.pause(t0 + Duration::from_secs(4));
    tracker.resume(t0 + Duration::from_secs(6));

    // Then: The whole 2s..6s span was excluded
    assert_eq!(tracker.paused_total(), Duration::from_secs(4));
}

/// WHAT: Resume without a pause changes nothing
/// WHY: paused_total only changes when leaving a pause
#[test]
fn given_running_tracker_when_resuming_then_no_change() {
    // Given: A running tracker
    let t0 = Instant::now();
    let mut tracker = DurationTracker::start(t0);

    // When: Resuming without pausing
    tracker.resume(t0 + Duration::from_secs(3));

    // Then: Nothing excluded
    assert_eq!(tracker.paused_total(), Duration::ZERO);
    assert_eq!(tracker.active(t0 + Duration::from_secs(3)), Duration::from_secs(3));
}
