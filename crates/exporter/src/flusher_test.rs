//! Flush scheduling tests

use std::time::Duration;

use crate::flusher::{accelerate, epoch_ms, first_push_ms, random_jitter};

// ============================================================================
// accelerate
// ============================================================================

#[test]
fn test_accelerate_halves_interval() {
    let (interval, next) = accelerate(Duration::from_secs(60), 1_000, 61_000);

    assert_eq!(interval, Duration::from_secs(30));
    // The pending wake moves halfway closer.
    assert_eq!(next, 31_000);
}

#[test]
fn test_accelerate_sequence_floors_at_one_second() {
    // 60s → 30s → 15s → 7.5s → 3.75s → 1.875s → 1s → 1s
    let mut interval = Duration::from_secs(60);
    for _ in 0..10 {
        (interval, _) = accelerate(interval, 0, 1_000);
        assert!(interval >= Duration::from_secs(1));
        assert!(interval <= Duration::from_secs(60));
    }
    assert_eq!(interval, Duration::from_secs(1));
}

#[test]
fn test_accelerate_at_floor_stays_at_floor() {
    let (interval, _) = accelerate(Duration::from_secs(1), 0, 500);
    assert_eq!(interval, Duration::from_secs(1));
}

// ============================================================================
// first_push_ms
// ============================================================================

#[test]
fn test_first_push_is_never_in_the_past() {
    for _ in 0..50 {
        let before = epoch_ms();
        let next = first_push_ms(Duration::from_secs(60));
        assert!(next >= before);
    }
}

#[test]
fn test_first_push_is_within_two_intervals() {
    // Truncation plus jitter plus the forward correction can land at most
    // two intervals out.
    let interval = Duration::from_secs(10);
    for _ in 0..50 {
        let now = epoch_ms();
        let next = first_push_ms(interval);
        assert!(next < now + 2 * interval.as_millis() as i64 + 1);
    }
}

#[test]
fn test_first_push_spreads_across_the_interval() {
    // With jitter, repeated computations should not all land on the same
    // wake time.
    let interval = Duration::from_secs(3600);
    let samples: Vec<i64> = (0..20).map(|_| first_push_ms(interval)).collect();
    let first = samples[0];
    assert!(samples.iter().any(|&s| s != first));
}

// ============================================================================
// random_jitter
// ============================================================================

#[test]
fn test_jitter_stays_below_bound() {
    let bound = Duration::from_millis(500);
    for _ in 0..200 {
        let jitter = random_jitter(bound);
        assert!(jitter < bound);
    }
}

#[test]
fn test_jitter_zero_bound() {
    assert_eq!(random_jitter(Duration::ZERO), Duration::ZERO);
}

#[test]
fn test_epoch_ms_is_monotonic_enough() {
    let a = epoch_ms();
    let b = epoch_ms();
    assert!(b >= a);
    // Sanity: after 2020.
    assert!(a > 1_577_836_800_000);
}
