use super::*;

#[test]
fn manual_scheduler_hands_out_fresh_handles() {
    let mut s = ManualScheduler::new();
    let a = s.schedule_next();
    let b = s.schedule_next();
    assert_ne!(a, b);
    assert_eq!(s.pending(), Some(b));
    assert_eq!(s.scheduled_count(), 2);
}

#[test]
fn cancel_clears_only_the_matching_request() {
    let mut s = ManualScheduler::new();
    let a = s.schedule_next();
    let b = s.schedule_next();
    s.cancel(a);
    assert_eq!(s.pending(), Some(b));
    s.cancel(b);
    assert_eq!(s.pending(), None);
    assert_eq!(s.cancelled_count(), 2);
}

#[test]
fn clones_share_state() {
    let mut s = ManualScheduler::new();
    let observer = s.clone();
    let h = s.schedule_next();
    assert_eq!(observer.take_pending(), Some(h));
    assert_eq!(s.pending(), None);
}

#[test]
fn manual_clock_moves_only_when_advanced() {
    let c = ManualClock::new();
    let shared = c.clone();
    let t0 = c.now();
    assert_eq!(c.now(), t0);
    shared.advance(Duration::from_secs(31));
    assert_eq!(c.now() - t0, Duration::from_secs(31));
}
