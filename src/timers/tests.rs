use std::time::{Duration, Instant};

use super::*;

#[test]
fn test_take_due_orders_by_deadline() {
    let start = Instant::now();
    let mut timers = TimerRegistry::new();
    timers.schedule(start + Duration::from_secs(3), "late");
    timers.schedule(start + Duration::from_secs(1), "early");
    timers.schedule(start + Duration::from_secs(10), "future");

    let fired: Vec<&str> = timers
        .take_due(start + Duration::from_secs(5))
        .into_iter()
        .map(|(_, key)| key)
        .collect();

    assert_eq!(fired, vec!["early", "late"]);
    assert_eq!(timers.len(), 1);
    assert_eq!(timers.next_deadline(), Some(start + Duration::from_secs(10)));
}

#[test]
fn test_cancelled_timer_never_fires() {
    let start = Instant::now();
    let mut timers = TimerRegistry::new();
    let id = timers.schedule(start, 1);
    assert!(timers.contains(id));
    assert!(timers.cancel(id));
    assert!(!timers.cancel(id));
    assert!(timers.take_due(start + Duration::from_secs(1)).is_empty());
}

#[test]
fn test_cancel_where_and_clear() {
    let start = Instant::now();
    let mut timers = TimerRegistry::new();
    timers.schedule(start, ("a", 1));
    timers.schedule(start, ("a", 2));
    timers.schedule(start, ("b", 1));

    assert_eq!(timers.cancel_where(|(owner, _)| *owner == "a"), 2);
    assert_eq!(timers.len(), 1);
    assert_eq!(timers.clear(), 1);
    assert!(timers.is_empty());
}

#[test]
fn test_deadline_equal_to_now_is_due() {
    let start = Instant::now();
    let mut timers = TimerRegistry::new();
    timers.schedule(start, ());
    assert_eq!(timers.take_due(start).len(), 1);
}
