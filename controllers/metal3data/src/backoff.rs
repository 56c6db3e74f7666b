//! # Fibonacci Backoff
//!
//! Hard reconciliation errors are retried on a Fibonacci schedule
//! (1m, 1m, 2m, 3m, 5m, 8m, 10m cap) tracked per Metal3Data object, so a
//! broken template does not turn into a busy loop. Transient requeues do not
//! go through here; they use the delay carried by the error.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Fibonacci backoff sequence in whole minutes
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    min_minutes: u64,
    prev_minutes: u64,
    current_minutes: u64,
    max_minutes: u64,
}

impl FibonacciBackoff {
    /// Sequence starting at `min_minutes` (twice) and capped at `max_minutes`
    #[must_use]
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            min_minutes,
            prev_minutes: 0,
            current_minutes: min_minutes,
            max_minutes,
        }
    }

    /// Current delay; advances the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let delay = Duration::from_secs(self.current_minutes * 60);
        let next = self.prev_minutes + self.current_minutes;
        self.prev_minutes = self.current_minutes;
        self.current_minutes = next.min(self.max_minutes);
        delay
    }

    /// Restart from the minimum
    pub fn reset(&mut self) {
        self.prev_minutes = 0;
        self.current_minutes = self.min_minutes;
    }
}

/// Per-object backoff state keyed by `namespace/name`
#[derive(Debug)]
pub struct BackoffTracker {
    min_minutes: u64,
    max_minutes: u64,
    states: Mutex<HashMap<String, FibonacciBackoff>>,
}

impl BackoffTracker {
    /// Tracker handing out sequences between `min_minutes` and `max_minutes`
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            min_minutes,
            max_minutes,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Next delay for a failing object
    pub fn next_for(&self, key: &str) -> Duration {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states
            .entry(key.to_string())
            .or_insert_with(|| FibonacciBackoff::new(self.min_minutes, self.max_minutes))
            .next_backoff()
    }

    /// Forget the failure history of an object after a successful pass
    pub fn reset(&self, key: &str) {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states.remove(key);
    }
}

impl Default for BackoffTracker {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minutes(m: u64) -> Duration {
        Duration::from_secs(m * 60)
    }

    #[test]
    fn test_fibonacci_backoff_sequence() {
        let mut backoff = FibonacciBackoff::new(1, 10);
        let sequence: Vec<Duration> = (0..9).map(|_| backoff.next_backoff()).collect();
        assert_eq!(
            sequence,
            vec![
                minutes(1),
                minutes(1),
                minutes(2),
                minutes(3),
                minutes(5),
                minutes(8),
                minutes(10),
                minutes(10),
                minutes(10),
            ]
        );
    }

    #[test]
    fn test_fibonacci_backoff_reset() {
        let mut backoff = FibonacciBackoff::new(1, 10);
        backoff.next_backoff();
        backoff.next_backoff();
        backoff.next_backoff();
        backoff.reset();
        assert_eq!(backoff.next_backoff(), minutes(1));
        assert_eq!(backoff.next_backoff(), minutes(1));
        assert_eq!(backoff.next_backoff(), minutes(2));
    }

    #[test]
    fn test_tracker_is_per_object() {
        let tracker = BackoffTracker::default();
        assert_eq!(tracker.next_for("ns/a"), minutes(1));
        assert_eq!(tracker.next_for("ns/a"), minutes(1));
        assert_eq!(tracker.next_for("ns/a"), minutes(2));
        assert_eq!(tracker.next_for("ns/b"), minutes(1));

        tracker.reset("ns/a");
        assert_eq!(tracker.next_for("ns/a"), minutes(1));
    }
}
