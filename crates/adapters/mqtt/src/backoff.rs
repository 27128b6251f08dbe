//! Reconnect backoff: doubling delay, capped, with a retry budget.

use std::time::Duration;

use crate::config::ReconnectConfig;

#[derive(Debug)]
pub(crate) struct Backoff {
    initial: Duration,
    max: Duration,
    max_retries: u32,
    current: Duration,
    failures: u32,
}

impl Backoff {
    pub(crate) fn new(config: &ReconnectConfig) -> Self {
        let initial = Duration::from_secs(config.initial_backoff_secs);
        Self {
            initial,
            max: Duration::from_secs(config.max_backoff_secs).max(initial),
            max_retries: config.max_retries,
            current: initial,
            failures: 0,
        }
    }

    /// Record a failure. Returns the delay before the next attempt, or
    /// `None` once the retry budget is spent.
    pub(crate) fn next_delay(&mut self) -> Option<Duration> {
        self.failures += 1;
        if self.failures > self.max_retries {
            return None;
        }
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        Some(delay)
    }

    /// Record a successful connection.
    pub(crate) fn reset(&mut self) {
        self.current = self.initial;
        self.failures = 0;
    }

    pub(crate) fn failures(&self) -> u32 {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(values: &[u64]) -> Vec<Option<Duration>> {
        values
            .iter()
            .map(|s| Some(Duration::from_secs(*s)))
            .collect()
    }

    #[test]
    fn should_double_up_to_the_cap() {
        let mut backoff = Backoff::new(&ReconnectConfig::default());
        let delays: Vec<_> = (0..8).map(|_| backoff.next_delay()).collect();
        assert_eq!(delays, secs(&[1, 2, 4, 8, 16, 32, 32, 32]));
    }

    #[test]
    fn should_give_up_after_max_retries() {
        let mut backoff = Backoff::new(&ReconnectConfig::default());
        let granted = std::iter::from_fn(|| backoff.next_delay()).count();
        assert_eq!(granted, 20);
        assert_eq!(backoff.failures(), 21);
    }

    #[test]
    fn should_cap_huge_initial_backoff_without_overflow() {
        let mut backoff = Backoff::new(&ReconnectConfig {
            initial_backoff_secs: u64::MAX / 2 + 1,
            max_backoff_secs: 32,
            max_retries: 3,
        });
        let first = backoff.next_delay().unwrap();
        assert_eq!(first, Duration::from_secs(u64::MAX / 2 + 1));
        assert_eq!(backoff.next_delay(), Some(first));
        assert_eq!(backoff.next_delay(), Some(first));
        assert_eq!(backoff.next_delay(), None);
    }

    #[test]
    fn should_start_over_after_reset() {
        let mut backoff = Backoff::new(&ReconnectConfig::default());
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(1)));
        assert_eq!(backoff.failures(), 1);
    }
}
