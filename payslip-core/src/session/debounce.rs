use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Holds back a stream of values until input has been quiet for `delay`.
///
/// Every `push` restarts the timer. The caller supplies `now` so the
/// debouncer can be driven by any clock.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces any pending value and restarts the quiet period.
    pub fn push(
        &mut self,
        value: T,
        now: Instant,
    ) {
        self.pending = Some((value, now));
    }

    /// Yields the latest value once, after the quiet period has elapsed.
    pub fn poll(
        &mut self,
        now: Instant,
    ) -> Option<T> {
        match &self.pending {
            Some((_, pushed_at)) if now.saturating_duration_since(*pushed_at) >= self.delay => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value settles, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, pushed_at)| *pushed_at + self.delay)
    }

    /// Yields the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn nothing_settles_before_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.push("a", start);

        assert_eq!(debouncer.poll(start + 499 * MS), None);
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.poll(start + 500 * MS), Some("a"));
        assert_eq!(debouncer.poll(start + 900 * MS), None);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn each_push_restarts_the_timer() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(500 * MS);
        debouncer.push(1, start);
        debouncer.push(2, start + 300 * MS);
        debouncer.push(3, start + 600 * MS);

        assert_eq!(debouncer.poll(start + 1000 * MS), None);
        assert_eq!(debouncer.deadline(), Some(start + 1100 * MS));
        assert_eq!(debouncer.poll(start + 1100 * MS), Some(3));
    }

    #[test]
    fn flush_skips_the_wait() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.push("x", start);

        assert_eq!(debouncer.flush(), Some("x"));
        assert_eq!(debouncer.flush(), None);
    }
}
