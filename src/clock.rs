use std::time::{Duration, Instant};

/// Elapsed-time accounting for one timed quantity that can be paused
/// and resumed without drift.
///
/// Every query takes the caller's `now` so that a single tick reads the
/// wall clock exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PauseAwareClock {
    limit: Option<Duration>,
    started_at: Option<Instant>,
    saved: Duration,
}

impl PauseAwareClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: Duration) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// A clock that is already running from `now`.
    pub fn started(now: Instant) -> Self {
        let mut clock = Self::new();
        clock.start(now);
        clock
    }

    pub fn limit(&self) -> Option<Duration> {
        self.limit
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn start(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// Folds the running interval into the saved total. Pausing twice
    /// counts the interval once.
    pub fn pause(&mut self, now: Instant) {
        if let Some(started_at) = self.started_at.take() {
            self.saved += now.saturating_duration_since(started_at);
        }
    }

    pub fn reset(&mut self) {
        self.started_at = None;
        self.saved = Duration::ZERO;
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        let raw = match self.started_at {
            Some(started_at) => now.saturating_duration_since(started_at) + self.saved,
            None => self.saved,
        };

        match self.limit {
            Some(limit) => raw.min(limit),
            None => raw,
        }
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.limit.is_some_and(|limit| self.elapsed(now) == limit)
    }

    /// Time left before the limit, `None` for an unlimited clock.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.limit.map(|limit| limit.saturating_sub(self.elapsed(now)))
    }

    /// Fraction of the limit consumed, in `0.0..=1.0`.
    pub fn progress(&self, now: Instant) -> f64 {
        match self.limit {
            Some(limit) if !limit.is_zero() => {
                self.elapsed(now).as_secs_f64() / limit.as_secs_f64()
            }
            Some(_) => 1.0,
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn new_clock_is_stopped_at_zero() {
        let t0 = Instant::now();
        let clock = PauseAwareClock::new();

        assert!(!clock.is_running());
        assert_eq!(clock.elapsed(t0 + secs(5.0)), Duration::ZERO);
        assert!(!clock.is_finished(t0));
        assert_eq!(clock.remaining(t0), None);
    }

    #[test]
    fn elapsed_tracks_running_interval() {
        let t0 = Instant::now();
        let mut clock = PauseAwareClock::new();
        clock.start(t0);

        assert_eq!(clock.elapsed(t0 + secs(2.5)), secs(2.5));
    }

    #[test]
    fn start_while_running_keeps_origin() {
        let t0 = Instant::now();
        let mut clock = PauseAwareClock::started(t0);
        clock.start(t0 + secs(3.0));

        assert_eq!(clock.elapsed(t0 + secs(4.0)), secs(4.0));
    }

    #[test]
    fn pause_freezes_elapsed() {
        let t0 = Instant::now();
        let mut clock = PauseAwareClock::started(t0);
        clock.pause(t0 + secs(1.0));

        assert!(!clock.is_running());
        assert_eq!(clock.elapsed(t0 + secs(10.0)), secs(1.0));
    }

    #[test]
    fn double_pause_counts_interval_once() {
        let t0 = Instant::now();
        let mut clock = PauseAwareClock::started(t0);
        clock.pause(t0 + secs(1.0));
        clock.pause(t0 + secs(3.0));

        assert_eq!(clock.elapsed(t0 + secs(5.0)), secs(1.0));
    }

    #[test]
    fn elapsed_is_sum_of_running_intervals() {
        let t0 = Instant::now();
        let mut clock = PauseAwareClock::new();
        let intervals = [(0.0, 1.0), (2.0, 2.5), (4.0, 7.0), (9.0, 9.25)];

        let mut last = Duration::ZERO;
        for (start, stop) in intervals {
            clock.start(t0 + secs(start));
            let mid = clock.elapsed(t0 + secs((start + stop) / 2.0));
            assert!(mid >= last);
            clock.pause(t0 + secs(stop));
            let now = clock.elapsed(t0 + secs(stop));
            assert!(now >= mid);
            last = now;
        }

        assert_eq!(clock.elapsed(t0 + secs(20.0)), secs(1.0 + 0.5 + 3.0 + 0.25));
    }

    #[test]
    fn reset_clears_everything() {
        let t0 = Instant::now();
        let mut clock = PauseAwareClock::started(t0);
        clock.pause(t0 + secs(2.0));
        clock.start(t0 + secs(3.0));
        clock.reset();

        assert!(!clock.is_running());
        assert_eq!(clock.elapsed(t0 + secs(9.0)), Duration::ZERO);
    }

    #[test]
    fn limit_clamps_and_finishes() {
        let t0 = Instant::now();
        let mut clock = PauseAwareClock::with_limit(secs(60.0));
        clock.start(t0);

        assert!(!clock.is_finished(t0 + secs(59.0)));
        assert_eq!(clock.remaining(t0 + secs(59.0)), Some(secs(1.0)));
        assert_eq!(clock.elapsed(t0 + secs(75.0)), secs(60.0));
        assert!(clock.is_finished(t0 + secs(75.0)));
        assert_eq!(clock.remaining(t0 + secs(75.0)), Some(Duration::ZERO));
        assert_eq!(clock.progress(t0 + secs(75.0)), 1.0);
    }

    #[test]
    fn earlier_now_does_not_underflow() {
        let t0 = Instant::now();
        let mut clock = PauseAwareClock::started(t0 + secs(1.0));

        assert_eq!(clock.elapsed(t0), Duration::ZERO);
        clock.pause(t0);
        assert_eq!(clock.elapsed(t0 + secs(5.0)), Duration::ZERO);
    }
}
