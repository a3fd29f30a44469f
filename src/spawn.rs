use std::time::{Duration, Instant};

use tracing::trace;

use crate::clock::PauseAwareClock;
use crate::entity::WordEntity;

/// Words per minute the admissions are paced at: at least the level's word
/// count, at least the player's running average.
pub fn target_wpm(entity_count: usize, average_speed: f64) -> f64 {
    (entity_count as f64).max(average_speed)
}

/// Gap between two admissions at `target_wpm`.
///
/// `60 / (w + floor(w / 10) - 1)` seconds; the denominator is clamped to 1.
pub fn admission_interval(target_wpm: f64) -> Duration {
    let denominator = (target_wpm + (target_wpm / 10.0).floor() - 1.0).max(1.0);
    Duration::from_secs_f64(60.0 / denominator)
}

/// Result of asking the scheduler to bring the next entity into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The entity at this index entered view.
    Admitted(usize),
    /// Nothing left to admit; live words are still on screen.
    Waiting,
    /// Nothing left to admit and no live words, but entities are still
    /// drifting off. The level clock should stop.
    Stalled,
    /// Nothing left in view at all. The level is over.
    Exhausted,
    /// The level has no entities.
    Idle,
}

/// Decides when the next entity enters view.
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    target_wpm: f64,
    since_admission: PauseAwareClock,
    armed: bool,
}

impl Default for SpawnScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self {
            target_wpm: 0.0,
            since_admission: PauseAwareClock::new(),
            armed: false,
        }
    }

    /// Sets the pace for a new level and disarms the timer.
    pub fn configure(&mut self, entity_count: usize, average_speed: f64) {
        self.target_wpm = target_wpm(entity_count, average_speed);
        self.since_admission.reset();
        self.armed = false;
        trace!(target_wpm = self.target_wpm, "spawn cadence configured");
    }

    pub fn target_wpm(&self) -> f64 {
        self.target_wpm
    }

    pub fn interval(&self) -> Duration {
        admission_interval(self.target_wpm)
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Restarts the wait for the next admission from `now`.
    pub fn arm(&mut self, now: Instant, paused: bool) {
        self.since_admission.reset();
        if !paused {
            self.since_admission.start(now);
        }
        self.armed = true;
    }

    pub fn pause(&mut self, now: Instant) {
        self.since_admission.pause(now);
    }

    pub fn resume(&mut self, now: Instant) {
        if self.armed {
            self.since_admission.start(now);
        }
    }

    /// The interval since the last admission has run out.
    pub fn is_due(&self, now: Instant) -> bool {
        self.armed && self.since_admission.elapsed(now) > self.interval()
    }

    /// Admits the first entity that has not been used yet, or reports why
    /// nothing could be admitted.
    pub fn admit_next(
        &mut self,
        entities: &mut [WordEntity],
        now: Instant,
        paused: bool,
    ) -> Admission {
        if let Some(index) = entities.iter().position(|e| !e.is_used(now)) {
            entities[index].enter_view(now, paused);
            self.arm(now, paused);
            return Admission::Admitted(index);
        }

        if entities.is_empty() {
            return Admission::Idle;
        }

        let any_in_view = entities.iter().any(|e| e.in_view(now));
        let any_live_word = entities.iter().any(|e| e.in_view(now) && e.has_word());

        if !any_in_view {
            Admission::Exhausted
        } else if !any_live_word {
            Admission::Stalled
        } else {
            Admission::Waiting
        }
    }
}
