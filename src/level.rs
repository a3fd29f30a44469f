//! Level lifecycle: flyout, play, end-of-level summary, redo / next, and
//! the voyage home after the last level.

use std::time::{Duration, Instant};

use itertools::Itertools;
use rand::Rng;
use tracing::debug;

use crate::clock::PauseAwareClock;
use crate::entity::WordEntity;
use crate::script::{Script, ScriptLine};
use crate::stats::SessionStats;
use crate::util::words_per_minute;

/// Completion ratio at which a level counts as passed despite misses.
pub const LENIENCY_THRESHOLD: f64 = 0.9;
/// Stands in for one or more consecutive missed words.
pub const MISS_MARKER: &str = "...";

pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(60);
pub const DEFAULT_FLYOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_VOYAGE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelTimings {
    /// Cap on the level clock.
    pub time_limit: Duration,
    /// How long the level banner takes to fly across.
    pub flyout: Duration,
    /// How long the ship takes to arrive after the last level.
    pub voyage: Duration,
}

impl Default for LevelTimings {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            flyout: DEFAULT_FLYOUT,
            voyage: DEFAULT_VOYAGE,
        }
    }
}

/// Banner announcing a level, flying across before play starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flyout {
    text: String,
    clock: PauseAwareClock,
}

impl Flyout {
    pub fn new(text: impl Into<String>, duration: Duration, now: Instant) -> Self {
        let mut clock = PauseAwareClock::with_limit(duration);
        clock.start(now);
        Self {
            text: text.into(),
            clock,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.clock.is_finished(now)
    }

    pub fn progress(&self, now: Instant) -> f64 {
        self.clock.progress(now)
    }
}

/// Frozen end-of-level results.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSummary {
    pub ordinal: usize,
    pub correct: usize,
    pub total: usize,
    pub completion_ratio: f64,
    pub missed_any: bool,
    /// Typed words in order, runs of misses collapsed to [`MISS_MARKER`].
    pub miss_message: String,
    pub words_per_minute: f64,
    pub elapsed: Duration,
    pub attribution: Option<String>,
}

impl LevelSummary {
    pub fn title(&self) -> String {
        if self.missed_any {
            format!("Level {}: Incomplete", self.ordinal)
        } else {
            format!("Level {}: Completed!", self.ordinal)
        }
    }

    pub fn counts(&self) -> String {
        format!("Words correct: {}/{}", self.correct, self.total)
    }

    pub fn speed(&self) -> String {
        format!("Words per minute: {}", self.words_per_minute)
    }

    /// The next-level action is only offered when nothing counts as missed.
    pub fn can_advance(&self) -> bool {
        !self.missed_any
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LevelPhase {
    /// Banner flying in; entities built but not admitted.
    Transitioning(Flyout),
    /// Entities arriving and playable.
    Spawning,
    /// Nothing left in view; summary about to be computed.
    Ending,
    /// Summary computed, waiting for redo / next.
    Ended(LevelSummary),
    /// Every level done; the ship is on its way.
    GameOver { voyage: PauseAwareClock },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelEvent {
    /// The flyout finished and the level is now playable.
    Started,
}

fn miss_message(entities: &[WordEntity]) -> String {
    entities
        .iter()
        .map(|e| (!e.has_word()).then(|| e.word()))
        .dedup_by(|a, b| a.is_none() && b.is_none())
        .map(|word| word.unwrap_or(MISS_MARKER))
        .join(" ")
}

/// Owns the current level's entities and clock and moves between phases.
#[derive(Debug, Clone)]
pub struct LevelStateMachine {
    script: Script,
    timings: LevelTimings,
    ordinal: usize,
    entities: Vec<WordEntity>,
    clock: PauseAwareClock,
    clock_held: bool,
    phase: LevelPhase,
}

impl LevelStateMachine {
    /// Starts at level 1 with its flyout running from `now`.
    pub fn new<R: Rng + ?Sized>(
        script: Script,
        timings: LevelTimings,
        rng: &mut R,
        now: Instant,
    ) -> Self {
        let mut machine = Self {
            script,
            timings,
            ordinal: 1,
            entities: Vec::new(),
            clock: PauseAwareClock::with_limit(timings.time_limit),
            clock_held: false,
            phase: LevelPhase::Spawning,
        };
        machine.redo_level(rng, now);
        machine
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn level_count(&self) -> usize {
        self.script.len()
    }

    pub fn is_last_level(&self) -> bool {
        self.ordinal >= self.script.len()
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn line(&self) -> Option<&ScriptLine> {
        self.script.level(self.ordinal)
    }

    pub fn banner(&self) -> String {
        format!("Level {}", self.ordinal)
    }

    pub fn phase(&self) -> &LevelPhase {
        &self.phase
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.phase, LevelPhase::Spawning)
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, LevelPhase::GameOver { .. })
    }

    pub fn summary(&self) -> Option<&LevelSummary> {
        match &self.phase {
            LevelPhase::Ended(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn flyout(&self) -> Option<&Flyout> {
        match &self.phase {
            LevelPhase::Transitioning(flyout) => Some(flyout),
            _ => None,
        }
    }

    pub fn entities(&self) -> &[WordEntity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [WordEntity] {
        &mut self.entities
    }

    pub fn clock(&self) -> &PauseAwareClock {
        &self.clock
    }

    /// Time left on the level clock.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.clock.remaining(now).unwrap_or_default()
    }

    pub fn correct_count(&self) -> usize {
        self.entities.iter().filter(|e| !e.has_word()).count()
    }

    /// Advances the flyout; reports when the level becomes playable.
    pub fn update(&mut self, now: Instant) -> Option<LevelEvent> {
        match &self.phase {
            LevelPhase::Transitioning(flyout) if flyout.is_finished(now) => {
                self.phase = LevelPhase::Spawning;
                debug!(level = self.ordinal, words = self.entities.len(), "level started");
                Some(LevelEvent::Started)
            }
            _ => None,
        }
    }

    /// Resumes the banner animations, and the level clock while the level
    /// is playable and the clock has not been held.
    pub fn resume(&mut self, now: Instant) {
        match &mut self.phase {
            LevelPhase::Spawning if !self.clock_held => self.clock.start(now),
            LevelPhase::Transitioning(flyout) => flyout.clock.start(now),
            LevelPhase::GameOver { voyage } => voyage.start(now),
            _ => {}
        }
    }

    pub fn pause(&mut self, now: Instant) {
        self.clock.pause(now);
        match &mut self.phase {
            LevelPhase::Transitioning(flyout) => flyout.clock.pause(now),
            LevelPhase::GameOver { voyage } => voyage.pause(now),
            _ => {}
        }
    }

    /// Stops the level clock for the rest of the level: no live words are
    /// left, only leftovers drifting off.
    pub fn hold_clock(&mut self, now: Instant) {
        if !self.clock_held {
            debug!(level = self.ordinal, "level clock held");
        }
        self.clock.pause(now);
        self.clock_held = true;
    }

    /// Spawning → Ending.
    pub fn begin_ending(&mut self) -> bool {
        if self.is_playing() {
            self.phase = LevelPhase::Ending;
            true
        } else {
            false
        }
    }

    /// Computes the summary, records it in `stats` and moves to `Ended`.
    ///
    /// Calling it again once ended records nothing and returns the same
    /// summary. Returns `None` after game over.
    pub fn end_level(&mut self, stats: &mut SessionStats, now: Instant) -> Option<&LevelSummary> {
        match self.phase {
            LevelPhase::Ended(_) => return self.summary(),
            LevelPhase::GameOver { .. } => return None,
            _ => {}
        }

        self.clock.pause(now);
        let total = self.entities.len();
        let correct = self.correct_count();
        let completion_ratio = if total == 0 {
            1.0
        } else {
            correct as f64 / total as f64
        };
        let missed_any = correct < total && completion_ratio < LENIENCY_THRESHOLD;
        let elapsed = self.clock.elapsed(now);

        stats.record(self.ordinal, correct, elapsed);

        let summary = LevelSummary {
            ordinal: self.ordinal,
            correct,
            total,
            completion_ratio,
            missed_any,
            miss_message: miss_message(&self.entities),
            words_per_minute: words_per_minute(correct, elapsed),
            elapsed,
            attribution: self.line().and_then(|line| line.attribution.clone()),
        };
        debug!(
            level = self.ordinal,
            correct,
            total,
            missed_any,
            wpm = summary.words_per_minute,
            "level ended"
        );

        self.phase = LevelPhase::Ended(summary);
        self.summary()
    }

    pub fn can_advance(&self) -> bool {
        self.summary().is_some_and(LevelSummary::can_advance)
    }

    /// Rebuilds the current level from the same script line and flies its
    /// banner in again.
    pub fn redo_level<R: Rng + ?Sized>(&mut self, rng: &mut R, now: Instant) {
        let words = self
            .line()
            .map(|line| line.words.clone())
            .unwrap_or_default();
        self.entities = WordEntity::for_words(&words, rng);
        self.clock.reset();
        self.clock_held = false;
        self.phase = LevelPhase::Transitioning(Flyout::new(self.banner(), self.timings.flyout, now));
        debug!(level = self.ordinal, "level transitioning");
    }

    /// Moves to the next level, or to game over after the last one.
    pub fn next_level<R: Rng + ?Sized>(&mut self, rng: &mut R, now: Instant) {
        if self.is_last_level() {
            self.entities.clear();
            self.clock.pause(now);
            let mut voyage = PauseAwareClock::with_limit(self.timings.voyage);
            voyage.start(now);
            self.phase = LevelPhase::GameOver { voyage };
            debug!(levels = self.script.len(), "game over");
            return;
        }

        self.ordinal += 1;
        self.redo_level(rng, now);
    }

    /// Ship arrival progress, `None` before game over.
    pub fn voyage_progress(&self, now: Instant) -> Option<f64> {
        match &self.phase {
            LevelPhase::GameOver { voyage } => Some(voyage.progress(now)),
            _ => None,
        }
    }

    pub fn voyage_finished(&self, now: Instant) -> bool {
        match &self.phase {
            LevelPhase::GameOver { voyage } => voyage.is_finished(now),
            _ => false,
        }
    }
}
