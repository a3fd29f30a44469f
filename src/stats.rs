use std::time::Duration;

use crate::util::{truncate_to_tenth, words_per_minute};

/// One completed level as recorded in the session totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelRecord {
    pub ordinal: usize,
    pub words_correct: usize,
    pub elapsed: Duration,
    pub words_per_minute: f64,
}

/// Running totals across every level of one playthrough.
///
/// Only grows; a restart builds a fresh value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    total_words_correct: usize,
    total_elapsed: Duration,
    history: Vec<LevelRecord>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, ordinal: usize, words_correct: usize, elapsed: Duration) {
        self.total_words_correct += words_correct;
        self.total_elapsed += elapsed;
        self.history.push(LevelRecord {
            ordinal,
            words_correct,
            elapsed,
            words_per_minute: words_per_minute(words_correct, elapsed),
        });
    }

    pub fn total_words_correct(&self) -> usize {
        self.total_words_correct
    }

    pub fn total_elapsed(&self) -> Duration {
        self.total_elapsed
    }

    pub fn history(&self) -> &[LevelRecord] {
        &self.history
    }

    /// `words * 60 / seconds` over everything recorded, truncated to one
    /// decimal, or 0 before any time has been recorded.
    pub fn average_speed(&self) -> f64 {
        let secs = self.total_elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        truncate_to_tenth(self.total_words_correct as f64 * 60.0 / secs)
    }

    /// Best single-level speed so far.
    pub fn best_level_speed(&self) -> Option<f64> {
        self.history
            .iter()
            .map(|r| r.words_per_minute)
            .fold(None, |best, wpm| Some(best.map_or(wpm, |b: f64| b.max(wpm))))
    }
}
