//! Word-carrying bottles drifting across the play field.
//!
//! An entity is plain data: its position is a pure function of the time it
//! has spent in view, so the simulation stays frame-rate independent and a
//! renderer only needs [`WordEntity::snapshot`].

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::trace;

use crate::clock::PauseAwareClock;

/// Play-field width in field units.
pub const FIELD_WIDTH: f64 = 1200.0;
/// Play-field height in field units.
pub const FIELD_HEIGHT: f64 = 400.0;
/// Where an entity waits before it is admitted.
pub const OFFSTAGE_X: f64 = 1400.0;
/// Where an entity appears when admitted.
pub const ENTRY_X: f64 = 1170.0;
/// Distance covered over one full transit.
pub const TRAVEL_DISTANCE: f64 = 1250.0;
/// Right edge of the visible region (exclusive).
pub const VIEW_RIGHT: f64 = 1171.0;
/// Left edge of the visible region (exclusive).
pub const VIEW_LEFT: f64 = -120.0;
/// Lanes are picked from this vertical range.
pub const LANE_RANGE: std::ops::RangeInclusive<f64> = 50.0..=250.0;
/// Number of bottle sprite variants.
pub const SPRITE_VARIANTS: u8 = 3;

/// Last removal step that is still drawn.
pub const REMOVAL_STEPS: u16 = 100;
/// Removal progress at which an entity becomes inert.
pub const REMOVAL_DONE: u16 = REMOVAL_STEPS + 1;

/// Colour of the matched prefix and the start of the removal fade.
pub const ACCENT: Rgb = Rgb(255, 200, 0);
/// Colour the removal fade ends on.
pub const WATER: Rgb = Rgb(0, 162, 232);
/// Colour of unmatched letters.
pub const PLAIN: Rgb = Rgb(255, 255, 255);

/// Base vertical offset of the word above its bottle.
pub const TEXT_OFFSET: f64 = 10.0;
/// How far a removed word rises over the whole fade.
pub const REMOVAL_RISE: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Linear interpolation towards `to`, `t` clamped to `0.0..=1.0`.
    pub fn lerp(self, to: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + t * (b as f64 - a as f64)).round() as u8;
        Rgb(mix(self.0, to.0), mix(self.1, to.1), mix(self.2, to.2))
    }
}

/// Seconds one entity takes to cross the field in a level of `count` words.
///
/// Denser levels move faster. `count div 10` and the denominator are clamped
/// to 1 so short levels get a finite transit.
pub fn transit_duration(count: usize) -> Duration {
    let tens = (count / 10).max(1) as f64;
    let denominator = (count as f64 + (count / 10) as f64 - 1.0).max(1.0);
    Duration::from_secs_f64(60.0 * tens / denominator)
}

/// How one word should be tinted this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WordTint {
    /// The first `matched` chars are accented, the rest plain.
    Highlight { matched: usize },
    /// Whole word faded to `color`, lifted by `rise` field units.
    Fading { color: Rgb, rise: f64 },
}

/// Everything a renderer needs to draw one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    pub word: String,
    pub x: f64,
    pub y: f64,
    pub sprite: u8,
    pub tint: WordTint,
    /// `false` once the removal fade has completed.
    pub shows_word: bool,
}

#[derive(Debug, Clone)]
pub struct WordEntity {
    word: String,
    lane: f64,
    sprite: u8,
    transit: Duration,
    travel: Option<PauseAwareClock>,
    highlight: usize,
    removal: u16,
}

impl WordEntity {
    pub fn new(word: impl Into<String>, transit: Duration, lane: f64, sprite: u8) -> Self {
        Self {
            word: word.into(),
            lane,
            sprite,
            transit,
            travel: None,
            highlight: 0,
            removal: 0,
        }
    }

    /// Builds the entities for one level's word list, drawing lanes and
    /// sprites from `rng`.
    pub fn for_words<R: Rng + ?Sized>(words: &[String], rng: &mut R) -> Vec<WordEntity> {
        let transit = transit_duration(words.len());
        words
            .iter()
            .map(|word| {
                let lane = rng.gen_range(LANE_RANGE);
                let sprite = rng.gen_range(1..=SPRITE_VARIANTS);
                WordEntity::new(word.clone(), transit, lane, sprite)
            })
            .collect()
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn lane(&self) -> f64 {
        self.lane
    }

    pub fn transit(&self) -> Duration {
        self.transit
    }

    pub fn highlight_len(&self) -> usize {
        self.highlight
    }

    pub fn removal_progress(&self) -> u16 {
        self.removal
    }

    /// Moves the entity to the entry edge and restarts its travel time.
    /// It starts drifting straight away unless the game is paused.
    pub fn enter_view(&mut self, now: Instant, paused: bool) {
        let mut travel = PauseAwareClock::new();
        if !paused {
            travel.start(now);
        }
        self.travel = Some(travel);
        self.highlight = 0;
        self.removal = 0;
        trace!(word = %self.word, "entity entered view");
    }

    pub fn has_entered(&self) -> bool {
        self.travel.is_some()
    }

    pub fn position_x(&self, now: Instant) -> f64 {
        match &self.travel {
            Some(travel) => {
                let elapsed = travel.elapsed(now).as_secs_f64();
                ENTRY_X - TRAVEL_DISTANCE * elapsed / self.transit.as_secs_f64()
            }
            None => OFFSTAGE_X,
        }
    }

    pub fn in_view(&self, now: Instant) -> bool {
        let x = self.position_x(now);
        VIEW_LEFT < x && x < VIEW_RIGHT
    }

    /// Admitted at some point; not eligible for admission again.
    pub fn is_used(&self, now: Instant) -> bool {
        self.position_x(now) < VIEW_RIGHT
    }

    /// Still carrying an untyped word.
    pub fn has_word(&self) -> bool {
        self.removal == 0
    }

    /// Fade finished; ignored by everything but position queries.
    pub fn is_inert(&self) -> bool {
        self.removal >= REMOVAL_DONE
    }

    pub fn pause(&mut self, now: Instant) {
        if let Some(travel) = &mut self.travel {
            travel.pause(now);
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(travel) = &mut self.travel {
            travel.start(now);
        }
    }

    /// Compares `typed` against the word, updating the highlighted prefix.
    /// Returns `true` when `commit` is set and the word matched exactly; the
    /// removal fade starts at that point.
    pub fn match_typed(&mut self, typed: &str, commit: bool, now: Instant) -> bool {
        if !self.has_word() || !self.in_view(now) {
            return false;
        }

        self.highlight = if typed.len() <= self.word.len() && self.word.starts_with(typed) {
            typed.chars().count()
        } else {
            0
        };

        if commit && typed == self.word {
            self.removal = 1;
            trace!(word = %self.word, "word matched");
            return true;
        }

        false
    }

    /// One step of the removal fade; frozen while paused.
    pub fn advance_removal(&mut self, paused: bool) {
        if self.removal > 0 && self.removal < REMOVAL_DONE && !paused {
            self.removal += 1;
        }
    }

    pub fn tint(&self) -> WordTint {
        if self.removal > 0 {
            let t = self.removal.min(REMOVAL_STEPS) as f64 / REMOVAL_STEPS as f64;
            WordTint::Fading {
                color: ACCENT.lerp(WATER, t),
                rise: REMOVAL_RISE * t,
            }
        } else {
            WordTint::Highlight {
                matched: self.highlight,
            }
        }
    }

    pub fn snapshot(&self, now: Instant) -> EntitySnapshot {
        let rise = match self.tint() {
            WordTint::Fading { rise, .. } => rise,
            WordTint::Highlight { .. } => 0.0,
        };
        EntitySnapshot {
            word: self.word.clone(),
            x: self.position_x(now),
            y: self.lane - TEXT_OFFSET - rise,
            sprite: self.sprite,
            tint: self.tint(),
            shows_word: !self.is_inert(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn entity(word: &str) -> WordEntity {
        WordEntity::new(word, secs(10.0), 100.0, 1)
    }

    #[test]
    fn waits_offstage_until_admitted() {
        let t0 = Instant::now();
        let e = entity("cat");

        assert_eq!(e.position_x(t0), OFFSTAGE_X);
        assert!(!e.in_view(t0));
        assert!(!e.is_used(t0));
    }

    #[test]
    fn position_is_function_of_elapsed_time() {
        let t0 = Instant::now();
        let mut e = entity("cat");
        e.enter_view(t0, false);

        assert_eq!(e.position_x(t0), ENTRY_X);
        assert!(e.in_view(t0));
        assert!(e.is_used(t0));
        let halfway = e.position_x(t0 + secs(5.0));
        assert!((halfway - (ENTRY_X - TRAVEL_DISTANCE / 2.0)).abs() < 1e-9);
        assert!(e.in_view(t0 + secs(10.0)));
        assert!(!e.in_view(t0 + secs(11.0)));
        assert!(e.is_used(t0 + secs(11.0)));
    }

    #[test]
    fn pause_stops_drift() {
        let t0 = Instant::now();
        let mut e = entity("cat");
        e.enter_view(t0, false);
        e.pause(t0 + secs(2.0));
        let frozen = e.position_x(t0 + secs(2.0));

        assert_eq!(e.position_x(t0 + secs(8.0)), frozen);
        e.resume(t0 + secs(8.0));
        assert_eq!(e.position_x(t0 + secs(8.0)), frozen);
        assert!(e.position_x(t0 + secs(9.0)) < frozen);
    }

    #[test]
    fn entering_while_paused_holds_at_entry() {
        let t0 = Instant::now();
        let mut e = entity("cat");
        e.enter_view(t0, true);

        assert_eq!(e.position_x(t0 + secs(3.0)), ENTRY_X);
    }

    #[test]
    fn prefix_highlights_and_mismatch_clears() {
        let t0 = Instant::now();
        let mut e = entity("cat");
        e.enter_view(t0, false);

        assert!(!e.match_typed("ca", false, t0));
        assert_eq!(e.highlight_len(), 2);
        assert!(!e.match_typed("cx", false, t0));
        assert_eq!(e.highlight_len(), 0);
        assert!(!e.match_typed("cats", false, t0));
        assert_eq!(e.highlight_len(), 0);
    }

    #[test]
    fn exact_match_without_commit_does_not_remove() {
        let t0 = Instant::now();
        let mut e = entity("cat");
        e.enter_view(t0, false);

        assert!(!e.match_typed("cat", false, t0));
        assert!(e.has_word());
        assert_eq!(e.highlight_len(), 3);
    }

    #[test]
    fn commit_starts_removal_and_later_matches_are_ignored() {
        let t0 = Instant::now();
        let mut e = entity("cat");
        e.enter_view(t0, false);

        assert!(e.match_typed("cat", true, t0));
        assert_eq!(e.removal_progress(), 1);
        assert!(!e.has_word());
        assert!(!e.match_typed("cat", true, t0));
        assert_eq!(e.removal_progress(), 1);
    }

    #[test]
    fn out_of_view_entity_is_not_matched() {
        let t0 = Instant::now();
        let mut e = entity("cat");

        assert!(!e.match_typed("cat", true, t0));
        assert!(e.has_word());
    }

    #[test]
    fn removal_runs_to_inert_and_freezes_when_paused() {
        let t0 = Instant::now();
        let mut e = entity("cat");
        e.enter_view(t0, false);
        e.match_typed("cat", true, t0);

        e.advance_removal(true);
        assert_eq!(e.removal_progress(), 1);
        for _ in 0..200 {
            e.advance_removal(false);
        }
        assert_eq!(e.removal_progress(), REMOVAL_DONE);
        assert!(e.is_inert());
        assert!(!e.snapshot(t0).shows_word);
    }

    #[test]
    fn fade_interpolates_towards_water() {
        let t0 = Instant::now();
        let mut e = entity("cat");
        e.enter_view(t0, false);
        e.match_typed("cat", true, t0);
        for _ in 0..(REMOVAL_STEPS - 1) {
            e.advance_removal(false);
        }

        assert_eq!(
            e.tint(),
            WordTint::Fading {
                color: WATER,
                rise: REMOVAL_RISE
            }
        );
        assert_eq!(e.snapshot(t0).y, 100.0 - TEXT_OFFSET - REMOVAL_RISE);
    }

    #[test]
    fn transit_shrinks_for_denser_levels() {
        assert_eq!(transit_duration(10), secs(6.0));
        assert_eq!(transit_duration(20), secs(120.0 / 21.0));
        assert!(transit_duration(30) < transit_duration(20));
    }

    #[test]
    fn transit_is_finite_for_tiny_levels() {
        assert_eq!(transit_duration(1), secs(60.0));
        assert_eq!(transit_duration(0), secs(60.0));
        assert_eq!(transit_duration(5), secs(15.0));
    }

    #[test]
    fn for_words_assigns_lanes_and_sprites_in_range() {
        use rand::{rngs::StdRng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(7);
        let words: Vec<String> = ["a", "b", "c"].iter().map(|w| w.to_string()).collect();
        let entities = WordEntity::for_words(&words, &mut rng);

        assert_eq!(entities.len(), 3);
        for e in &entities {
            assert!(LANE_RANGE.contains(&e.lane()));
            assert!((1..=SPRITE_VARIANTS).contains(&e.sprite));
            assert_eq!(e.transit(), transit_duration(3));
        }
    }
}
