//! The game session: one `update` per frame ties the level, the spawn
//! cadence, typed input and the running statistics together.
//!
//! Every call takes the frame's `now`; nothing in here reads the clock.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::entity::{EntitySnapshot, WordEntity};
use crate::input::{TypedInput, DEFAULT_BACKSPACE_REPEAT, DEFAULT_MAX_WIDTH};
use crate::level::{LevelEvent, LevelStateMachine, LevelSummary, LevelTimings};
use crate::matcher;
use crate::script::Script;
use crate::spawn::{Admission, SpawnScheduler};
use crate::stats::SessionStats;
use crate::util::format_clock;

/// Sounds the front end may play. Queued, never waited on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Cue {
    WordCorrect,
    Keystroke,
    Delete,
    Button,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum PromptKind {
    Quit,
    Restart,
}

impl PromptKind {
    pub fn question(&self) -> &'static str {
        match self {
            PromptKind::Quit => "Abandon ship and quit?",
            PromptKind::Restart => "Start over from level 1?",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Prompt {
    kind: PromptKind,
    was_paused: bool,
}

/// Tunables a session is built with.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub timings: LevelTimings,
    pub max_input_width: usize,
    pub backspace_repeat: Duration,
    /// Drop cues instead of queuing them.
    pub muted: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            timings: LevelTimings::default(),
            max_input_width: DEFAULT_MAX_WIDTH,
            backspace_repeat: DEFAULT_BACKSPACE_REPEAT,
            muted: false,
        }
    }
}

#[derive(Debug)]
pub struct GameSession {
    levels: LevelStateMachine,
    scheduler: SpawnScheduler,
    stats: SessionStats,
    input: TypedInput,
    options: SessionOptions,
    paused: bool,
    prompt: Option<Prompt>,
    cues: Vec<Cue>,
    rng: StdRng,
}

impl GameSession {
    /// Starts at level 1 with its banner flying in from `now`.
    pub fn new(script: Script, options: SessionOptions, mut rng: StdRng, now: Instant) -> Self {
        info!(levels = script.len(), "new game");
        let levels = LevelStateMachine::new(script, options.timings, &mut rng, now);
        Self {
            levels,
            scheduler: SpawnScheduler::new(),
            stats: SessionStats::new(),
            input: TypedInput::new(options.max_input_width, options.backspace_repeat),
            options,
            paused: false,
            prompt: None,
            cues: Vec::new(),
            rng,
        }
    }

    /// A fresh game: new statistics, back to level 1, variants drawn again.
    pub fn restarted(self, now: Instant) -> Self {
        let (script, options, rng) = self.into_replay();
        Self::new(script, options, rng, now)
    }

    /// Ends the session and hands back what the next game starts from: the
    /// script with its variants drawn again, the options and the rng.
    pub fn into_replay(mut self) -> (Script, SessionOptions, StdRng) {
        let script = self.levels.script().reroll(&mut self.rng);
        (script, self.options, self.rng)
    }

    pub fn update(&mut self, now: Instant) {
        if let Some(LevelEvent::Started) = self.levels.update(now) {
            self.scheduler
                .configure(self.levels.entities().len(), self.stats.average_speed());
            self.scheduler.arm(now, self.paused);
            if !self.paused {
                self.levels.resume(now);
            }
        }

        if self.paused {
            return;
        }

        for entity in self.levels.entities_mut() {
            entity.advance_removal(false);
        }

        if !self.levels.is_playing() {
            return;
        }

        let live_word = self
            .levels
            .entities()
            .iter()
            .any(|e| e.in_view(now) && e.has_word());
        if !live_word || self.scheduler.is_due(now) {
            self.admit(now);
        }
    }

    fn admit(&mut self, now: Instant) {
        match self
            .scheduler
            .admit_next(self.levels.entities_mut(), now, self.paused)
        {
            Admission::Admitted(_) => {
                matcher::refresh_highlights(self.levels.entities_mut(), self.input.text(), now)
            }
            Admission::Waiting => {}
            Admission::Stalled => self.levels.hold_clock(now),
            Admission::Exhausted | Admission::Idle => self.end_level(now),
        }
    }

    fn end_level(&mut self, now: Instant) {
        self.levels.begin_ending();
        if let Some(summary) = self.levels.end_level(&mut self.stats, now) {
            info!(
                level = summary.ordinal,
                correct = summary.correct,
                total = summary.total,
                wpm = summary.words_per_minute,
                "{}",
                summary.title()
            );
        }
        self.pause(now);
        self.input.clear();
    }

    pub fn pause(&mut self, now: Instant) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.levels.pause(now);
        self.scheduler.pause(now);
        for entity in self.levels.entities_mut() {
            entity.pause(now);
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if !self.paused {
            return;
        }
        self.paused = false;
        self.levels.resume(now);
        self.scheduler.resume(now);
        for entity in self.levels.entities_mut() {
            entity.resume(now);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Typing and submitting only count while a level is in play.
    pub fn accepts_typing(&self) -> bool {
        self.levels.is_playing() && !self.paused && self.prompt.is_none()
    }

    pub fn type_char(&mut self, c: char, now: Instant) -> bool {
        if !self.accepts_typing() || !self.input.insert(c) {
            return false;
        }
        self.cue(Cue::Keystroke);
        self.refresh(now);
        true
    }

    pub fn backspace(&mut self, now: Instant) -> bool {
        if !self.accepts_typing() || !self.input.backspace(now) {
            return false;
        }
        self.cue(Cue::Delete);
        self.refresh(now);
        true
    }

    pub fn clear_input(&mut self, now: Instant) -> bool {
        if !self.accepts_typing() || !self.input.clear() {
            return false;
        }
        self.cue(Cue::Delete);
        self.refresh(now);
        true
    }

    fn cue(&mut self, cue: Cue) {
        if !self.options.muted {
            self.cues.push(cue);
        }
    }

    /// Flips sound on or off. Returns whether the game is now muted.
    pub fn toggle_mute(&mut self) -> bool {
        self.options.muted = !self.options.muted;
        self.cues.clear();
        debug!(muted = self.options.muted, "sound toggled");
        self.options.muted
    }

    pub fn is_muted(&self) -> bool {
        self.options.muted
    }

    fn refresh(&mut self, now: Instant) {
        matcher::refresh_highlights(self.levels.entities_mut(), self.input.text(), now);
    }

    /// Commits the typed text against the words in view and clears it,
    /// matched or not. Returns the index of the matched entity.
    pub fn submit(&mut self, now: Instant) -> Option<usize> {
        if !self.accepts_typing() {
            return None;
        }
        let typed = self.input.take();
        if !typed.is_empty() {
            self.cue(Cue::Keystroke);
        }
        let matched = matcher::commit(self.levels.entities_mut(), &typed, now);
        if matched.is_some() {
            self.cue(Cue::WordCorrect);
        }
        self.refresh(now);
        matched
    }

    /// Like [`submit`](Self::submit), but only when exactly one word is left.
    pub fn submit_last(&mut self, now: Instant) -> Option<usize> {
        if self.is_last_word(now) {
            self.submit(now)
        } else {
            None
        }
    }

    pub fn is_last_word(&self, now: Instant) -> bool {
        matcher::is_last_word(self.levels.entities(), now)
    }

    pub fn remaining_words(&self, now: Instant) -> usize {
        matcher::remaining_words(self.levels.entities(), now)
    }

    /// Replays the level that just ended.
    pub fn redo(&mut self, now: Instant) -> bool {
        if self.prompt.is_some() || self.levels.summary().is_none() {
            return false;
        }
        self.levels.redo_level(&mut self.rng, now);
        self.input.clear();
        self.cue(Cue::Button);
        self.resume(now);
        true
    }

    /// Moves on from a passed level, or to the voyage home after the last.
    pub fn advance(&mut self, now: Instant) -> bool {
        if self.prompt.is_some() || !self.levels.can_advance() {
            return false;
        }
        self.levels.next_level(&mut self.rng, now);
        self.input.clear();
        self.cue(Cue::Button);
        self.resume(now);
        true
    }

    pub fn open_prompt(&mut self, kind: PromptKind, now: Instant) -> bool {
        if self.prompt.is_some() {
            return false;
        }
        debug!(%kind, "prompt opened");
        self.prompt = Some(Prompt {
            kind,
            was_paused: self.paused,
        });
        self.pause(now);
        true
    }

    /// Closes the prompt. A confirmed prompt hands its kind back and leaves
    /// the game paused; a declined one restores the earlier pause state.
    pub fn answer_prompt(&mut self, confirm: bool, now: Instant) -> Option<PromptKind> {
        let prompt = self.prompt.take()?;
        self.cue(Cue::Button);
        debug!(kind = %prompt.kind, confirm, "prompt answered");
        if confirm {
            return Some(prompt.kind);
        }
        if !prompt.was_paused {
            self.resume(now);
        }
        None
    }

    pub fn prompt(&self) -> Option<PromptKind> {
        self.prompt.map(|p| p.kind)
    }

    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    pub fn levels(&self) -> &LevelStateMachine {
        &self.levels
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn scheduler(&self) -> &SpawnScheduler {
        &self.scheduler
    }

    pub fn input(&self) -> &TypedInput {
        &self.input
    }

    pub fn entities(&self) -> &[WordEntity] {
        self.levels.entities()
    }

    pub fn summary(&self) -> Option<&LevelSummary> {
        self.levels.summary()
    }

    /// Entities that have entered view, ready to draw.
    pub fn snapshots(&self, now: Instant) -> Vec<EntitySnapshot> {
        self.levels
            .entities()
            .iter()
            .filter(|e| e.has_entered())
            .map(|e| e.snapshot(now))
            .collect()
    }

    /// Level time left as `m:ss`.
    pub fn timer_display(&self, now: Instant) -> String {
        format_clock(self.levels.remaining(now))
    }

    pub fn is_game_over(&self) -> bool {
        self.levels.is_game_over()
    }

    pub fn voyage_progress(&self, now: Instant) -> Option<f64> {
        self.levels.voyage_progress(now)
    }

    pub fn voyage_finished(&self, now: Instant) -> bool {
        self.levels.voyage_finished(now)
    }

    pub fn average_speed(&self) -> f64 {
        self.stats.average_speed()
    }
}
