//! Key bindings: which key does what on which screen.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

use crate::game::{GameSession, PromptKind};

/// What the screen currently shows, as far as keys are concerned.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeyContext {
    Title,
    Playing,
    Summary,
    Prompt,
    GameOver,
}

impl KeyContext {
    pub fn of(session: &GameSession) -> Self {
        if session.prompt().is_some() {
            KeyContext::Prompt
        } else if session.is_game_over() {
            KeyContext::GameOver
        } else if session.summary().is_some() {
            KeyContext::Summary
        } else {
            KeyContext::Playing
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Start,
    Insert(char),
    Submit,
    SubmitLast,
    Backspace,
    ClearInput,
    Redo,
    NextLevel,
    Ask(PromptKind),
    Answer(bool),
    ToggleMute,
}

pub fn map_key(key: KeyEvent, context: KeyContext) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    if ctrl && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }
    if key.code == KeyCode::Tab {
        return Some(Command::ToggleMute);
    }

    let command = match context {
        KeyContext::Title => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(Command::Start),
            KeyCode::Esc | KeyCode::Char('q') => Some(Command::Quit),
            _ => None,
        },
        KeyContext::Playing => match key.code {
            KeyCode::Esc => Some(Command::Ask(PromptKind::Quit)),
            KeyCode::Char(' ') => Some(Command::Submit),
            KeyCode::Enter => Some(Command::SubmitLast),
            KeyCode::Backspace if ctrl || alt => Some(Command::ClearInput),
            KeyCode::Backspace => Some(Command::Backspace),
            KeyCode::Char('w' | 'u') if ctrl => Some(Command::ClearInput),
            KeyCode::Char(c) if !ctrl && !alt => Some(Command::Insert(c)),
            _ => None,
        },
        KeyContext::Summary => match key.code {
            KeyCode::Esc => Some(Command::Ask(PromptKind::Quit)),
            KeyCode::Char('r') => Some(Command::Redo),
            KeyCode::Char('n') | KeyCode::Enter => Some(Command::NextLevel),
            KeyCode::Char('x') => Some(Command::Ask(PromptKind::Restart)),
            _ => None,
        },
        KeyContext::GameOver => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(Command::Ask(PromptKind::Quit)),
            KeyCode::Char('x') | KeyCode::Enter => Some(Command::Ask(PromptKind::Restart)),
            _ => None,
        },
        KeyContext::Prompt => match key.code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => Some(Command::Answer(true)),
            KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Command::Answer(false)),
            _ => None,
        },
    };

    trace!(?key, ?context, ?command, "key mapped");
    command
}

/// What the frame loop should do after a command.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
    Restart,
}

/// Applies an in-game command to the session.
pub fn apply(session: &mut GameSession, command: Command, now: Instant) -> Flow {
    match command {
        Command::Quit => return Flow::Quit,
        Command::Start => {}
        Command::Insert(c) => {
            session.type_char(c, now);
        }
        Command::Submit => {
            session.submit(now);
        }
        Command::SubmitLast => {
            session.submit_last(now);
        }
        Command::Backspace => {
            session.backspace(now);
        }
        Command::ClearInput => {
            session.clear_input(now);
        }
        Command::Redo => {
            session.redo(now);
        }
        Command::NextLevel => {
            session.advance(now);
        }
        Command::Ask(kind) => {
            session.open_prompt(kind, now);
        }
        Command::Answer(confirm) => match session.answer_prompt(confirm, now) {
            Some(PromptKind::Quit) => return Flow::Quit,
            Some(PromptKind::Restart) => return Flow::Restart,
            None => {}
        },
        Command::ToggleMute => {
            session.toggle_mute();
        }
    }
    Flow::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::SessionOptions;
    use crate::script::Script;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::CONTROL)
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        for context in [
            KeyContext::Title,
            KeyContext::Playing,
            KeyContext::Summary,
            KeyContext::Prompt,
            KeyContext::GameOver,
        ] {
            assert_eq!(
                map_key(ctrl(KeyCode::Char('c')), context),
                Some(Command::Quit)
            );
        }
    }

    #[test]
    fn tab_toggles_sound_everywhere() {
        for context in [
            KeyContext::Title,
            KeyContext::Playing,
            KeyContext::Summary,
            KeyContext::Prompt,
            KeyContext::GameOver,
        ] {
            assert_eq!(map_key(press(KeyCode::Tab), context), Some(Command::ToggleMute));
        }
    }

    #[test]
    fn playing_keys() {
        let ctx = KeyContext::Playing;
        assert_eq!(map_key(press(KeyCode::Char('a')), ctx), Some(Command::Insert('a')));
        assert_eq!(map_key(press(KeyCode::Char(' ')), ctx), Some(Command::Submit));
        assert_eq!(map_key(press(KeyCode::Enter), ctx), Some(Command::SubmitLast));
        assert_eq!(map_key(press(KeyCode::Backspace), ctx), Some(Command::Backspace));
        assert_eq!(map_key(ctrl(KeyCode::Backspace), ctx), Some(Command::ClearInput));
        assert_eq!(map_key(ctrl(KeyCode::Char('w')), ctx), Some(Command::ClearInput));
        assert_eq!(map_key(ctrl(KeyCode::Char('u')), ctx), Some(Command::ClearInput));
        assert_eq!(map_key(ctrl(KeyCode::Char('x')), ctx), None);
        assert_eq!(
            map_key(press(KeyCode::Esc), ctx),
            Some(Command::Ask(PromptKind::Quit))
        );
    }

    #[test]
    fn summary_letters_are_actions_not_typing() {
        let ctx = KeyContext::Summary;
        assert_eq!(map_key(press(KeyCode::Char('r')), ctx), Some(Command::Redo));
        assert_eq!(map_key(press(KeyCode::Char('n')), ctx), Some(Command::NextLevel));
        assert_eq!(
            map_key(press(KeyCode::Char('x')), ctx),
            Some(Command::Ask(PromptKind::Restart))
        );
        assert_eq!(map_key(press(KeyCode::Char('a')), ctx), None);
    }

    #[test]
    fn prompt_answers() {
        let ctx = KeyContext::Prompt;
        assert_eq!(map_key(press(KeyCode::Char('y')), ctx), Some(Command::Answer(true)));
        assert_eq!(map_key(press(KeyCode::Char('n')), ctx), Some(Command::Answer(false)));
        assert_eq!(map_key(press(KeyCode::Esc), ctx), Some(Command::Answer(false)));
    }

    #[test]
    fn context_follows_session_state() {
        let t0 = Instant::now();
        let mut rng = StdRng::seed_from_u64(2);
        let script = Script::parse("1||sail", &mut rng).unwrap();
        let mut session = GameSession::new(script, SessionOptions::default(), rng, t0);
        assert_eq!(KeyContext::of(&session), KeyContext::Playing);

        session.open_prompt(PromptKind::Quit, t0);
        assert_eq!(KeyContext::of(&session), KeyContext::Prompt);
        assert_eq!(apply(&mut session, Command::Answer(false), t0), Flow::Continue);
        assert_eq!(KeyContext::of(&session), KeyContext::Playing);

        let mut now = t0 + Duration::from_secs(3);
        for _ in 0..70 {
            session.update(now);
            now += Duration::from_secs(1);
        }
        assert_eq!(KeyContext::of(&session), KeyContext::Summary);
    }

    #[test]
    fn confirmed_prompts_end_the_loop() {
        let t0 = Instant::now();
        let mut rng = StdRng::seed_from_u64(2);
        let script = Script::parse("1||sail", &mut rng).unwrap();
        let mut session = GameSession::new(script, SessionOptions::default(), rng, t0);

        assert_eq!(apply(&mut session, Command::ToggleMute, t0), Flow::Continue);
        assert!(session.is_muted());

        apply(&mut session, Command::Ask(PromptKind::Restart), t0);
        assert_eq!(apply(&mut session, Command::Answer(true), t0), Flow::Restart);

        apply(&mut session, Command::Ask(PromptKind::Quit), t0);
        assert_eq!(apply(&mut session, Command::Answer(true), t0), Flow::Quit);
        assert_eq!(apply(&mut session, Command::Quit, t0), Flow::Quit);
    }
}
