// Library surface: the simulation core plus the plumbing the binary and
// the integration tests share. Rendering lives in the binary.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod controls;
pub mod entity;
pub mod error;
pub mod game;
pub mod input;
pub mod level;
pub mod logging;
pub mod matcher;
pub mod runtime;
pub mod script;
pub mod spawn;
pub mod stats;
pub mod util;

pub use error::{GameError, GameResult, ScriptError};
pub use game::{Cue, GameSession, PromptKind, SessionOptions};
