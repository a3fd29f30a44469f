//! Error types for the game.
//!
//! Nothing inside a running game fails; these cover startup: reading the
//! script, the log file and the terminal.

use std::io;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("Logging error: {0}")]
    Log(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum ScriptError {
    #[error("could not read script {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("bundled script {0} is missing or not UTF-8")]
    Bundled(String),

    #[error("script has no playable levels")]
    Empty,
}

pub type GameResult<T> = Result<T, GameError>;
