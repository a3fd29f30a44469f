//! File logging. The terminal belongs to the game, so nothing is ever
//! written to stdout or stderr while it runs.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{GameError, GameResult};

/// Environment variable holding the log filter, e.g. `shipwrecked=debug`.
pub const LOG_ENV: &str = "SHIPWRECKED_LOG";
const DEFAULT_FILTER: &str = "info";

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber, appending to `path`.
pub fn init(path: &Path) -> GameResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| GameError::Log(e.to_string()))
}
