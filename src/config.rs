use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::game::SessionOptions;
use crate::level::{LevelTimings, DEFAULT_FLYOUT, DEFAULT_VOYAGE};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Frame interval of the terminal front end.
    pub tick_rate_ms: u64,
    pub level_time_limit_secs: u64,
    pub flyout_secs: f64,
    pub voyage_secs: f64,
    pub max_input_width: usize,
    pub backspace_repeat_ms: u64,
    /// Fixed seed for script variants and bottle lanes.
    pub seed: Option<u64>,
    /// Play this script instead of the bundled one.
    pub script: Option<PathBuf>,
    /// Start with sound cues off.
    pub muted: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate_ms: 33,
            level_time_limit_secs: 60,
            flyout_secs: 3.0,
            voyage_secs: 5.0,
            max_input_width: 30,
            backspace_repeat_ms: 100,
            seed: None,
            script: None,
            muted: false,
        }
    }
}

impl Config {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            timings: LevelTimings {
                time_limit: Duration::from_secs(self.level_time_limit_secs),
                flyout: secs_or_default("flyout_secs", self.flyout_secs, DEFAULT_FLYOUT),
                voyage: secs_or_default("voyage_secs", self.voyage_secs, DEFAULT_VOYAGE),
            },
            max_input_width: self.max_input_width,
            backspace_repeat: Duration::from_millis(self.backspace_repeat_ms),
            muted: self.muted,
        }
    }
}

/// Negative values clamp to zero; values no `Duration` can hold fall back.
fn secs_or_default(field: &str, secs: f64, default: Duration) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or_else(|e| {
        warn!(field, secs, error = %e, "duration out of range, using default");
        default
    })
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "shipwrecked") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("shipwrecked_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no config file, using defaults");
                return Config::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable config, using defaults");
                return Config::default();
            }
        };

        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "invalid config, using defaults");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
