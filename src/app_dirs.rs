use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "shipwrecked";

/// Where the game keeps its files outside the config dir.
pub struct AppDirs;

impl AppDirs {
    /// Where the log file goes when `--log-file` is not given.
    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("shipwrecked.log"))
    }

    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            )
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }
}
