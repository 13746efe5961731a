use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "sindhi-type";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    pub fn config_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.config_dir().join("settings.json"))
            .unwrap_or_else(|| PathBuf::from("settings.json"))
    }

    /// `$HOME/.local/state/sindhi-type`, falling back to the platform data dir.
    pub fn state_dir() -> PathBuf {
        if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME)
        } else if let Some(pd) = Self::project() {
            pd.data_local_dir().to_path_buf()
        } else {
            std::env::temp_dir().join(APP_NAME)
        }
    }

    pub fn log_path() -> PathBuf {
        Self::state_dir().join(format!("{APP_NAME}.log"))
    }
}
