use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::corpus::Tier;
use crate::error::ConfigError;

/// Round lengths offered for test mode.
pub const TIMER_CHOICES: [u32; 5] = [30, 45, 60, 90, 120];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// Count down from the timer; the round ends when it runs out.
    Test,
    /// No limit; elapsed time counts up.
    Practice,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InputType {
    /// Keystrokes land directly on the displayed target.
    Over,
    /// A separate entry buffer below the target.
    Under,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub timer: u32,
    pub text_type: Tier,
    pub input_type: InputType,
    pub mode: Mode,
    pub show_virtual_keyboard: bool,
    pub show_hint: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timer: 60,
            text_type: Tier::Simple,
            input_type: InputType::Over,
            mode: Mode::Test,
            show_virtual_keyboard: false,
            show_hint: true,
        }
    }
}

impl Settings {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if !TIMER_CHOICES.contains(&self.timer) {
            return Err(ConfigError::InvalidTimer(self.timer));
        }
        Ok(self)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Settings>(json)?.validate()
    }
}

/// Where settings come from. Read-only: settings are never written back.
///
/// Loaded settings are not validated yet; callers validate once any
/// overrides have been applied.
pub trait SettingsSource {
    fn load(&self) -> Result<Settings, ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileSettingsSource {
    path: PathBuf,
}

impl FileSettingsSource {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
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

impl Default for FileSettingsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsSource for FileSettingsSource {
    /// A missing file yields the defaults; an unreadable or invalid one is an error.
    fn load(&self) -> Result<Settings, ConfigError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no settings file, using defaults");
                Ok(Settings::default())
            }
            Err(err) => Err(err.into()),
        }
    }
}
