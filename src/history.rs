use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::app_dirs::AppDirs;
use crate::config::{Mode, Settings};
use crate::corpus::Tier;
use crate::error::HistoryError;
use crate::session::SessionResult;
use crate::time_series::WpmSeries;

const PREVIOUS_ROUND_FILE: &str = "previous_round.json";
const RESULT_LOG_FILE: &str = "log.csv";

/// Receives the result of every finished round, once.
pub trait ResultSink {
    fn record(&mut self, settings: &Settings, result: &SessionResult) -> Result<(), HistoryError>;
}

/// One line of the result log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub date: DateTime<Local>,
    pub mode: Mode,
    pub tier: Tier,
    pub timer: u32,
    pub wpm: f64,
    pub accuracy: f64,
    pub samples: usize,
}

/// File-backed history: the previous round's WPM series as JSON plus an
/// append-only CSV log of every round.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self::with_dir(AppDirs::state_dir())
    }

    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn previous_path(&self) -> PathBuf {
        self.dir.join(PREVIOUS_ROUND_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join(RESULT_LOG_FILE)
    }

    /// Series of the last finished round, if one was saved.
    pub fn load_previous(&self) -> Result<Option<WpmSeries>, HistoryError> {
        match fs::read_to_string(self.previous_path()) {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save_previous(&self, series: &WpmSeries) -> Result<(), HistoryError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.previous_path(), serde_json::to_string(series)?)?;
        Ok(())
    }

    pub fn append_log(&self, record: &LogRecord) -> Result<(), HistoryError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.log_path();

        // only a new file gets a header row
        let needs_header = !path.exists();
        let file = OpenOptions::new().append(true).create(true).open(&path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_log(&self) -> Result<Vec<LogRecord>, HistoryError> {
        let path = self.log_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(path)?;
        let records = reader.deserialize().collect::<Result<Vec<LogRecord>, _>>()?;
        Ok(records)
    }
}

impl ResultSink for HistoryStore {
    fn record(&mut self, settings: &Settings, result: &SessionResult) -> Result<(), HistoryError> {
        self.save_previous(&result.wpm_samples)?;
        self.append_log(&LogRecord {
            date: Local::now(),
            mode: settings.mode,
            tier: settings.text_type,
            timer: settings.timer,
            wpm: result.wpm,
            accuracy: result.accuracy,
            samples: result.wpm_samples.len(),
        })?;
        tracing::debug!(dir = %self.dir.display(), "round recorded");
        Ok(())
    }
}
