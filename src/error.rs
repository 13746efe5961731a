use thiserror::Error;

use crate::corpus::Tier;

/// Errors from the sentence provider.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CorpusError {
    #[error("no sentences configured for the {0} tier")]
    EmptyTier(Tier),
    #[error("corpus file {0} not found")]
    Missing(String),
    #[error("corpus is not valid UTF-8")]
    Encoding,
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
}

/// Errors while loading or validating settings.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("timer must be one of 30, 45, 60, 90 or 120 seconds, got {0}")]
    InvalidTimer(u32),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
}

/// Raised when a round cannot be started.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RoundError {
    #[error("cannot start a round: {0}")]
    Corpus(#[from] CorpusError),
}

/// Errors emitted by result sinks.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
