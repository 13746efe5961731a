use serde::{Deserialize, Serialize};

/// One per-second WPM reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WpmSample {
    #[serde(rename = "time")]
    pub time_seconds: u32,
    pub wpm: f64,
}

impl WpmSample {
    pub fn new(time_seconds: u32, wpm: f64) -> Self {
        Self { time_seconds, wpm }
    }
}

/// Append-only WPM time series of one round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WpmSeries {
    samples: Vec<WpmSample>,
}

impl WpmSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: WpmSample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[WpmSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&WpmSample> {
        self.samples.last()
    }

    /// Highest per-second reading, 0 for an empty series.
    pub fn peak(&self) -> f64 {
        self.samples.iter().map(|s| s.wpm).fold(0.0, f64::max)
    }
}

impl From<Vec<WpmSample>> for WpmSeries {
    fn from(samples: Vec<WpmSample>) -> Self {
        Self { samples }
    }
}
