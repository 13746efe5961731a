use serde::{Deserialize, Serialize};

/// Characters per word. Fixed by convention, not configurable.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Attempt counters. `correct <= total` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempts {
    pub total: u32,
    pub correct: u32,
}

impl Attempts {
    pub fn record(&mut self, was_correct: bool) {
        self.total += 1;
        if was_correct {
            self.correct += 1;
        }
    }
}

/// Positions where `typed` matches `target`.
pub fn correct_chars(target: &[char], typed: &[char]) -> usize {
    typed
        .iter()
        .zip(target)
        .filter(|(typed, expected)| typed == expected)
        .count()
}

/// Percentage of correct attempts, rounded to 2 decimals. 0 without attempts.
pub fn accuracy(attempts: Attempts) -> f64 {
    if attempts.total == 0 {
        return 0.0;
    }
    round2(attempts.correct as f64 / attempts.total as f64 * 100.0)
}

/// `round(correct / 5 / minutes)`, 0 before any time has elapsed.
pub fn wpm(correct_chars: usize, elapsed_seconds: u32) -> f64 {
    if elapsed_seconds == 0 {
        return 0.0;
    }
    let minutes = elapsed_seconds as f64 / 60.0;
    (correct_chars as f64 / CHARS_PER_WORD / minutes).round()
}

pub fn format_accuracy(accuracy: f64) -> String {
    format!("{accuracy:.2}")
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Spread of the per-second WPM readings; lower is steadier typing.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    match (mean(data), data.len()) {
        (Some(data_mean), count) if count > 0 => {
            let variance = data
                .iter()
                .map(|value| {
                    let diff = data_mean - *value;

                    diff * diff
                })
                .sum::<f64>()
                / count as f64;

            Some(variance.sqrt())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_correct_chars_is_positional() {
        assert_eq!(correct_chars(&chars("abc"), &chars("abc")), 3);
        assert_eq!(correct_chars(&chars("abc"), &chars("axc")), 2);
        assert_eq!(correct_chars(&chars("abc"), &chars("bc")), 0);
        assert_eq!(correct_chars(&chars("abc"), &chars("")), 0);
        assert_eq!(correct_chars(&chars("سنڌ"), &chars("سن")), 2);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(Attempts::default()), 0.0);
        assert_eq!(accuracy(Attempts { total: 2, correct: 1 }), 50.0);
        assert_eq!(accuracy(Attempts { total: 3, correct: 2 }), 66.67);
        assert_eq!(format_accuracy(accuracy(Attempts { total: 3, correct: 3 })), "100.00");
    }

    #[test]
    fn test_wpm() {
        assert_eq!(wpm(10, 0), 0.0);
        // 2 chars over 30s: 0.4 words / 0.5 min = 0.8
        assert_eq!(wpm(2, 30), 1.0);
        assert_eq!(wpm(25, 60), 5.0);
        assert_eq!(wpm(0, 45), 0.0);
    }

    #[test]
    fn test_attempts_record() {
        let mut attempts = Attempts::default();
        attempts.record(true);
        attempts.record(false);

        assert_eq!(attempts, Attempts { total: 2, correct: 1 });
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[10., 20., 30., 15., 22.]), Some(19.4));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[42.0]), Some(0.0));
        assert_eq!(std_dev(&[5.0, 5.0, 5.0, 5.0]), Some(0.0));
        assert_eq!(std_dev(&[]), None);
        let result = std_dev(&[-10.0, -5.0, -15.0]).unwrap();
        assert!((result - 4.08248290463863).abs() < 1e-10);
    }
}
