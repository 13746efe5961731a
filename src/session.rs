//! The typing-session state machine.
//!
//! A [`Session`] moves `Idle -> Running -> Finished` and never back. Key events
//! and one-second ticks are applied in arrival order by a single owner; the
//! finish transition returns the [`SessionResult`] exactly once.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{Mode, Settings};
use crate::input::{classify, KeyAction, KeyInput};
use crate::keymap::KeyMap;
use crate::metrics::{self, Attempts};
use crate::runtime::{RoundId, TickScheduler, TimerHandle};
use crate::time_series::{WpmSample, WpmSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Lifecycle {
    Idle,
    Running,
    Finished,
}

/// Session clock. In test mode `remaining_seconds` counts down from the
/// limit; practice mode has no limit. `elapsed_seconds` counts up in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    mode: Mode,
    limit_seconds: Option<u32>,
    remaining_seconds: Option<u32>,
    elapsed_seconds: u32,
}

impl Timer {
    pub fn test(limit_seconds: u32) -> Self {
        Self {
            mode: Mode::Test,
            limit_seconds: Some(limit_seconds),
            remaining_seconds: Some(limit_seconds),
            elapsed_seconds: 0,
        }
    }

    pub fn practice() -> Self {
        Self {
            mode: Mode::Practice,
            limit_seconds: None,
            remaining_seconds: None,
            elapsed_seconds: 0,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        match settings.mode {
            Mode::Test => Self::test(settings.timer),
            Mode::Practice => Self::practice(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn limit_seconds(&self) -> Option<u32> {
        self.limit_seconds
    }

    pub fn remaining_seconds(&self) -> Option<u32> {
        self.remaining_seconds
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    /// Elapsed time the metrics use: `limit - remaining` in test mode, the
    /// running count in practice mode.
    pub fn metric_seconds(&self) -> u32 {
        match (self.mode, self.limit_seconds, self.remaining_seconds) {
            (Mode::Test, Some(limit), Some(remaining)) => limit.saturating_sub(remaining),
            _ => self.elapsed_seconds,
        }
    }

    fn reset(&mut self) {
        self.remaining_seconds = self.limit_seconds;
        self.elapsed_seconds = 0;
    }

    /// Advance one second. Returns true when a test-mode countdown hits zero.
    fn advance(&mut self) -> bool {
        self.elapsed_seconds += 1;
        match (self.mode, self.remaining_seconds.as_mut()) {
            (Mode::Test, Some(remaining)) => {
                *remaining = remaining.saturating_sub(1);
                *remaining == 0
            }
            _ => false,
        }
    }
}

/// Terminal output of a round, handed to the result sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub wpm: f64,
    pub accuracy: f64,
    pub wpm_samples: WpmSeries,
}

impl SessionResult {
    pub fn accuracy_display(&self) -> String {
        metrics::format_accuracy(self.accuracy)
    }
}

#[derive(Debug)]
pub struct Session {
    round: RoundId,
    target: Vec<char>,
    typed: Vec<char>,
    attempts: Attempts,
    timer: Timer,
    lifecycle: Lifecycle,
    samples: WpmSeries,
    result: Option<SessionResult>,
    scheduler: Arc<dyn TickScheduler>,
    timer_handle: Option<TimerHandle>,
}

impl Session {
    pub fn new(target: &str, timer: Timer, scheduler: Arc<dyn TickScheduler>) -> Self {
        Self {
            round: RoundId::next(),
            target: target.chars().collect(),
            typed: Vec::new(),
            attempts: Attempts::default(),
            timer,
            lifecycle: Lifecycle::Idle,
            samples: WpmSeries::new(),
            result: None,
            scheduler,
            timer_handle: None,
        }
    }

    pub fn round(&self) -> RoundId {
        self.round
    }

    pub fn target(&self) -> &[char] {
        &self.target
    }

    pub fn target_text(&self) -> String {
        self.target.iter().collect()
    }

    pub fn typed(&self) -> &[char] {
        &self.typed
    }

    pub fn typed_text(&self) -> String {
        self.typed.iter().collect()
    }

    pub fn attempts(&self) -> Attempts {
        self.attempts
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn is_finished(&self) -> bool {
        self.lifecycle == Lifecycle::Finished
    }

    pub fn samples(&self) -> &WpmSeries {
        &self.samples
    }

    /// The result emitted by the finish transition, once finished.
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    /// Whether this session currently holds a live tick source.
    pub fn timer_armed(&self) -> bool {
        self.timer_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_cancelled())
    }

    pub fn next_expected(&self) -> Option<char> {
        self.target.get(self.typed.len()).copied()
    }

    pub fn correct_chars(&self) -> usize {
        metrics::correct_chars(&self.target, &self.typed)
    }

    pub fn accuracy(&self) -> f64 {
        metrics::accuracy(self.attempts)
    }

    pub fn wpm(&self) -> f64 {
        metrics::wpm(self.correct_chars(), self.elapsed_seconds_for_metrics())
    }

    pub fn elapsed_seconds_for_metrics(&self) -> u32 {
        self.timer.metric_seconds()
    }

    /// Every typed unit with whether it matches the target at its position.
    pub fn position_outcomes(&self) -> impl Iterator<Item = (char, bool)> + '_ {
        self.typed
            .iter()
            .zip(&self.target)
            .map(|(typed, expected)| (*typed, typed == expected))
    }

    /// Explicit start action. Only acts on an idle session.
    pub fn start(&mut self) {
        if self.lifecycle != Lifecycle::Idle {
            return;
        }
        self.typed.clear();
        self.attempts = Attempts::default();
        self.samples = WpmSeries::new();
        self.timer.reset();
        self.timer_handle = Some(self.scheduler.schedule(self.round));
        self.lifecycle = Lifecycle::Running;
        tracing::debug!(round = %self.round, mode = %self.timer.mode, "session started");
    }

    /// Classify a raw key event and apply it.
    pub fn apply_key(&mut self, input: &KeyInput, keymap: &KeyMap) -> Option<SessionResult> {
        self.apply_action(classify(input, keymap))
    }

    pub fn apply_action(&mut self, action: KeyAction) -> Option<SessionResult> {
        match action {
            KeyAction::Char(c) => self.type_char(c),
            KeyAction::Backspace => {
                self.backspace();
                None
            }
            KeyAction::Submit | KeyAction::Repeat | KeyAction::Ignore => None,
        }
    }

    /// Append one already-mapped unit. The first one starts an idle session.
    pub fn type_char(&mut self, c: char) -> Option<SessionResult> {
        match self.lifecycle {
            Lifecycle::Finished => return None,
            Lifecycle::Idle => self.start(),
            Lifecycle::Running => {}
        }

        // only reachable with an empty target
        if self.typed.len() >= self.target.len() {
            return Some(self.finish());
        }

        let expected = self.target[self.typed.len()];
        self.attempts.record(c == expected);
        self.typed.push(c);

        if self.typed.len() == self.target.len() {
            return Some(self.finish());
        }
        None
    }

    /// Remove the last typed unit. Returns whether anything was removed.
    pub fn backspace(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Running {
            return false;
        }
        self.typed.pop().is_some()
    }

    /// Under-target input: the entry buffer is replaced wholesale. Units past
    /// the common prefix with the previous buffer count as attempts.
    pub fn replace_buffer(&mut self, text: &str) -> Option<SessionResult> {
        match self.lifecycle {
            Lifecycle::Finished => return None,
            Lifecycle::Idle => self.start(),
            Lifecycle::Running => {}
        }

        let buffer: Vec<char> = text.chars().take(self.target.len()).collect();
        let common = self
            .typed
            .iter()
            .zip(&buffer)
            .take_while(|(old, new)| old == new)
            .count();

        for (c, expected) in buffer[common..].iter().zip(&self.target[common..]) {
            self.attempts.record(c == expected);
        }
        self.typed = buffer;

        if self.typed.len() == self.target.len() {
            return Some(self.finish());
        }
        None
    }

    /// One second of session clock. Ticks for another round, or arriving
    /// while not running, are ignored.
    pub fn on_tick(&mut self, round: RoundId) -> Option<SessionResult> {
        if round != self.round {
            tracing::debug!(stale = %round, current = %self.round, "ignoring stale tick");
            return None;
        }
        if self.lifecycle != Lifecycle::Running {
            return None;
        }

        if self.timer.advance() {
            return Some(self.finish());
        }

        let sample = WpmSample::new(self.timer.metric_seconds(), self.wpm());
        self.samples.push(sample);
        None
    }

    fn finish(&mut self) -> SessionResult {
        if let Some(handle) = self.timer_handle.take() {
            handle.cancel();
        }
        self.lifecycle = Lifecycle::Finished;

        let wpm = self.wpm();
        let accuracy = self.accuracy();
        self.samples
            .push(WpmSample::new(self.timer.metric_seconds(), wpm));

        let result = SessionResult {
            wpm,
            accuracy,
            wpm_samples: self.samples.clone(),
        };
        tracing::info!(
            round = %self.round,
            wpm,
            accuracy,
            typed = self.typed.len(),
            target = self.target.len(),
            "session finished"
        );
        self.result = Some(result.clone());
        result
    }
}
