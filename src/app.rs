use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::caret::CaretResolver;
use crate::config::Settings;
use crate::corpus::SentenceCorpus;
use crate::error::RoundError;
use crate::input::KeyInput;
use crate::round::Round;
use crate::runtime::{AppEvent, TickScheduler};
use crate::session::SessionResult;
use crate::time_series::WpmSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
}

/// What the host should do after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Continue,
    /// The round just finished; hand the result to the sink.
    Finished(SessionResult),
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub settings: Settings,
    pub round: Round,
    pub state: AppState,
    /// Series of the round before this one, for the results comparison.
    pub previous: Option<WpmSeries>,
    corpus: SentenceCorpus,
    prompt: Option<String>,
    scheduler: Arc<dyn TickScheduler>,
    text_width: u16,
}

impl App {
    /// A custom `prompt` replaces the corpus for every round.
    pub fn new(
        settings: Settings,
        corpus: SentenceCorpus,
        prompt: Option<String>,
        scheduler: Arc<dyn TickScheduler>,
    ) -> Result<Self, RoundError> {
        let round = build_round(&settings, &corpus, prompt.as_deref(), scheduler.clone())?;
        Ok(Self {
            settings,
            round,
            state: AppState::Typing,
            previous: None,
            corpus,
            prompt,
            scheduler,
            text_width: 0,
        })
    }

    pub fn with_previous(mut self, previous: Option<WpmSeries>) -> Self {
        self.previous = previous;
        self
    }

    /// Terminal cells available to the target text.
    pub fn set_text_width(&mut self, width: u16) {
        if width != self.text_width {
            self.text_width = width;
            self.round.invalidate_caret();
        }
    }

    pub fn text_width(&self) -> u16 {
        self.text_width
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Result<Step, RoundError> {
        match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Tick(round) => {
                let result = self.round.on_tick(round);
                Ok(self.finish_with(result))
            }
            AppEvent::Frame | AppEvent::Resize => {
                self.round.on_frame(self.text_width);
                Ok(Step::Continue)
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Result<Step, RoundError> {
        if key.kind == KeyEventKind::Release {
            return Ok(Step::Continue);
        }
        let ctrl_c =
            key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
        if key.code == KeyCode::Esc || ctrl_c {
            return Ok(Step::Quit);
        }

        match self.state {
            AppState::Typing => {
                if self.round.overlay_visible() {
                    if key.code == KeyCode::Enter {
                        self.round.dismiss_overlay();
                    }
                    return Ok(Step::Continue);
                }
                let Some(input) = KeyInput::from_crossterm(&key) else {
                    return Ok(Step::Continue);
                };
                let result = self.round.handle_key(&input);
                self.round.on_frame(self.text_width);
                Ok(self.finish_with(result))
            }
            AppState::Results => {
                match key.code {
                    KeyCode::Char('r') => self.restart(),
                    KeyCode::Char('n') => self.new_round()?,
                    _ => {}
                }
                Ok(Step::Continue)
            }
        }
    }

    fn finish_with(&mut self, result: Option<SessionResult>) -> Step {
        match result {
            Some(result) => {
                self.state = AppState::Results;
                Step::Finished(result)
            }
            None => Step::Continue,
        }
    }

    /// Retry the same sentence.
    pub fn restart(&mut self) {
        let next = self.round.restart().with_caret(terminal_caret());
        self.replace_round(next);
    }

    pub fn new_round(&mut self) -> Result<(), RoundError> {
        let next = build_round(
            &self.settings,
            &self.corpus,
            self.prompt.as_deref(),
            self.scheduler.clone(),
        )?;
        self.replace_round(next);
        Ok(())
    }

    fn replace_round(&mut self, next: Round) {
        if let Some(result) = self.round.result() {
            self.previous = Some(result.wpm_samples.clone());
        }
        // dropping the old round cancels its tick source
        self.round = next;
        self.state = AppState::Typing;
    }
}

fn build_round(
    settings: &Settings,
    corpus: &SentenceCorpus,
    prompt: Option<&str>,
    scheduler: Arc<dyn TickScheduler>,
) -> Result<Round, RoundError> {
    let round = match prompt {
        Some(prompt) => Round::with_target(settings.clone(), prompt, scheduler),
        None => Round::new(settings.clone(), corpus, scheduler)?,
    };
    Ok(round.with_caret(terminal_caret()))
}

// a terminal cell is the smallest unit, so no extra gap
fn terminal_caret() -> CaretResolver {
    CaretResolver::with_gap(0.0)
}
