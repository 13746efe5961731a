use std::sync::Arc;

use crate::caret::{measure_lines, CaretPosition, CaretResolver};
use crate::config::{InputType, Settings};
use crate::corpus::SentenceCorpus;
use crate::error::RoundError;
use crate::input::{classify, KeyAction, KeyInput};
use crate::keymap::KeyMap;
use crate::runtime::{RoundId, TickScheduler};
use crate::session::{Session, SessionResult, Timer};

/// One attempt at one sentence: the session plus everything the host needs
/// around it. The host only ever talks to a `Round`.
#[derive(Debug)]
pub struct Round {
    settings: Settings,
    session: Session,
    caret: CaretResolver,
    overlay_visible: bool,
    entry: String,
    keymap: &'static KeyMap,
    scheduler: Arc<dyn TickScheduler>,
}

impl Round {
    /// Pick a sentence for the configured tier and set up a fresh round.
    pub fn new(
        settings: Settings,
        corpus: &SentenceCorpus,
        scheduler: Arc<dyn TickScheduler>,
    ) -> Result<Self, RoundError> {
        let target = corpus.pick_sentence(settings.text_type)?;
        Ok(Self::with_target(settings, &target, scheduler))
    }

    pub fn with_target(settings: Settings, target: &str, scheduler: Arc<dyn TickScheduler>) -> Self {
        let session = Session::new(target, Timer::from_settings(&settings), scheduler.clone());
        tracing::info!(
            round = %session.round(),
            tier = %settings.text_type,
            mode = %settings.mode,
            input = %settings.input_type,
            "round started"
        );
        Self {
            settings,
            session,
            caret: CaretResolver::new(),
            overlay_visible: true,
            entry: String::new(),
            keymap: KeyMap::sindhi(),
            scheduler,
        }
    }

    /// Same sentence, same settings, new session.
    pub fn restart(&self) -> Self {
        Self::with_target(
            self.settings.clone(),
            &self.session.target_text(),
            self.scheduler.clone(),
        )
    }

    /// Use a caret resolver with a custom gap (terminal cells use none).
    pub fn with_caret(mut self, caret: CaretResolver) -> Self {
        self.caret = caret;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn round_id(&self) -> RoundId {
        self.session.round()
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    /// Contents of the under-target entry line.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn caret(&self) -> Option<CaretPosition> {
        self.caret.position()
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.session.result()
    }

    /// The "click here to start" overlay. Dismissing it starts the session.
    pub fn dismiss_overlay(&mut self) {
        if !self.overlay_visible {
            return;
        }
        self.overlay_visible = false;
        self.session.start();
        self.caret.invalidate();
    }

    /// Route one key event into the session according to the input mode.
    /// Keys are dropped while the overlay is up.
    pub fn handle_key(&mut self, input: &KeyInput) -> Option<SessionResult> {
        if self.overlay_visible {
            tracing::debug!(key = %input.key, "key dropped behind overlay");
            return None;
        }
        if self.session.is_finished() {
            return None;
        }

        let result = match self.settings.input_type {
            InputType::Over => self.session.apply_key(input, self.keymap),
            InputType::Under => self.edit_entry(classify(input, self.keymap)),
        };
        self.caret.invalidate();
        result
    }

    fn edit_entry(&mut self, action: KeyAction) -> Option<SessionResult> {
        match action {
            KeyAction::Char(c) => self.entry.push(c),
            KeyAction::Backspace => {
                self.entry.pop()?;
            }
            KeyAction::Submit | KeyAction::Repeat | KeyAction::Ignore => return None,
        }
        let result = self.session.replace_buffer(&self.entry);
        // the session clamps to the target length
        self.entry = self.session.typed_text();
        result
    }

    pub fn on_tick(&mut self, round: RoundId) -> Option<SessionResult> {
        self.session.on_tick(round)
    }

    /// Container geometry changed (terminal resize).
    pub fn invalidate_caret(&mut self) {
        self.caret.invalidate();
    }

    /// Frame callback: re-measure the typed text and move the caret if it is
    /// stale.
    pub fn on_frame(&mut self, container_width: u16) -> Option<CaretPosition> {
        if !self.caret.is_dirty() {
            return None;
        }
        let geometry = measure_lines(&self.session.typed_text(), container_width);
        self.caret.on_frame(&geometry, self.session.typed().len())
    }

    /// Physical key for the next expected character, when hints are enabled.
    pub fn hint(&self) -> Option<&'static str> {
        if !self.settings.show_hint || self.session.is_finished() {
            return None;
        }
        self.session
            .next_expected()
            .and_then(|c| self.keymap.hint_for(c))
    }
}
