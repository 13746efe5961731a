use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::keymap::{KeyMap, Modifiers};

/// A key event as delivered by an input source (physical listener or
/// virtual keyboard).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub shift: bool,
    pub alt: bool,
    pub repeat: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            shift: false,
            alt: false,
            repeat: false,
        }
    }

    pub fn shifted(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    pub fn modifiers(&self) -> Modifiers {
        Modifiers {
            shift: self.shift,
            alt: self.alt,
        }
    }

    /// Convert a terminal key event. Releases carry no typing intent and map
    /// to `None`, as do control chords.
    pub fn from_crossterm(event: &KeyEvent) -> Option<Self> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }

        // legacy terminals report an uppercase letter or a shifted symbol
        // without the SHIFT flag
        let mut shift = event.modifiers.contains(KeyModifiers::SHIFT);
        let key = match event.code {
            KeyCode::Char(c) => match physical_key(c) {
                Some(unshifted) => {
                    shift = true;
                    unshifted.to_string()
                }
                None => {
                    shift |= c.is_ascii_uppercase();
                    c.to_string()
                }
            },
            KeyCode::Backspace => BACKSPACE.to_string(),
            KeyCode::Enter => ENTER.to_string(),
            KeyCode::Tab | KeyCode::BackTab => TAB.to_string(),
            _ => return None,
        };

        Some(Self {
            key,
            shift,
            alt: event.modifiers.contains(KeyModifiers::ALT),
            repeat: event.kind == KeyEventKind::Repeat,
        })
    }
}

// US-QWERTY shifted symbols and the key that produces them. Terminals report
// the symbol, the layout table is keyed by the physical key.
const SHIFTED_SYMBOLS: &[(char, char)] = &[
    ('~', '`'),
    ('!', '1'),
    ('@', '2'),
    ('#', '3'),
    ('$', '4'),
    ('%', '5'),
    ('^', '6'),
    ('&', '7'),
    ('*', '8'),
    ('(', '9'),
    (')', '0'),
    ('_', '-'),
    ('+', '='),
    ('{', '['),
    ('}', ']'),
    ('|', '\\'),
    (':', ';'),
    ('"', '\''),
    ('<', ','),
    ('>', '.'),
    ('?', '/'),
];

fn physical_key(symbol: char) -> Option<char> {
    SHIFTED_SYMBOLS
        .iter()
        .find(|(shifted, _)| *shifted == symbol)
        .map(|&(_, key)| key)
}

const BACKSPACE: &str = "Backspace";
const ENTER: &str = "Enter";
const TAB: &str = "Tab";

/// What a key event means to a typing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Delete the last typed unit.
    Backspace,
    /// Append a unit (space included).
    Char(char),
    /// Enter. Never submits early; has no typing effect.
    Submit,
    /// Auto-repeat of a held printable key, discarded.
    Repeat,
    /// Modifiers, navigation, Tab and anything else.
    Ignore,
}

/// Route special keys by identity and everything else through the key map.
pub fn classify(input: &KeyInput, keymap: &KeyMap) -> KeyAction {
    match input.key.as_str() {
        BACKSPACE | "⌫" => return KeyAction::Backspace,
        ENTER | "Return" | "⏎" | "↩" => return KeyAction::Submit,
        TAB | "↹" => return KeyAction::Ignore,
        _ => {}
    }

    let is_space = matches!(input.key.as_str(), " " | "Space" | "space" | "␣");
    let is_printable = is_space || input.key.chars().count() == 1;
    if !is_printable {
        return KeyAction::Ignore;
    }
    if input.repeat {
        return KeyAction::Repeat;
    }
    if is_space {
        return KeyAction::Char(' ');
    }

    keymap
        .map_char(&input.key, input.modifiers())
        .map_or(KeyAction::Ignore, KeyAction::Char)
}
