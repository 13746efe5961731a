use std::sync::{mpsc, Arc};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use sindhi_type::app::{App, AppState, Step};
use sindhi_type::config::{Mode, Settings};
use sindhi_type::corpus::SentenceCorpus;
use sindhi_type::history::{HistoryStore, ResultSink};
use sindhi_type::keymap::KeyMap;
use sindhi_type::runtime::{
    AppEvent, FixedTicker, ManualTickScheduler, Runner, TestEventSource, ThreadTickScheduler,
    TickScheduler,
};

fn key(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

// What a US-QWERTY terminal reports for the key a hint names.
fn terminal_key(hint: &str) -> AppEvent {
    let (shift, rest) = match hint.strip_prefix("shift + ") {
        Some(rest) => (true, rest),
        None => (false, hint),
    };
    let (alt, key) = match rest.strip_prefix("alt + ") {
        Some(key) => (true, key),
        None => (false, rest),
    };
    let key = if key == "space" { ' ' } else { key.chars().next().unwrap() };

    let mut modifiers = KeyModifiers::NONE;
    if shift {
        modifiers |= KeyModifiers::SHIFT;
    }
    if alt {
        modifiers |= KeyModifiers::ALT;
    }
    let code = if shift { shifted(key) } else { key };
    AppEvent::Key(KeyEvent::new(KeyCode::Char(code), modifiers))
}

fn shifted(key: char) -> char {
    const PLAIN: &str = "`1234567890-=[]\\;',./";
    const SHIFTED: &str = "~!@#$%^&*()_+{}|:\"<>?";
    match PLAIN.chars().position(|c| c == key) {
        Some(i) => SHIFTED.chars().nth(i).unwrap(),
        None => key.to_ascii_uppercase(),
    }
}

fn app_with(prompt: &str, settings: Settings, scheduler: Arc<dyn TickScheduler>) -> App {
    App::new(
        settings,
        SentenceCorpus::embedded().unwrap(),
        Some(prompt.to_string()),
        scheduler,
    )
    .unwrap()
}

// Headless flow through Runner/TestEventSource without a TTY: dismiss the
// overlay, type the sentence on QWERTY keys, land on the results screen.
#[test]
fn headless_typing_flow_completes() {
    let mut app = app_with("سنڌ", Settings::default(), Arc::new(ManualTickScheduler::new()));

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    for event in [
        key(KeyCode::Enter),
        key(KeyCode::Char('s')),
        key(KeyCode::Char('n')),
        key(KeyCode::Char('=')),
    ] {
        tx.send(event).unwrap();
    }

    let mut finished = None;
    for _ in 0..100u32 {
        if let Step::Finished(result) = app.handle_event(runner.step()).unwrap() {
            finished = Some(result);
            break;
        }
    }

    let result = finished.expect("round should have finished");
    assert_eq!(result.accuracy, 100.0);
    assert_eq!(app.state, AppState::Results);
    assert_eq!(app.round.session().typed_text(), "سنڌ");
}

#[test]
fn headless_timed_round_finishes_by_ticks() {
    let (tx, rx) = mpsc::channel();
    let scheduler = Arc::new(ThreadTickScheduler::with_interval(
        tx.clone(),
        Duration::from_millis(1),
    ));
    let settings = Settings {
        timer: 30,
        mode: Mode::Test,
        ..Settings::default()
    };
    let mut app = app_with("سنڌي ٻولي", settings, scheduler);
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(50)),
    );

    tx.send(key(KeyCode::Enter)).unwrap();
    tx.send(key(KeyCode::Char('s'))).unwrap();

    let mut finished = None;
    for _ in 0..10_000u32 {
        if let Step::Finished(result) = app.handle_event(runner.step()).unwrap() {
            finished = Some(result);
            break;
        }
    }

    let result = finished.expect("timer should have run out");
    assert_eq!(app.round.session().timer().remaining_seconds(), Some(0));
    assert_eq!(result.wpm_samples.last().map(|s| s.time_seconds), Some(30));
    // one correct unit over half a minute
    assert_eq!(result.wpm, 0.0);
}

#[test]
fn ticks_from_a_replaced_round_are_ignored() {
    let mut app = app_with("سن", Settings::default(), Arc::new(ManualTickScheduler::new()));
    app.handle_event(key(KeyCode::Enter)).unwrap();
    app.handle_event(key(KeyCode::Char('s'))).unwrap();
    app.handle_event(key(KeyCode::Char('n'))).unwrap();
    let old_round = app.round.round_id();

    app.handle_event(key(KeyCode::Char('r'))).unwrap();
    app.handle_event(key(KeyCode::Enter)).unwrap();

    for _ in 0..60 {
        assert_eq!(
            app.handle_event(AppEvent::Tick(old_round)).unwrap(),
            Step::Continue
        );
    }
    assert_eq!(app.round.session().timer().remaining_seconds(), Some(60));
    assert!(app.round.session().samples().is_empty());
}

#[test]
fn finished_rounds_feed_the_history_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = HistoryStore::with_dir(dir.path());
    let mut app = app_with("سن", Settings::default(), Arc::new(ManualTickScheduler::new()));

    app.handle_event(key(KeyCode::Enter)).unwrap();
    app.handle_event(key(KeyCode::Char('s'))).unwrap();
    let step = app.handle_event(key(KeyCode::Char('n'))).unwrap();

    let Step::Finished(result) = step else {
        panic!("expected the round to finish");
    };
    store.record(&app.settings, &result).unwrap();

    assert_eq!(store.load_previous().unwrap(), Some(result.wpm_samples.clone()));
    assert_eq!(store.read_log().unwrap().len(), 1);
}

#[test]
fn corpus_sentence_with_shifted_symbol_keys() {
    let corpus = SentenceCorpus::embedded().unwrap();
    let sentence = corpus
        .tiers()
        .flat_map(|tier| corpus.sentences(tier).iter())
        .find(|s| s.contains('۽'))
        .cloned()
        .unwrap();
    let mut app = app_with(&sentence, Settings::default(), Arc::new(ManualTickScheduler::new()));
    let map = KeyMap::sindhi();

    app.handle_event(key(KeyCode::Enter)).unwrap();
    let mut finished = None;
    for c in sentence.chars() {
        let hint = map.hint_for(c).unwrap();
        if let Step::Finished(result) = app.handle_event(terminal_key(hint)).unwrap() {
            finished = Some(result);
        }
    }

    let result = finished.expect("sentence should have been completed");
    assert_eq!(result.accuracy, 100.0);
    assert_eq!(app.round.session().typed_text(), sentence);
}

#[test]
fn held_key_reported_as_repeats_types_once() {
    let mut app = app_with("سس", Settings::default(), Arc::new(ManualTickScheduler::new()));
    app.handle_event(key(KeyCode::Enter)).unwrap();
    app.handle_event(key(KeyCode::Char('s'))).unwrap();

    for _ in 0..5 {
        let mut repeat = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE);
        repeat.kind = KeyEventKind::Repeat;
        app.handle_event(AppEvent::Key(repeat)).unwrap();
    }

    assert_eq!(app.round.session().typed_text(), "س");
    assert_eq!(app.round.session().attempts().total, 1);
    assert_eq!(app.state, AppState::Typing);
}
