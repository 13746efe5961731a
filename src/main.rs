use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use sindhi_type::{
    app::{App, Step},
    app_dirs::AppDirs,
    config::{FileSettingsSource, InputType, Mode, Settings, SettingsSource},
    corpus::{SentenceCorpus, Tier},
    error::ConfigError,
    history::{HistoryStore, ResultSink},
    logging,
    runtime::{
        AppEventSource, CrosstermEventSource, FixedTicker, Runner, ThreadTickScheduler, Ticker,
    },
    ui,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

const FRAME_RATE_MS: u64 = 100;

/// Sindhi typing-speed trainer for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type Sindhi sentences on a QWERTY keyboard through the MB-Sindhi layout. Rounds are timed (test mode) or open-ended (practice mode) and scored by words per minute and accuracy."
)]
pub struct Cli {
    /// seconds per round in test mode: 30, 45, 60, 90 or 120
    #[clap(short = 's', long)]
    timer: Option<u32>,

    /// sentence difficulty
    #[clap(short = 't', long, value_enum)]
    text_type: Option<Tier>,

    /// type over the sentence or into a separate line under it
    #[clap(short = 'i', long, value_enum)]
    input_type: Option<InputType>,

    /// timed test or untimed practice
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// custom sentence to type instead of the built-in ones
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// settings file (JSON); defaults to the platform config directory
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// hide the next-key hint
    #[clap(long)]
    no_hint: bool,
}

impl Cli {
    /// Settings file first, then flags on top.
    fn settings(&self) -> Result<Settings, ConfigError> {
        let source = match &self.config {
            Some(path) => FileSettingsSource::with_path(path),
            None => FileSettingsSource::new(),
        };
        let mut settings = source.load()?;

        if let Some(timer) = self.timer {
            settings.timer = timer;
        }
        if let Some(text_type) = self.text_type {
            settings.text_type = text_type;
        }
        if let Some(input_type) = self.input_type {
            settings.input_type = input_type;
        }
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if self.no_hint {
            settings.show_hint = false;
        }
        settings.validate()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Err(err) = logging::init(&AppDirs::log_path()) {
        eprintln!("logging disabled: {err}");
    }

    let settings = cli.settings()?;
    let corpus = SentenceCorpus::embedded()?;
    let mut history = HistoryStore::new();
    let previous = history.load_previous().unwrap_or_else(|err| {
        tracing::warn!("could not read previous round: {err}");
        None
    });

    let events = CrosstermEventSource::new();
    let scheduler = Arc::new(ThreadTickScheduler::new(events.sender()));
    let mut app =
        App::new(settings, corpus, cli.prompt.clone(), scheduler)?.with_previous(previous);
    let runner = Runner::new(
        events,
        FixedTicker::new(Duration::from_millis(FRAME_RATE_MS)),
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    // without event types a held key arrives as repeated presses
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    } else {
        tracing::info!("terminal reports no key repeats, held keys are typed repeatedly");
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app, &runner, &mut history);

    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome
}

fn start_tui<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
    sink: &mut dyn ResultSink,
) -> Result<(), Box<dyn Error>> {
    loop {
        let size = terminal.size()?;
        app.set_text_width(ui::text_width(Rect::new(0, 0, size.width, size.height)));
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match app.handle_event(runner.step())? {
            Step::Continue => {}
            Step::Finished(result) => {
                if let Err(err) = sink.record(&app.settings, &result) {
                    tracing::warn!("could not record round: {err}");
                }
            }
            Step::Quit => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("sindhi-type").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_default_values() {
        let cli = parse(&[]);

        assert_eq!(cli.timer, None);
        assert_eq!(cli.text_type, None);
        assert_eq!(cli.prompt, None);
        assert!(!cli.no_hint);
    }

    #[test]
    fn test_cli_value_enums() {
        let cli = parse(&["-t", "hard", "--input-type", "under", "-m", "practice"]);

        assert_eq!(cli.text_type, Some(Tier::Hard));
        assert_eq!(cli.input_type, Some(InputType::Under));
        assert_eq!(cli.mode, Some(Mode::Practice));
    }

    #[test]
    fn test_cli_custom_prompt() {
        let cli = parse(&["-p", "سنڌي ٻولي"]);
        assert_eq!(cli.prompt, Some("سنڌي ٻولي".to_string()));
    }

    #[test]
    fn test_flags_override_settings_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "timer": 90, "textType": "medium", "showHint": true }"#).unwrap();
        let config = path.to_str().unwrap();

        let settings = parse(&["-c", config, "-s", "30", "--no-hint"])
            .settings()
            .unwrap();

        assert_eq!(settings.timer, 30);
        assert_eq!(settings.text_type, Tier::Medium);
        assert!(!settings.show_hint);
        assert_eq!(settings.mode, Mode::Test);
    }

    #[test]
    fn test_timer_flag_overrides_invalid_file_timer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "timer": 50 }"#).unwrap();
        let config = path.to_str().unwrap();

        let settings = parse(&["-c", config, "-s", "30"]).settings().unwrap();
        assert_eq!(settings.timer, 30);

        let result = parse(&["-c", config]).settings();
        assert!(matches!(result, Err(ConfigError::InvalidTimer(50))));
    }

    #[test]
    fn test_missing_settings_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("none.json");

        let settings = parse(&["-c", config.to_str().unwrap()]).settings().unwrap();

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_invalid_timer_flag() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("none.json");

        let result = parse(&["-c", config.to_str().unwrap(), "-s", "50"]).settings();
        assert!(matches!(result, Err(ConfigError::InvalidTimer(50))));
    }
}
