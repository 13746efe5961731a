use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthChar;

use crate::app::{App, AppState};
use crate::config::{InputType, Mode};
use crate::metrics::{self, format_accuracy};
use crate::round::Round;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Cells available to the target sentence in a frame of `area`.
pub fn text_width(area: Rect) -> u16 {
    area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
        }
    }
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let round = &app.round;
    let session = round.session();

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let width = text_width(area);
    let target_rows = rows_needed(&session.target_text(), width);
    let entry_rows = match app.settings.input_type {
        InputType::Under => rows_needed(round.entry(), width).max(1) + 1,
        InputType::Over => 0,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(2),           // stats
            Constraint::Length(target_rows), // target
            Constraint::Length(entry_rows),  // under-target entry
            Constraint::Length(2),           // hint
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(stats_line(round), dim_bold_style))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    // each target unit styled by what was typed at its position
    let outcomes: Vec<bool> = session.position_outcomes().map(|(_, ok)| ok).collect();
    let styled = session
        .target()
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            let style = match outcomes.get(idx) {
                Some(true) => green_bold_style,
                Some(false) => red_bold_style,
                None => dim_bold_style,
            };
            (*c, style)
        })
        .collect::<Vec<_>>();
    Paragraph::new(rtl_lines(&styled, width))
        .alignment(Alignment::Right)
        .render(chunks[2], buf);

    if app.settings.input_type == InputType::Under {
        let entry = round
            .entry()
            .chars()
            .map(|c| (c, bold_style))
            .collect::<Vec<_>>();
        let entry_area = Rect {
            y: chunks[3].y + 1,
            height: chunks[3].height.saturating_sub(1),
            ..chunks[3]
        };
        Paragraph::new(rtl_lines(&entry, width))
            .alignment(Alignment::Right)
            .render(entry_area, buf);
    }

    if round.overlay_visible() {
        Paragraph::new(Span::styled(
            "press enter to start",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[4], buf);
    } else {
        if let Some(caret) = round.caret().filter(|_| !session.is_finished()) {
            let caret_area = match app.settings.input_type {
                InputType::Over => chunks[2],
                InputType::Under => Rect {
                    y: chunks[3].y + 1,
                    ..chunks[3]
                },
            };
            draw_caret(caret_area, caret.x, caret.y, buf);
        }
        if let Some(hint) = round.hint() {
            Paragraph::new(Span::styled(format!("next key: {hint}"), italic_style))
                .alignment(Alignment::Center)
                .render(chunks[4], buf);
        }
    }

    Paragraph::new(Span::styled("(esc)ape", italic_style)).render(chunks[6], buf);
}

fn stats_line(round: &Round) -> String {
    let session = round.session();
    let timer = session.timer();
    let clock = match timer.mode() {
        Mode::Test => format!("{}s left", timer.remaining_seconds().unwrap_or_default()),
        Mode::Practice => format!("{}s", timer.elapsed_seconds()),
    };
    format!(
        "{clock}   {} wpm   {}% acc",
        session.wpm(),
        format_accuracy(session.accuracy())
    )
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let magenta_style = Style::default().fg(Color::Magenta);

    let Some(result) = app.round.result() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1), // stats
            Constraint::Length(1), // comparison
            Constraint::Length(1), // padding
            Constraint::Length(3), // samples
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let readings: Vec<f64> = result.wpm_samples.samples().iter().map(|s| s.wpm).collect();
    Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {:.2} sd   {} peak",
            result.wpm,
            result.accuracy_display(),
            metrics::std_dev(&readings).unwrap_or_default(),
            result.wpm_samples.peak()
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let comparison = match app.previous.as_ref().and_then(|series| series.last()) {
        Some(previous) => format!(
            "previous round {} wpm ({:+} wpm)",
            previous.wpm,
            result.wpm - previous.wpm
        ),
        None => String::from("first round"),
    };
    Paragraph::new(Span::styled(
        comparison,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let samples = result
        .wpm_samples
        .samples()
        .iter()
        .map(|s| format!("{}s:{}", s.time_seconds, s.wpm))
        .join("  ");
    Paragraph::new(Span::styled(samples, magenta_style))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[4], buf);

    Paragraph::new(Span::styled("(r)etry / (n)ew / (esc)ape", italic_style))
        .render(chunks[6], buf);
}

/// A base character plus the zero-width marks that follow it.
struct Cluster {
    text: String,
    style: Style,
    width: usize,
}

fn clusters(units: &[(char, Style)]) -> Vec<Cluster> {
    let mut out: Vec<Cluster> = Vec::new();
    for &(c, style) in units {
        let width = c.width().unwrap_or(0);
        match out.last_mut() {
            Some(last) if width == 0 => last.text.push(c),
            _ => out.push(Cluster {
                text: c.to_string(),
                style,
                width,
            }),
        }
    }
    out
}

/// Wrap right-to-left text into rows of `width` cells; each row is reversed
/// so the first unit sits at the right edge.
fn rtl_lines(units: &[(char, Style)], width: u16) -> Vec<Line<'static>> {
    let mut rows: Vec<Vec<Cluster>> = vec![Vec::new()];
    let mut used = 0usize;
    for cluster in clusters(units) {
        if used > 0 && used + cluster.width > width as usize {
            rows.push(Vec::new());
            used = 0;
        }
        used += cluster.width;
        if let Some(row) = rows.last_mut() {
            row.push(cluster);
        }
    }

    rows.into_iter()
        .map(|row| {
            Line::from(
                row.into_iter()
                    .rev()
                    .map(|cluster| {
                        let text = match cluster.text.as_str() {
                            " " => String::from("·"),
                            _ => cluster.text,
                        };
                        Span::styled(text, cluster.style)
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}

fn rows_needed(text: &str, width: u16) -> u16 {
    crate::caret::measure_lines(text, width).lines.len().max(1) as u16
}

fn draw_caret(area: Rect, x: f64, y: f64, buf: &mut Buffer) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let col = (x as u16).min(area.width - 1);
    let row = y as u16;
    if row >= area.height {
        return;
    }
    if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
        cell.set_style(Style::default().add_modifier(Modifier::REVERSED));
    }
}
