pub mod charting;

use std::ops::Range;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthChar;

use typeclock::{
    session::Typed,
    stats::{FinalStats, Outcome},
    Mode, Phase,
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
/// Lines of text shown while typing: the cursor line and what follows
const VISIBLE_LINES: usize = 3;

struct Styles {
    bold: Style,
    correct: Style,
    incorrect: Style,
    extra: Style,
    pending: Style,
    italic: Style,
}

impl Styles {
    fn new() -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        Self {
            bold,
            correct: bold.fg(Color::Green),
            incorrect: bold.fg(Color::Red),
            extra: Style::default().fg(Color::Red).add_modifier(Modifier::DIM),
            pending: bold.add_modifier(Modifier::DIM),
            italic: Style::default().add_modifier(Modifier::ITALIC),
        }
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let styles = Styles::new();
        match (self.session.phase(), self.session.results()) {
            (Phase::Finished, Some(results)) => render_results(self, results, &styles, area, buf),
            _ => render_typing(self, &styles, area, buf),
        }
    }
}

fn render_typing(app: &App, styles: &Styles, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let text_width = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1) as usize;

    let shown = match session.config().mode {
        Mode::Words => session.target_words(),
        Mode::Time | Mode::Quote => session.words().len(),
    };
    let words = &session.words()[..shown];
    let typed = &session.typed()[..shown];
    let lines = wrap_words(words, typed, text_width);
    let cursor = session.cursor();
    let window = visible_window(&lines, cursor.word);
    let text_height = window.len() as u16;

    let padding = area.height.saturating_sub(text_height + 4) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(
            [
                Constraint::Length(padding),
                Constraint::Length(1), // header
                Constraint::Length(1), // time left / live wpm
                Constraint::Length(text_height),
                Constraint::Length(1), // padding
                Constraint::Min(1),    // notice + legend
            ]
            .as_ref(),
        )
        .split(area);

    let cfg = session.config();
    let header = match cfg.mode {
        Mode::Time => format!("time {}", cfg.duration_secs),
        Mode::Words => format!("words {} / {}s", cfg.word_count, cfg.duration_secs),
        Mode::Quote => format!("quote / {}s", cfg.duration_secs),
    };
    Paragraph::new(Span::styled(header, styles.italic))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let status = match session.phase() {
        Phase::Running => Line::from(vec![
            Span::styled(format!("{}", session.time_left()), styles.bold.fg(Color::Yellow)),
            Span::styled(format!("   {} wpm", session.live_wpm()), styles.pending),
        ]),
        _ => Line::from(Span::styled(
            format!("{}   start typing", session.time_left()),
            styles.pending,
        )),
    };
    Paragraph::new(status)
        .alignment(Alignment::Left)
        .render(chunks[2], buf);

    let text: Vec<Line> = lines[window]
        .iter()
        .map(|range| {
            let spans = range
                .clone()
                .flat_map(|w| {
                    let at = (w == cursor.word).then_some(cursor.char);
                    word_spans(&words[w], &typed[w], at, styles)
                })
                .collect::<Vec<Span>>();
            Line::from(spans)
        })
        .collect();
    Paragraph::new(text).render(chunks[3], buf);

    let mut footer = Vec::new();
    if let Some(notice) = &app.notice {
        footer.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        )));
    }
    footer.push(Line::from(Span::styled(
        "(tab) restart / (←/→) duration / (↑/↓) mode / (esc)ape",
        styles.italic,
    )));
    Paragraph::new(footer)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[5], buf);
}

fn render_results(app: &App, results: &FinalStats, styles: &Styles, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(
            [
                Constraint::Min(1),    // chart
                Constraint::Length(1), // headline stats
                Constraint::Length(1), // details
                Constraint::Length(1), // padding
                Constraint::Length(1), // legend
            ]
            .as_ref(),
        )
        .split(area);

    let (overall_duration, highest_wpm) =
        charting::compute_chart_params(&results.history, results.elapsed_secs);
    let (wpm_points, raw_points) = charting::series(&results.history);

    let datasets = vec![
        Dataset::default()
            .name("raw")
            .marker(ratatui::symbols::Marker::Braille)
            .style(Style::default().fg(Color::DarkGray))
            .graph_type(GraphType::Line)
            .data(&raw_points),
        Dataset::default()
            .name("wpm")
            .marker(ratatui::symbols::Marker::Braille)
            .style(Style::default().fg(Color::Magenta))
            .graph_type(GraphType::Line)
            .data(&wpm_points),
    ];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, overall_duration])
                .labels(vec![
                    Span::styled("0", styles.bold),
                    Span::styled(charting::format_label(overall_duration), styles.bold),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", styles.bold),
                    Span::styled(charting::format_label(highest_wpm), styles.bold),
                ]),
        );
    chart.render(chunks[0], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {} raw   {}% consistency",
            results.wpm, results.accuracy, results.raw_wpm, results.consistency
        ),
        styles.bold,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "characters {}/{}/{}   time {}s   {}",
            results.correct,
            results.incorrect,
            results.extra,
            charting::format_label(results.elapsed_secs),
            app.session.config().mode
        ),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "(enter/tab) restart / (←/→) duration / (↑/↓) mode / (esc)ape",
        styles.italic,
    ))
    .render(chunks[4], buf);
}

/// Letters of one word plus its trailing space, styled by outcome.
/// `cursor` marks the letter the next keystroke lands on.
fn word_spans(
    expected: &str,
    typed: &[Typed],
    cursor: Option<usize>,
    styles: &Styles,
) -> Vec<Span<'static>> {
    let expected: Vec<char> = expected.chars().collect();
    let len = expected.len().max(typed.len());
    let mut spans = Vec::with_capacity(len + 1);

    for i in 0..=len {
        let (ch, mut style) = match (typed.get(i), expected.get(i)) {
            (Some(t), _) if t.outcome == Outcome::Extra => (t.ch, styles.extra),
            (Some(t), Some(&e)) if t.outcome.is_correct() => (e, styles.correct),
            (Some(_), Some(&e)) => (e, styles.incorrect),
            (Some(t), None) => (t.ch, styles.extra),
            (None, Some(&e)) => (e, styles.pending),
            (None, None) => (' ', Style::default()),
        };
        if cursor == Some(i) {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        spans.push(Span::styled(ch.to_string(), style));
    }
    spans
}

fn word_width(expected: &str, typed: &[Typed]) -> usize {
    let expected_width: usize = expected.chars().map(|c| c.width().unwrap_or(0)).sum();
    let extra_width: usize = typed
        .iter()
        .filter(|t| t.outcome == Outcome::Extra)
        .map(|t| t.ch.width().unwrap_or(0))
        .sum();
    expected_width + extra_width + 1
}

/// Greedy wrap into lines of word indices no wider than `max_width`
fn wrap_words(words: &[String], typed: &[Vec<Typed>], max_width: usize) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut used = 0;
    for (i, word) in words.iter().enumerate() {
        let w = word_width(word, typed.get(i).map_or(&[], Vec::as_slice));
        if used > 0 && used + w > max_width {
            lines.push(start..i);
            start = i;
            used = 0;
        }
        used += w;
    }
    if start < words.len() {
        lines.push(start..words.len());
    }
    lines
}

/// Lines to draw: one line of context above the cursor once past the first line
fn visible_window(lines: &[Range<usize>], cursor_word: usize) -> Range<usize> {
    if lines.is_empty() {
        return 0..0;
    }
    let current = lines
        .iter()
        .position(|r| r.contains(&cursor_word))
        .unwrap_or(lines.len() - 1);
    let first = current.saturating_sub(1);
    let last = (first + VISIBLE_LINES).min(lines.len());
    first..last
}
