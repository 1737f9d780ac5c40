//! Ratatui-based booking dashboard.
//!
//! Layout: a range bar (From/To), adult and child counters with sparklines,
//! a visitors-over-time line chart and a visitors-by-country bar chart.
//! Loads run on a worker thread; results come back over a channel and only
//! the newest load is applied.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{BarChart, Block, Borders, Clear, Paragraph, Sparkline, Wrap},
};
use tracing::debug;

use crate::dashboard::{DashboardView, DateRange, date_bounds, resolve_range};
use crate::data::{EmptyReason, LoadFailure, LoadOutcome, LoadSequencer, LoadTicket, Loader};
use crate::domain::DashConfig;
use crate::error::AppError;
use crate::io::ingest::ParsedBookings;

mod plotters_chart;

use plotters_chart::{VisitorsChart, visitors_series};

const ACCENT: Color = Color::Rgb(99, 102, 241);

/// Start the TUI.
pub fn run(config: DashConfig) -> Result<(), AppError> {
    let loader = Loader::new(config.source.clone(), config.splitter, config.timeout)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, loader);
    app.start_load();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

enum LoadState {
    Loading,
    Ready(ParsedBookings),
    Empty(EmptyReason),
    Failed(LoadFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeField {
    From,
    To,
}

struct App {
    config: DashConfig,
    loader: Loader,
    sequencer: LoadSequencer,
    tx: Sender<(LoadTicket, LoadOutcome)>,
    rx: Receiver<(LoadTicket, LoadOutcome)>,
    state: LoadState,
    range: Option<DateRange>,
    view: Option<DashboardView>,
    selected: RangeField,
    editing: bool,
    input: String,
    status: String,
}

impl App {
    fn new(config: DashConfig, loader: Loader) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            config,
            loader,
            sequencer: LoadSequencer::new(),
            tx,
            rx,
            state: LoadState::Loading,
            range: None,
            view: None,
            selected: RangeField::From,
            editing: false,
            input: String::new(),
            status: String::new(),
        }
    }

    fn start_load(&mut self) {
        let ticket = self.sequencer.issue();
        let loader = self.loader.clone();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let outcome = loader.load();
            // The receiver is gone only when the UI has exited.
            let _ = tx.send((ticket, outcome));
        });

        if !matches!(self.state, LoadState::Ready(_)) {
            self.state = LoadState::Loading;
        }
        self.status = format!("Loading {}...", self.loader.source());
    }

    /// Apply finished loads. Returns true when something changed.
    fn poll_loads(&mut self) -> bool {
        let mut changed = false;
        while let Ok((ticket, outcome)) = self.rx.try_recv() {
            match self.sequencer.accept(ticket, outcome) {
                Some(outcome) => {
                    self.apply_outcome(outcome);
                    changed = true;
                }
                None => debug!(?ticket, "dropping stale load result"),
            }
        }
        changed
    }

    fn apply_outcome(&mut self, outcome: LoadOutcome) {
        match outcome {
            LoadOutcome::Loaded(parsed) => {
                self.range = resolve_range(&parsed.records, self.config.from, self.config.to);
                self.status = format!(
                    "Loaded {} bookings ({} rows skipped).",
                    parsed.rows_used(),
                    parsed.rows_skipped()
                );
                self.state = LoadState::Ready(parsed);
            }
            LoadOutcome::Empty(reason) => {
                self.range = None;
                self.status = reason.to_string();
                self.state = LoadState::Empty(reason);
            }
            LoadOutcome::Failed(failure) => {
                self.range = None;
                self.status = failure.to_string();
                self.state = LoadState::Failed(failure);
            }
        }
        self.recompute();
    }

    /// Re-derive the view from the loaded records and the current range.
    fn recompute(&mut self) {
        self.view = match (&self.state, &self.range) {
            (LoadState::Ready(parsed), Some(range)) => Some(DashboardView::derive(&parsed.records, range)),
            _ => None,
        };
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.poll_loads() {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns true when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing {
            self.handle_date_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Down | KeyCode::Tab => {
                self.selected = match self.selected {
                    RangeField::From => RangeField::To,
                    RangeField::To => RangeField::From,
                };
            }
            KeyCode::Left => self.shift_selected(-1),
            KeyCode::Right => self.shift_selected(1),
            KeyCode::Enter => {
                if let Some(range) = &self.range {
                    self.input = match self.selected {
                        RangeField::From => range.from.clone(),
                        RangeField::To => range.to.clone(),
                    };
                    self.editing = true;
                    self.status = "Editing date (YYYY-MM-DD). Enter to apply, Esc to cancel.".to_string();
                }
            }
            KeyCode::Char('a') => {
                if let LoadState::Ready(parsed) = &self.state {
                    self.range = date_bounds(&parsed.records);
                    self.recompute();
                    self.status = "Range reset to all arrivals.".to_string();
                }
            }
            KeyCode::Char('r') => self.start_load(),
            _ => {}
        }

        false
    }

    fn handle_date_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = false;
                self.status = "Date edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = false;
                self.apply_date_input();
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => {
                if c.is_ascii_digit() || c == '-' {
                    self.input.push(c);
                }
            }
            _ => {}
        }
    }

    fn apply_date_input(&mut self) {
        let trimmed = self.input.trim();
        let date = match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            Ok(d) => d,
            Err(e) => {
                self.status = format!("Invalid date '{trimmed}': {e}");
                return;
            }
        };
        self.set_selected_bound(date);
    }

    fn shift_selected(&mut self, delta: i64) {
        let Some(range) = &self.range else { return };
        let current = match self.selected {
            RangeField::From => range.from_date(),
            RangeField::To => range.to_date(),
        };
        let Some(current) = current else { return };

        let shifted = if delta >= 0 {
            current.checked_add_days(Days::new(delta.unsigned_abs()))
        } else {
            current.checked_sub_days(Days::new(delta.unsigned_abs()))
        };
        if let Some(date) = shifted {
            self.set_selected_bound(date);
        }
    }

    fn set_selected_bound(&mut self, date: NaiveDate) {
        let Some(range) = &self.range else { return };
        let next = match self.selected {
            RangeField::From => range.with_from(date),
            RangeField::To => range.with_to(date),
        };
        self.status = if next.is_inverted() {
            format!("Range {next} is empty (from is after to).")
        } else {
            format!("Range: {next}")
        };
        self.range = Some(next);
        self.recompute();
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        match (&self.state, &self.view) {
            (LoadState::Ready(parsed), Some(view)) => self.draw_dashboard(frame, chunks[0], parsed, view),
            (LoadState::Loading, _) => draw_message(
                frame,
                chunks[0],
                "Loading dashboard data...",
                None,
                Color::Yellow,
            ),
            (LoadState::Failed(failure), _) => draw_message(
                frame,
                chunks[0],
                "Failed to load booking data. Please try again later.",
                Some(failure.to_string()),
                Color::Red,
            ),
            (LoadState::Empty(reason), _) => draw_message(
                frame,
                chunks[0],
                "No booking data available. Please check back later.",
                Some(reason.to_string()),
                Color::Blue,
            ),
            (LoadState::Ready(_), None) => draw_message(
                frame,
                chunks[0],
                "No booking data available. Please check back later.",
                None,
                Color::Blue,
            ),
        }

        self.draw_footer(frame, chunks[1]);
    }

    fn draw_dashboard(&self, frame: &mut ratatui::Frame<'_>, area: Rect, parsed: &ParsedBookings, view: &DashboardView) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(7),
                Constraint::Min(0),
            ])
            .split(area);

        self.draw_header(frame, rows[0], parsed, view);

        let counters = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);
        let adults: Vec<u64> = view.daily.iter().map(|d| d.adults).collect();
        let children: Vec<u64> = view.daily.iter().map(|d| d.children).collect();
        draw_counter(frame, counters[0], "Total Adult Visitors", view.total_adults, &adults);
        draw_counter(frame, counters[1], "Total Child Visitors", view.total_children, &children);

        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[2]);
        draw_time_series(frame, charts[0], view);
        draw_countries(frame, charts[1], view, self.config.top_n);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect, parsed: &ParsedBookings, view: &DashboardView) {
        let field_style = |field: RangeField| {
            if field == self.selected {
                Style::default().fg(Color::Black).bg(Color::White)
            } else {
                Style::default().fg(Color::White)
            }
        };
        let field_text = |field: RangeField, value: &str| {
            if self.editing && field == self.selected {
                format!(" {}_ ", self.input)
            } else {
                format!(" {value} ")
            }
        };

        let lines = vec![
            Line::from(vec![
                Span::styled("Hotel Bookings Dashboard", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
                Span::raw(format!(
                    " | {} | rows used={} skipped={} | bookings in range={}",
                    self.loader.source(),
                    parsed.rows_used(),
                    parsed.rows_skipped(),
                    view.record_count,
                )),
            ]),
            Line::from(vec![
                Span::styled("From", Style::default().fg(Color::Gray)),
                Span::raw(" "),
                Span::styled(field_text(RangeField::From, &view.range.from), field_style(RangeField::From)),
                Span::styled("  to  ", Style::default().fg(Color::Gray)),
                Span::styled(field_text(RangeField::To, &view.range.to), field_style(RangeField::To)),
            ]),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ ±1 day  Enter edit date  a all dates  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_message(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, detail: Option<String>, color: Color) {
    let mut lines = vec![Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))];
    if let Some(detail) = detail {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(detail, Style::default().fg(Color::Gray))));
    }

    let height = (lines.len() as u16 + 2).min(area.height);
    let rect = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: area.width,
        height,
    };
    let p = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color)));
    frame.render_widget(p, rect);
}

fn draw_counter(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, total: u64, daily: &[u64]) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let counter = Paragraph::new(Span::styled(
        total.to_string(),
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Right);
    frame.render_widget(counter, parts[0]);

    let sparkline = Sparkline::default().data(daily).style(Style::default().fg(ACCENT));
    frame.render_widget(sparkline, parts[1]);
}

fn draw_time_series(frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView) {
    let block = Block::default().title("Visitors Over Time").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    if view.by_date.is_empty() {
        frame.render_widget(
            Paragraph::new("No arrivals in range.").style(Style::default().fg(Color::Yellow)),
            inner,
        );
        return;
    }

    let totals: Vec<u64> = view.by_date.iter().map(|d| d.total_visitors).collect();
    let dates: Vec<String> = view.by_date.iter().map(|d| d.date.clone()).collect();
    let (series, x_bounds, y_bounds) = visitors_series(&totals);

    let widget = VisitorsChart {
        series: &series,
        dates: &dates,
        x_bounds,
        y_bounds,
    };
    frame.render_widget(widget, inner);
}

fn draw_countries(frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView, top_n: usize) {
    let block = Block::default().title("Visitors by Country").borders(Borders::ALL);
    let inner = block.inner(area);

    if view.by_country.is_empty() {
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new("No countries in range.").style(Style::default().fg(Color::Yellow)),
            inner,
        );
        return;
    }

    let bars: Vec<(&str, u64)> = view
        .by_country
        .iter()
        .take(top_n.max(1))
        .map(|c| (c.country.as_str(), c.total_visitors))
        .collect();
    let width = bar_width(inner.width, bars.len());

    let chart = BarChart::default()
        .block(block)
        .data(bars.as_slice())
        .bar_width(width)
        .bar_gap(1)
        .bar_style(Style::default().fg(ACCENT))
        .value_style(Style::default().fg(Color::Black).bg(ACCENT));
    frame.render_widget(chart, area);
}

/// Widest bar that still fits `n` bars (plus 1-cell gaps) in `available` columns.
fn bar_width(available: u16, n: usize) -> u16 {
    let n = n.max(1) as u16;
    let per_bar = available.saturating_sub(n - 1) / n;
    per_bar.clamp(1, 9)
}
