use crate::data::{abbreviate, value_width, DashboardData, DashboardSource};
use chrono::{Days, Months, NaiveDate};
use log::{debug, warn};
use std::{error::Error, io};

use ratatui::{
    backend::{Backend, CrosstermBackend},
    crossterm::{
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    },
    layout::{Constraint, Layout, Rect},
    style::{self, Color, Modifier, Style, Stylize},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, BorderType, Chart, Dataset, GraphType, Paragraph,
        Sparkline,
    },
    Frame, Terminal,
};
use style::palette::tailwind;

const PALETTES: [tailwind::Palette; 4] = [
    tailwind::BLUE,
    tailwind::EMERALD,
    tailwind::INDIGO,
    tailwind::RED,
];
const INFO_TEXT: &str =
    "(q) quit | (Tab) start/end | (←/→) ±1 day | (↑/↓) ±1 month | (r) full range | (c) colors";

struct DashColors {
    buffer_bg: Color,
    header_fg: Color,
    text_fg: Color,
    accent: Color,
    registered: Color,
    casual: Color,
    footer_border: Color,
    error_fg: Color,
}

impl DashColors {
    const fn new(color: &tailwind::Palette) -> Self {
        Self {
            buffer_bg: tailwind::SLATE.c950,
            header_fg: color.c200,
            text_fg: tailwind::SLATE.c200,
            accent: color.c400,
            registered: color.c500,
            casual: tailwind::ORANGE.c400,
            footer_border: color.c400,
            error_fg: tailwind::RED.c400,
        }
    }
}

/// Which end of the range the arrow keys move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Start,
    End,
}

pub struct App<S: DashboardSource> {
    source: S,
    bounds: (NaiveDate, NaiveDate),
    focus: Focus,
    data: DashboardData,
    status: Option<String>,
    colors: DashColors,
    color_index: usize,
}

impl<S: DashboardSource> App<S> {
    pub fn new(source: S, start: NaiveDate, end: NaiveDate) -> Result<Self, Box<dyn Error>> {
        let bounds = source.bounds();
        let data = source.snapshot(start, end)?;
        Ok(Self {
            source,
            bounds,
            focus: Focus::Start,
            data,
            status: None,
            colors: DashColors::new(&PALETTES[0]),
            color_index: 0,
        })
    }

    pub fn data(&self) -> &DashboardData {
        &self.data
    }

    pub fn range(&self) -> (NaiveDate, NaiveDate) {
        (self.data.start, self.data.end)
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Start => Focus::End,
            Focus::End => Focus::Start,
        };
    }

    fn focused(&self) -> NaiveDate {
        match self.focus {
            Focus::Start => self.data.start,
            Focus::End => self.data.end,
        }
    }

    pub fn shift_days(&mut self, days: i64) {
        let current = self.focused();
        let moved = if days >= 0 {
            current.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            current.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        self.propose(moved);
    }

    pub fn shift_months(&mut self, months: i32) {
        let current = self.focused();
        let moved = if months >= 0 {
            current.checked_add_months(Months::new(months.unsigned_abs()))
        } else {
            current.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        self.propose(moved);
    }

    pub fn reset(&mut self) {
        let (start, end) = self.bounds;
        self.apply(start, end);
    }

    fn propose(&mut self, moved: Option<NaiveDate>) {
        let Some(moved) = moved else {
            self.status = Some("date out of range".to_string());
            return;
        };
        let (start, end) = match self.focus {
            Focus::Start => (moved, self.data.end),
            Focus::End => (self.data.start, moved),
        };
        self.apply(start, end);
    }

    /// Accept a new range only when it is ordered and inside the bounds,
    /// then rebuild every chart from the source.
    fn apply(&mut self, start: NaiveDate, end: NaiveDate) {
        if start > end {
            self.status = Some(format!("start {start} cannot be after end {end}"));
            return;
        }
        let (min, max) = self.bounds;
        if start < min || end > max {
            self.status = Some(format!("range must stay within {min} .. {max}"));
            return;
        }
        match self.source.snapshot(start, end) {
            Ok(data) => {
                debug!("range changed to {} .. {}", start, end);
                self.data = data;
                self.status = None;
            }
            Err(e) => {
                warn!("snapshot for {} .. {} failed: {}", start, end, e);
                self.status = Some(e.to_string());
            }
        }
    }

    pub fn next_color(&mut self) {
        self.color_index = (self.color_index + 1) % PALETTES.len();
    }

    pub fn set_colors(&mut self) {
        self.colors = DashColors::new(&PALETTES[self.color_index]);
    }
}

pub fn run<S: DashboardSource>(
    source: S,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), Box<dyn Error>> {
    let app = App::new(source, start, end)?;

    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(res?)
}

fn run_app<B: Backend, S: DashboardSource>(
    terminal: &mut Terminal<B>,
    mut app: App<S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, &mut app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Tab => app.toggle_focus(),
                    KeyCode::Char('l') | KeyCode::Right => app.shift_days(1),
                    KeyCode::Char('h') | KeyCode::Left => app.shift_days(-1),
                    KeyCode::Char('k') | KeyCode::Up => app.shift_months(1),
                    KeyCode::Char('j') | KeyCode::Down => app.shift_months(-1),
                    KeyCode::Char('r') => app.reset(),
                    KeyCode::Char('c') => app.next_color(),
                    _ => {}
                }
            }
        }
    }
}

fn ui<S: DashboardSource>(f: &mut Frame, app: &mut App<S>) {
    let rects = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(10),
        Constraint::Length(5),
        Constraint::Min(10),
        Constraint::Length(3),
    ])
    .split(f.area());

    app.set_colors();
    f.render_widget(Block::default().bg(app.colors.buffer_bg), f.area());

    render_header(f, app, rects[0]);
    render_metrics(f, app, rects[1]);
    render_monthly(f, app, rects[2]);
    render_daily(f, app, rects[3]);

    let bottom = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rects[4]);
    render_seasons(f, app, bottom[0]);
    render_weekdays(f, app, bottom[1]);

    render_footer(f, app, rects[5]);
}

fn render_header<S: DashboardSource>(f: &mut Frame, app: &App<S>, area: Rect) {
    let focused = Style::new()
        .fg(app.colors.accent)
        .add_modifier(Modifier::REVERSED);
    let plain = Style::new().fg(app.colors.text_fg);
    let (start_style, end_style) = match app.focus {
        Focus::Start => (focused, plain),
        Focus::End => (plain, focused),
    };
    let line = Line::from(vec![
        Span::styled(
            "Bike Sharing Dashboard",
            Style::new()
                .fg(app.colors.header_fg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   range: "),
        Span::styled(app.data.start.to_string(), start_style),
        Span::raw(" .. "),
        Span::styled(app.data.end.to_string(), end_style),
    ]);
    f.render_widget(
        Paragraph::new(line)
            .block(Block::bordered().border_style(Style::new().fg(app.colors.accent))),
        area,
    );
}

fn render_metrics<S: DashboardSource>(f: &mut Frame, app: &App<S>, area: Rect) {
    let cols = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);
    let metrics = app.data.metrics;
    let tiles = [
        ("Total users", metrics.total),
        ("Casual users", metrics.casual),
        ("Registered users", metrics.registered),
    ];
    for (rect, (title, value)) in cols.iter().zip(tiles) {
        let tile = Paragraph::new(value.to_string())
            .style(Style::new().fg(app.colors.text_fg).add_modifier(Modifier::BOLD))
            .centered()
            .block(Block::bordered().title(title));
        f.render_widget(tile, *rect);
    }
}

fn render_monthly<S: DashboardSource>(f: &mut Frame, app: &App<S>, area: Rect) {
    let rects = Layout::vertical([Constraint::Min(6), Constraint::Length(1)]).split(area);
    let monthly = &app.data.monthly;

    #[allow(clippy::cast_precision_loss)]
    let points: Vec<(f64, f64)> = monthly
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.value as f64))
        .collect();
    let max = monthly.iter().map(|p| p.value).max().unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let y_top = (max as f64 * 1.1).max(1.0);
    #[allow(clippy::cast_precision_loss)]
    let x_right = (monthly.len().saturating_sub(1) as f64).max(1.0);

    let dataset = Dataset::default()
        .name("rentals")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::new().fg(app.colors.registered))
        .data(&points);
    let x_labels: Vec<Span> = monthly
        .iter()
        .map(|p| Span::raw(abbreviate(&p.label, 3)))
        .collect();
    let chart = Chart::new(vec![dataset])
        .block(Block::bordered().title("Monthly rentals"))
        .x_axis(
            Axis::default()
                .style(Style::new().fg(app.colors.text_fg))
                .bounds([0.0, x_right])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::new().fg(app.colors.text_fg))
                .bounds([0.0, y_top])
                .labels(vec![Span::raw("0"), Span::raw(max.to_string())]),
        );
    f.render_widget(chart, rects[0]);

    // point labels, one per month
    let annotations = monthly
        .iter()
        .map(|p| format!("{} {}", abbreviate(&p.label, 3), p.value))
        .collect::<Vec<_>>()
        .join(" | ");
    f.render_widget(
        Paragraph::new(annotations)
            .style(Style::new().fg(app.colors.text_fg))
            .centered(),
        rects[1],
    );
}

fn render_daily<S: DashboardSource>(f: &mut Frame, app: &App<S>, area: Rect) {
    let values: Vec<u64> = app.data.daily.iter().map(|p| p.value).collect();
    let title = format!("Daily rentals ({} days)", values.len());
    let sparkline = Sparkline::default()
        .block(Block::bordered().title(title))
        .data(&values)
        .style(Style::new().fg(app.colors.accent));
    f.render_widget(sparkline, area);
}

fn render_seasons<S: DashboardSource>(f: &mut Frame, app: &App<S>, area: Rect) {
    let seasons = &app.data.seasons;
    let width = value_width(seasons.iter().flat_map(|s| [s.registered, s.casual])).max(3);
    let title = Line::from(vec![
        Span::raw("Rentals per season: "),
        Span::styled("registered", Style::new().fg(app.colors.registered)),
        Span::raw(" / "),
        Span::styled("casual", Style::new().fg(app.colors.casual)),
    ]);

    let mut chart = BarChart::default()
        .block(Block::bordered().title(title))
        .bar_width(width)
        .bar_gap(1)
        .group_gap(3)
        .label_style(Style::new().fg(app.colors.text_fg));
    for season in seasons {
        let bars = [
            Bar::default()
                .value(season.registered)
                .text_value(season.registered.to_string())
                .style(Style::new().fg(app.colors.registered))
                .value_style(Style::new().fg(app.colors.buffer_bg).bg(app.colors.registered)),
            Bar::default()
                .value(season.casual)
                .text_value(season.casual.to_string())
                .style(Style::new().fg(app.colors.casual))
                .value_style(Style::new().fg(app.colors.buffer_bg).bg(app.colors.casual)),
        ];
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(season.season.clone()))
                .bars(&bars),
        );
    }
    f.render_widget(chart, area);
}

fn render_weekdays<S: DashboardSource>(f: &mut Frame, app: &App<S>, area: Rect) {
    let weekdays = &app.data.weekdays;
    let width = value_width(weekdays.iter().map(|p| p.value)).max(3);
    let bars: Vec<Bar> = weekdays
        .iter()
        .map(|p| {
            Bar::default()
                .value(p.value)
                .text_value(p.value.to_string())
                .label(Line::from(abbreviate(&p.label, 3)))
                .style(Style::new().fg(app.colors.registered))
                .value_style(Style::new().fg(app.colors.buffer_bg).bg(app.colors.registered))
        })
        .collect();
    let chart = BarChart::default()
        .block(Block::bordered().title("Rentals per weekday"))
        .bar_width(width)
        .bar_gap(1)
        .label_style(Style::new().fg(app.colors.text_fg))
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

fn render_footer<S: DashboardSource>(f: &mut Frame, app: &App<S>, area: Rect) {
    let line = match &app.status {
        Some(msg) => Line::from(msg.as_str()).style(Style::new().fg(app.colors.error_fg)),
        None => Line::from(INFO_TEXT).style(Style::new().fg(app.colors.text_fg)),
    };
    let info_footer = Paragraph::new(line)
        .style(Style::new().bg(app.colors.buffer_bg))
        .centered()
        .block(
            Block::bordered()
                .border_type(BorderType::Double)
                .border_style(Style::new().fg(app.colors.footer_border)),
        );
    f.render_widget(info_footer, area);
}
