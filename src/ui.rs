use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use numerology::{
    distinct_results, newest_first, HistoryFilter, HistoryRecord, HistoryStore, NumerologyService,
    Submission,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;

const MAX_INPUT_LEN: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Calculator,
    History,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Calculator => Page::History,
            Page::History => Page::Calculator,
        }
    }

    pub fn previous(&self) -> Self {
        // Two pages: previous is next
        self.next()
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Calculator => "Calculator",
            Page::History => "History",
        }
    }
}

/// Outcome of the last Enter on the calculator page
#[derive(Debug, Clone)]
pub enum LastOutcome {
    Calculated(Submission),
    Rejected(String),
}

pub struct App<S: HistoryStore> {
    pub service: NumerologyService<S>,
    pub input: String,
    pub current_page: Page,
    pub last_outcome: Option<LastOutcome>,
    /// Every record, newest first
    pub records: Vec<HistoryRecord>,
    pub history_error: Option<String>,
    pub filter: HistoryFilter,
    pub state: TableState,
}

impl<S: HistoryStore> App<S> {
    pub fn new(service: NumerologyService<S>) -> Self {
        let mut app = Self {
            service,
            input: String::new(),
            current_page: Page::Calculator,
            last_outcome: None,
            records: Vec::new(),
            history_error: None,
            filter: HistoryFilter::new(),
            state: TableState::default(),
        };
        app.refresh_history();
        app
    }

    pub fn push_char(&mut self, c: char) {
        if self.input.chars().count() < MAX_INPUT_LEN {
            self.input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// Compute + save the current input. The input is kept on rejection so
    /// it can be fixed.
    pub fn submit(&mut self) {
        match self.service.submit(&self.input) {
            Ok(submission) => {
                self.last_outcome = Some(LastOutcome::Calculated(submission));
                self.input.clear();
                self.refresh_history();
            }
            Err(e) => self.last_outcome = Some(LastOutcome::Rejected(e.to_string())),
        }
    }

    pub fn refresh_history(&mut self) {
        match self.service.store().list() {
            Ok(records) => {
                self.records = newest_first(records);
                self.history_error = None;
            }
            Err(e) => {
                self.records.clear();
                self.history_error = Some(e.to_string());
            }
        }
        self.reset_selection();
    }

    /// Records that pass the active filter
    pub fn visible(&self) -> Vec<&HistoryRecord> {
        self.records.iter().filter(|r| self.filter.matches(r)).collect()
    }

    /// Step the filter through the values present in history, starting
    /// from whichever value is selected now.
    pub fn cycle_filter(&mut self, forward: bool) {
        let values = distinct_results(&self.records);
        let current = self.filter.values().next();
        let target = match (current, forward) {
            (None, true) => values.first(),
            (None, false) => values.last(),
            (Some(c), true) => values.iter().find(|&&v| v > c).or(values.first()),
            (Some(c), false) => values.iter().rev().find(|&&v| v < c).or(values.last()),
        };
        let Some(&value) = target else {
            return;
        };
        self.filter = HistoryFilter::only(value);
        self.reset_selection();
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        if self.visible().is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn next(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.state.select(Some(i));
    }
}

pub fn run_ui<S: HistoryStore>(app: &mut App<S>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

fn run_app<B: ratatui::backend::Backend, S: HistoryStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Esc => return Ok(()),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
            KeyCode::Tab => app.next_page(),
            KeyCode::BackTab => app.previous_page(),
            _ => match app.current_page {
                Page::Calculator => match key.code {
                    KeyCode::Enter => app.submit(),
                    KeyCode::Backspace => app.backspace(),
                    KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.clear_input()
                    }
                    KeyCode::Char(c) => app.push_char(c),
                    _ => {}
                },
                Page::History => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Down | KeyCode::Char('j') => app.next(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous(),
                    KeyCode::Right => app.cycle_filter(true),
                    KeyCode::Left => app.cycle_filter(false),
                    KeyCode::Char('c') => app.clear_filter(),
                    KeyCode::Char('r') => app.refresh_history(),
                    _ => {}
                },
            },
        }
    }
}

fn ui<S: HistoryStore>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Calculator => render_calculator(f, chunks[1], app),
        Page::History => render_history(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header<S: HistoryStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let mut tab_spans = vec![Span::styled(
        "🔢 Numerology  ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];

    for (i, page) in [Page::Calculator, Page::History].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Saved: {}", app.records.len()),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(Line::from(tab_spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_calculator<S: HistoryStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let input = Paragraph::new(Line::from(vec![
        Span::raw(app.input.as_str()),
        Span::styled("█", Style::default().fg(Color::Yellow)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Enter a name (whitespace is ignored) "),
    );
    f.render_widget(input, chunks[0]);

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let content: Vec<Line> = match &app.last_outcome {
        None => vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Type a name and press Enter.",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )),
        ],
        Some(LastOutcome::Rejected(message)) => vec![
            Line::from(""),
            Line::from(Span::styled(format!("  ❌ {}", message), Style::default().fg(Color::Red))),
        ],
        Some(LastOutcome::Calculated(submission)) => {
            let result = &submission.result;
            let value_style = if result.is_master {
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            };

            let mut lines = vec![
                Line::from(""),
                Line::from(vec![Span::styled("  Name: ", label), Span::raw(result.name.trim())]),
                Line::from(""),
                Line::from(vec![
                    Span::styled("  Value: ", label),
                    Span::styled(result.value.to_string(), value_style),
                    Span::styled(
                        if result.is_master { "  (Master Number)" } else { "" },
                        value_style,
                    ),
                ]),
                Line::from(""),
                Line::from(vec![
                    Span::styled("  Meaning: ", label),
                    Span::raw(result.meaning().unwrap_or("")),
                ]),
                Line::from(""),
                Line::from(vec![Span::styled("  Calculation: ", label), Span::raw(result.breakdown())]),
            ];

            if !result.reductions.is_empty() {
                lines.push(Line::from(vec![
                    Span::styled("  Reduced: ", label),
                    Span::raw(result.reduction_path()),
                ]));
            }
            if let Some(previous) = &submission.previous {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!(
                        "  ℹ️  '{}' was already calculated on {}",
                        previous.name.trim(),
                        previous.timestamp.format("%Y-%m-%d %H:%M")
                    ),
                    Style::default().fg(Color::Blue),
                )));
            }
            if let Some(warning) = &submission.storage_warning {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("  ⚠️  Not saved to history: {}", warning),
                    Style::default().fg(Color::Yellow),
                )));
            }
            lines
        }
    };

    let result = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Result "),
        );
    f.render_widget(result, chunks[1]);
}

fn render_history<S: HistoryStore>(f: &mut Frame, area: Rect, app: &mut App<S>) {
    let title = if app.filter.is_active() {
        let values: Vec<String> = app.filter.values().map(|v| v.to_string()).collect();
        format!(" History (newest first) - value {} ", values.join(", "))
    } else {
        " History (newest first) ".to_string()
    };

    if let Some(error) = &app.history_error {
        let warning = Paragraph::new(Span::styled(
            format!("  ⚠️  {}", error),
            Style::default().fg(Color::Yellow),
        ))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(warning, area);
        return;
    }

    let header_cells = ["Date", "Value", "Name"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows: Vec<Row> = app
        .visible()
        .into_iter()
        .map(|record| {
            let color = if numerology::is_master_number(record.result) {
                Color::Magenta
            } else {
                Color::Green
            };
            Row::new(vec![
                Cell::from(record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
                Cell::from(record.result.to_string()).style(Style::default().fg(color)),
                Cell::from(truncate(record.name.trim(), 50)),
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [Constraint::Length(21), Constraint::Length(7), Constraint::Min(10)],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar<S: HistoryStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let key = Style::default().fg(Color::Yellow);
    let mut spans = vec![];

    match app.current_page {
        Page::Calculator => {
            spans.push(Span::styled(" Enter", key));
            spans.push(Span::raw(" Calculate | "));
            spans.push(Span::styled("Ctrl+U", key));
            spans.push(Span::raw(" Clear | "));
        }
        Page::History => {
            let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
            spans.push(Span::styled(
                format!(" Row: {}/{} ", selected, app.visible().len()),
                Style::default().fg(Color::Cyan),
            ));
            spans.push(Span::raw("| "));
            spans.push(Span::styled("←/→", key));
            spans.push(Span::raw(" Filter | "));
            spans.push(Span::styled("c", key));
            spans.push(Span::raw(" Clear filter | "));
            spans.push(Span::styled("↑/↓", key));
            spans.push(Span::raw(" Nav | "));
        }
    }

    spans.push(Span::styled("Tab", key));
    spans.push(Span::raw(" Page | "));
    spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
    spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", head)
    }
}
