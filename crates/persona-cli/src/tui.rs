use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use persona_core::{
    ChatSession, LineStyle, PendingTurn, RecommendError, RecommendationResult, RenderedLine,
    SessionState,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    io,
    time::{Duration, Instant},
};
use tokio::task::JoinHandle;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
const SCROLL_STEP: usize = 5;

type TurnHandle = JoinHandle<persona_core::Result<RecommendationResult>>;

pub struct TuiApp {
    pub session: ChatSession,
    pub input: String,
    pub should_quit: bool,
    /// Rows scrolled up from the bottom of the transcript
    pub scroll_from_bottom: usize,
    pub spinner_frame: usize,
    pending: Option<(PendingTurn, TurnHandle)>,
}

impl TuiApp {
    pub fn new(session: ChatSession) -> Self {
        Self {
            session,
            input: String::new(),
            should_quit: false,
            scroll_from_bottom: 0,
            spinner_frame: 0,
            pending: None,
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() => {
                self.input.push(c)
            }
            KeyCode::F(2) => {
                self.cancel_pending();
                self.session.toggle_locale();
                self.scroll_from_bottom = 0;
                tracing::info!(locale = %self.session.locale(), "locale switched");
            }
            KeyCode::F(3) => {
                self.session.toggle_model();
                tracing::info!(model = %self.session.model_type(), "model switched");
            }
            KeyCode::F(4) => self.session.decrease_top_k(),
            KeyCode::F(5) => self.session.increase_top_k(),
            KeyCode::PageUp => {
                self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(SCROLL_STEP)
            }
            KeyCode::PageDown => {
                self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(SCROLL_STEP)
            }
            KeyCode::End => self.scroll_from_bottom = 0,
            _ => {}
        }
    }

    fn submit(&mut self) {
        let Some(turn) = self.session.begin_turn(&self.input) else {
            return;
        };
        self.input.clear();
        self.scroll_from_bottom = 0;

        let client = self.session.client();
        let request = turn.request.clone();
        let handle = tokio::spawn(async move { client.recommend(&request).await });
        self.cancel_pending();
        self.pending = Some((turn, handle));
    }

    fn cancel_pending(&mut self) {
        if let Some((turn, handle)) = self.pending.take() {
            handle.abort();
            tracing::debug!(generation = turn.generation, "abandoned in-flight request");
        }
    }

    /// Collect a finished request, if any
    pub async fn on_tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER.len();

        let finished = self
            .pending
            .as_ref()
            .is_some_and(|(_, handle)| handle.is_finished());
        if !finished {
            return;
        }

        if let Some((turn, handle)) = self.pending.take() {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => Err(RecommendError::Request(join_error.to_string())),
            };
            self.session.finish_turn(turn, outcome);
            self.scroll_from_bottom = 0;
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.session.state() == SessionState::Busy
    }
}

pub async fn run_tui(session: ChatSession) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = TuiApp::new(session);
    let result = event_loop(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut TuiApp,
) -> anyhow::Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.on_key(key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick().await;
            last_tick = Instant::now();
        }

        if app.should_quit {
            app.cancel_pending();
            return Ok(());
        }
    }
}

fn ui(f: &mut Frame<'_>, app: &TuiApp) {
    let labels = app.session.labels();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Transcript
                Constraint::Length(3), // Input
                Constraint::Length(1), // Footer
            ]
            .as_ref(),
        )
        .split(f.size());

    // 1. Header: title and current settings
    let settings = format!(
        "{} | {}: {} | {}: {} | {}",
        labels.locale_name,
        labels.model,
        labels.model_name(app.session.model_type()),
        labels.top_k,
        app.session.top_k(),
        app.session.endpoint(),
    );
    let header = Paragraph::new(settings)
        .block(Block::default().borders(Borders::ALL).title(labels.title))
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, chunks[0]);

    // 2. Transcript
    let block = Block::default()
        .borders(Borders::ALL)
        .title(labels.sidebar_header);
    let inner = block.inner(chunks[1]);
    let rows = wrap_lines(&app.session.render(), inner.width as usize);
    let top = visible_top(rows.len(), inner.height as usize, app.scroll_from_bottom);
    let transcript = Paragraph::new(rows)
        .block(block)
        .scroll((top.min(u16::MAX as usize) as u16, 0));
    f.render_widget(transcript, chunks[1]);

    // 3. Input
    let input_title = format!("{} - {}", labels.input_caption, labels.submit);
    let input = Paragraph::new(app.input.as_str())
        .block(Block::default().borders(Borders::ALL).title(input_title))
        .style(if app.is_waiting() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        });
    f.render_widget(input, chunks[2]);
    set_input_cursor(f, chunks[2], &app.input);

    // 4. Footer
    let footer = if app.is_waiting() {
        Paragraph::new(format!("{} {}", SPINNER[app.spinner_frame], labels.pending))
            .style(Style::default().fg(Color::Yellow))
    } else {
        Paragraph::new(labels.footer).style(Style::default().fg(Color::Gray))
    };
    f.render_widget(footer, chunks[3]);
}

fn set_input_cursor(f: &mut Frame<'_>, area: Rect, input: &str) {
    let width = textwrap::core::display_width(input) as u16;
    let max_x = area.x + area.width.saturating_sub(2);
    f.set_cursor((area.x + 1 + width).min(max_x), area.y + 1);
}

fn line_style(style: LineStyle) -> Style {
    match style {
        LineStyle::Role => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        LineStyle::Heading => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        LineStyle::Caption | LineStyle::Separator => Style::default().fg(Color::DarkGray),
        LineStyle::Quote => Style::default().add_modifier(Modifier::ITALIC),
        LineStyle::Metric => Style::default().fg(Color::Green),
        LineStyle::Error => Style::default().fg(Color::Red),
        LineStyle::Body | LineStyle::Blank => Style::default(),
    }
}

/// Wrap rendered lines to `width` columns, one `Line` per screen row
fn wrap_lines(lines: &[RenderedLine], width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut rows = Vec::with_capacity(lines.len());
    for line in lines {
        let style = line_style(line.style);
        if line.style == LineStyle::Separator {
            rows.push(Line::from(Span::styled("─".repeat(width), style)));
            continue;
        }
        if line.text.is_empty() {
            rows.push(Line::default());
            continue;
        }
        for piece in textwrap::wrap(&line.text, width) {
            rows.push(Line::from(Span::styled(piece.into_owned(), style)));
        }
    }
    rows
}

/// First row to show so the bottom of the transcript stays in view
fn visible_top(total_rows: usize, height: usize, scroll_from_bottom: usize) -> usize {
    total_rows
        .saturating_sub(height)
        .saturating_sub(scroll_from_bottom)
}
