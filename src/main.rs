use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use neis_timetable::feed::spawn_neis_feed;
use neis_timetable::state::{apply_delta, AppState, Delta, ProviderCommand, Selector};
use neis_timetable::timetable_fetch::{NeisConfig, TimetableClient};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.state.cycle_focus_next(),
            KeyCode::BackTab => self.state.cycle_focus_prev(),
            KeyCode::Char('l') | KeyCode::Right => self.state.select_next_option(),
            KeyCode::Char('h') | KeyCode::Left => self.state.select_prev_option(),
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_timetable_down(),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_timetable_up(),
            KeyCode::Enter => self.request_timetable(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn request_timetable(&mut self) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Timetable fetch unavailable");
            return;
        };
        // Bump first so a completion from any earlier request is stale.
        self.state.request_seq += 1;
        let cmd = ProviderCommand::FetchTimetable {
            seq: self.state.request_seq,
            grade: self.state.selected_grade().to_string(),
            class_number: self.state.selected_class().to_string(),
            date: self.state.selected_date(),
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Timetable request failed");
        } else {
            self.state.push_log(format!(
                "[INFO] Timetable request sent (grade {}, class {}, {})",
                self.state.selected_grade(),
                self.state.selected_class(),
                self.state.selected_date().format("%Y-%m-%d")
            ));
        }
    }
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();

    let mut app = match TimetableClient::new(NeisConfig::from_env()) {
        Ok(client) => {
            spawn_neis_feed(tx, cmd_rx, client);
            App::new(Some(cmd_tx))
        }
        Err(err) => {
            let mut app = App::new(None);
            app.state
                .push_log(format!("[WARN] HTTP client unavailable: {err:#}"));
            app
        }
    };

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_selectors(frame, chunks[1], &app.state);
    render_timetable(frame, chunks[2], &app.state);
    render_console(frame, chunks[3], &app.state);

    let footer = Paragraph::new(
        "Tab Focus | h/l or ←/→ Option | Enter Fetch | j/k or ↑/↓ Scroll | ? Help | q Quit",
    );
    frame.render_widget(footer, chunks[4]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    format!(
        "NEIS TIMETABLE | grade {} | class {} | {}",
        state.selected_grade(),
        state.selected_class(),
        state.selected_date().format("%Y-%m-%d")
    )
}

fn render_selectors(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(50),
        ])
        .split(area);

    render_selector(
        frame,
        cols[0],
        "Grade",
        state.selected_grade(),
        state.focus == Selector::Grade,
    );
    render_selector(
        frame,
        cols[1],
        "Class",
        state.selected_class(),
        state.focus == Selector::Class,
    );
    let date = state.selected_date().format("%Y-%m-%d").to_string();
    render_selector(frame, cols[2], "Date", &date, state.focus == Selector::Date);
}

fn render_selector(frame: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let text_style = if focused {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(label)
        .borders(Borders::ALL)
        .border_style(border_style);
    let value = Paragraph::new(format!("◂ {value} ▸"))
        .style(text_style)
        .block(block);
    frame.render_widget(value, area);
}

fn render_timetable(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Timetable").borders(Borders::ALL);
    let body = state.timetable.join("\n");
    let list = Paragraph::new(body)
        .block(block)
        .scroll((state.timetable_scroll, 0));
    frame.render_widget(list, area);
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No activity yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "NEIS Timetable - Help",
        "",
        "  Tab / Shift-Tab   Move between selectors",
        "  h/l or ←/→        Change the focused selection",
        "  Enter             Fetch the timetable",
        "  j/k or ↑/↓        Scroll the period list",
        "  ?                 Toggle help",
        "  q                 Quit",
        "",
        "Pick a grade, class and date, then press Enter.",
        "The list keeps its last result until the next fetch.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
