//! Terminal dashboard for `dasa up`
//!
//! Renders status snapshots as a live persona table. This is a pure display
//! sink over `StatusReporter::snapshot()` — worker teardown on exit is the
//! dispatcher's job, not the dashboard's.

use crate::status::{RoleState, RoleStatus, StatusReporter};
use crate::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

/// Run the dashboard until the user cancels (q, Esc, or Ctrl+C)
///
/// Blocks the calling thread; each iteration takes a fresh snapshot and
/// redraws, with `refresh` as the poll interval.
pub fn run(reporter: &StatusReporter, refresh: Duration) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_loop(&mut terminal, reporter, refresh);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    reporter: &StatusReporter,
    refresh: Duration,
) -> Result<()> {
    loop {
        let snapshot = reporter.snapshot();
        terminal.draw(|f| draw(f, &snapshot))?;

        if event::poll(refresh)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(())
                    }
                    _ => {}
                }
            }
        }
    }
}

fn draw(f: &mut Frame, snapshot: &[RoleStatus]) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(f.area());

    let active = snapshot.iter().filter(|s| s.state.is_active()).count();
    let summary = if active == 0 {
        format!("[ IDLE ] All {} personas are currently resting", snapshot.len())
    } else {
        format!("{} of {} personas active", active, snapshot.len())
    };
    let header = Paragraph::new(summary).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Dasa Orchestration Matrix "),
    );
    f.render_widget(header, chunks[0]);

    let rows: Vec<Row> = snapshot
        .iter()
        .map(|entry| {
            let (pid, uptime) = match entry.state.handle() {
                Some(handle) => (
                    handle
                        .pid
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    handle.format_runtime(),
                ),
                None => ("-".to_string(), "-".to_string()),
            };

            Row::new(vec![
                Cell::from(entry.role.id.clone()),
                Cell::from(entry.role.display_name.clone()),
                Cell::from(entry.state.label())
                    .style(Style::default().fg(state_color(&entry.state))),
                Cell::from(pid),
                Cell::from(uptime),
                Cell::from(entry.role.responsibility.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(11),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Min(20),
        ],
    )
    .header(
        Row::new(vec!["ID", "PERSONA", "STATE", "PID", "UPTIME", "RESPONSIBILITY"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title(" Personas "));
    f.render_widget(table, chunks[1]);

    let footer = Paragraph::new("q / Ctrl+C: terminate all workers and exit")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);
}

fn state_color(state: &RoleState) -> Color {
    use crate::supervisor::WorkerState;

    match state {
        RoleState::Idle => Color::DarkGray,
        RoleState::Worker(handle) => match handle.state {
            WorkerState::Pending => Color::Cyan,
            WorkerState::Running => Color::Green,
            WorkerState::Exited(0) => Color::Blue,
            WorkerState::Exited(_) => Color::Yellow,
            WorkerState::Failed(_) => Color::Red,
            WorkerState::Terminated => Color::Magenta,
        },
    }
}
