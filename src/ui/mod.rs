//! Terminal UI module using ratatui
//!
//! Shows the state of a refresh run:
//! - Current phase and run details (database, season window)
//! - Progress through the current phase's requests
//! - Rows staged per table
//! - Activity log (scrollable history)

mod components;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;

use components::{LogPanel, ProgressPanel, StatusPanel, TablesPanel};

/// Refresh phases shown in the status panel
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Preparing,
    LoadingTeams,
    LoadingLeagues,
    LoadingPlayers,
    LoadingStats,
    Swapping,
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Preparing => write!(f, "Preparing database"),
            Phase::LoadingTeams => write!(f, "Loading teams"),
            Phase::LoadingLeagues => write!(f, "Loading league levels"),
            Phase::LoadingPlayers => write!(f, "Loading players"),
            Phase::LoadingStats => write!(f, "Loading season stats"),
            Phase::Swapping => write!(f, "Publishing tables"),
            Phase::Complete => write!(f, "Complete"),
        }
    }
}

/// Progress information for the current phase
#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
    pub label: String,
}

impl Progress {
    pub fn new(current: u64, total: u64, label: impl Into<String>) -> Self {
        Self {
            current,
            total,
            label: label.into(),
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

/// Trait for UI implementations - allows both real TUI and plain/silent modes
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn set_info(&mut self, info: impl Into<String>);
    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>);
    fn clear_progress(&mut self);
    fn log(&mut self, message: impl Into<String>);
    /// Running total of rows staged for a table
    fn table_rows(&mut self, _table: &str, _rows: u64) {}
    /// Whether the user asked to stop the run
    fn cancel_requested(&mut self) -> bool {
        false
    }
}

/// Main UI application state - full TUI implementation
pub struct UiApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    status: StatusPanel,
    progress: ProgressPanel,
    tables: TablesPanel,
    log: LogPanel,
    should_quit: bool,
}

impl UiApp {
    /// Create a new UI application and enter the alternate screen
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            status: StatusPanel::new(),
            progress: ProgressPanel::new(),
            tables: TablesPanel::new(),
            log: LogPanel::new(),
            should_quit: false,
        })
    }

    /// Check for quit signal ('q', Esc or Ctrl+C; raw mode swallows SIGINT)
    pub fn check_quit(&mut self) -> bool {
        while event::poll(Duration::from_millis(0)).unwrap_or(false) {
            if let Ok(CrosstermEvent::Key(KeyEvent { code, modifiers, .. })) = event::read() {
                let ctrl_c = code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL);
                if ctrl_c || code == KeyCode::Char('q') || code == KeyCode::Esc {
                    self.should_quit = true;
                }
            }
        }
        self.should_quit
    }

    fn draw(&mut self) -> Result<()> {
        let status = &self.status;
        let progress = &self.progress;
        let tables = &self.tables;
        let log = &self.log;

        self.terminal.draw(|frame| {
            let area = frame.area();
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(5), // Status panel
                    Constraint::Length(3), // Progress bar
                    Constraint::Min(5),    // Log + tables
                ])
                .split(area);
            let bottom = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(30), Constraint::Length(32)])
                .split(rows[2]);

            status.render(frame, rows[0]);
            progress.render(frame, rows[1]);
            log.render(frame, bottom[0]);
            tables.render(frame, bottom[1]);
        })?;

        Ok(())
    }

    /// Finish the UI and restore the terminal
    pub fn finish(mut self, summary: &str) -> Result<()> {
        self.set_phase(Phase::Complete);
        self.clear_progress();
        self.log(summary);
        self.log("Press any key to exit...");
        self.draw()?;

        loop {
            if event::poll(Duration::from_millis(100))? {
                if let CrosstermEvent::Key(_) = event::read()? {
                    break;
                }
            }
        }

        self.restore()
    }

    /// Restore terminal without waiting
    pub fn restore(mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Ui for UiApp {
    fn set_phase(&mut self, phase: Phase) {
        self.status.set_phase(phase);
        self.draw().ok();
    }

    fn set_info(&mut self, info: impl Into<String>) {
        self.status.set_info(info);
        self.draw().ok();
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        self.progress
            .set_progress(Progress::new(current, total, label));
        self.draw().ok();
    }

    fn clear_progress(&mut self) {
        self.progress.clear();
        self.draw().ok();
    }

    fn log(&mut self, message: impl Into<String>) {
        self.log.add(message);
        self.draw().ok();
    }

    fn table_rows(&mut self, table: &str, rows: u64) {
        self.tables.set(table, rows);
        self.draw().ok();
    }

    fn cancel_requested(&mut self) -> bool {
        self.check_quit()
    }
}

impl Drop for UiApp {
    fn drop(&mut self) {
        // Best effort cleanup
        terminal::disable_raw_mode().ok();
        self.terminal
            .backend_mut()
            .execute(LeaveAlternateScreen)
            .ok();
        self.terminal.show_cursor().ok();
    }
}

/// Line-oriented UI for logs and non-interactive terminals
#[derive(Default)]
pub struct PlainUi {
    last_progress: Option<String>,
}

impl PlainUi {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ui for PlainUi {
    fn set_phase(&mut self, phase: Phase) {
        println!("==> {}", phase);
    }

    fn set_info(&mut self, info: impl Into<String>) {
        println!("    {}", info.into());
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        let line = format!("    [{}/{}] {}", current, total, label.into());
        if self.last_progress.as_deref() != Some(line.as_str()) {
            println!("{}", line);
            self.last_progress = Some(line);
        }
    }

    fn clear_progress(&mut self) {
        self.last_progress = None;
    }

    fn log(&mut self, message: impl Into<String>) {
        println!("{}", message.into());
    }
}

/// Silent UI implementation for testing
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, _message: impl Into<String>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_ratio() {
        assert_eq!(Progress::new(5, 0, "x").ratio(), 0.0);
        assert_eq!(Progress::new(1, 4, "x").ratio(), 0.25);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::LoadingStats.to_string(), "Loading season stats");
        assert_eq!(Phase::Swapping.to_string(), "Publishing tables");
    }
}
