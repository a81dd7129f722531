//! Panels of the refresh screen

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph};
use ratatui::Frame;
use std::time::Instant;

use super::{Phase, Progress};

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Blue))
}

/// Current phase, run details and elapsed time
pub struct StatusPanel {
    phase: Phase,
    info: String,
    started: Instant,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self {
            phase: Phase::Preparing,
            info: String::new(),
            started: Instant::now(),
        }
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    fn indicator(&self) -> (&'static str, Color) {
        match self.phase {
            Phase::Preparing => ("◐", Color::Yellow),
            Phase::LoadingTeams | Phase::LoadingLeagues => ("⚑", Color::Cyan),
            Phase::LoadingPlayers => ("☺", Color::Cyan),
            Phase::LoadingStats => ("↓", Color::Cyan),
            Phase::Swapping => ("⇄", Color::Magenta),
            Phase::Complete => ("✓", Color::Green),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let (symbol, color) = self.indicator();
        let phase_style = Style::default().fg(color).add_modifier(Modifier::BOLD);
        let elapsed = self.started.elapsed().as_secs();

        let lines = vec![
            Line::from(vec![
                Span::styled(format!(" {} ", symbol), phase_style),
                Span::styled(self.phase.to_string(), phase_style),
                Span::styled(
                    format!("   {:02}:{:02}", elapsed / 60, elapsed % 60),
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("   {}", self.info),
                Style::default().fg(Color::Gray),
            )),
        ];

        frame.render_widget(
            Paragraph::new(lines).block(panel(" MLB Stats to SQLite ")),
            area,
        );
    }
}

/// Gauge over the requests of the current phase
pub struct ProgressPanel {
    progress: Option<Progress>,
}

impl ProgressPanel {
    pub fn new() -> Self {
        Self { progress: None }
    }

    pub fn set_progress(&mut self, progress: Progress) {
        self.progress = Some(progress);
    }

    pub fn clear(&mut self) {
        self.progress = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::Blue));

        let Some(progress) = &self.progress else {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        };

        let label = match progress.total {
            0 => progress.label.clone(),
            total => format!("{} ({}/{})", progress.label, progress.current, total),
        };
        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .ratio(progress.ratio().min(1.0))
            .label(label);

        frame.render_widget(gauge, area);
    }
}

/// Rows staged so far, one line per table
pub struct TablesPanel {
    counts: Vec<(String, u64)>,
}

impl TablesPanel {
    pub fn new() -> Self {
        Self { counts: Vec::new() }
    }

    pub fn set(&mut self, table: &str, rows: u64) {
        match self.counts.iter_mut().find(|(name, _)| name == table) {
            Some(entry) => entry.1 = rows,
            None => self.counts.push((table.to_string(), rows)),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .counts
            .iter()
            .map(|(name, rows)| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!(" {:<16}", name), Style::default().fg(Color::Gray)),
                    Span::styled(format!("{:>10}", rows), Style::default().fg(Color::White)),
                ]))
            })
            .collect();

        frame.render_widget(List::new(items).block(panel(" Rows ")), area);
    }
}

/// Activity history; the newest entry is highlighted
pub struct LogPanel {
    entries: Vec<String>,
    max_entries: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            max_entries: 200,
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.entries.push(message.into());
        if self.entries.len() > self.max_entries {
            let overflow = self.entries.len() - self.max_entries;
            self.entries.drain(..overflow);
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let visible_height = area.height.saturating_sub(2) as usize;
        let start = self.entries.len().saturating_sub(visible_height);
        let newest = self.entries.len().saturating_sub(1);

        let items: Vec<ListItem> = self.entries[start..]
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let color = if start + i == newest {
                    Color::White
                } else {
                    Color::DarkGray
                };
                ListItem::new(Span::styled(format!(" {}", entry), Style::default().fg(color)))
            })
            .collect();

        frame.render_widget(List::new(items).block(panel(" Activity ")), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_panel_updates_in_place() {
        let mut panel = TablesPanel::new();
        panel.set("d_player", 10);
        panel.set("f_hitting", 3);
        panel.set("d_player", 25);
        assert_eq!(
            panel.counts,
            vec![("d_player".to_string(), 25), ("f_hitting".to_string(), 3)]
        );
    }

    #[test]
    fn test_log_panel_caps_entries() {
        let mut log = LogPanel::new();
        for i in 0..250 {
            log.add(format!("line {}", i));
        }
        assert_eq!(log.entries.len(), 200);
        assert_eq!(log.entries[0], "line 50");
    }
}
