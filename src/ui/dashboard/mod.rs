// Encoding screen implementation

use crate::engine::format_eta;
use crate::ui::{components::Footer, state::AppState, theme::Theme, widgets::ProgressBar};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

const SPINNER: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

pub fn spinner_frame(ticks: u64) -> &'static str {
    SPINNER[(ticks % SPINNER.len() as u64) as usize]
}

pub struct Dashboard;

impl Dashboard {
    pub fn render(frame: &mut Frame, state: &AppState, theme: &Theme) {
        let area = frame.area();
        let encoding = &state.encoding;
        let show_total = encoding.total > 1;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Current file + ETA
                Constraint::Length(1), // Counter
                Constraint::Length(2), // File progress
                Constraint::Length(if show_total { 2 } else { 0 }), // Total progress
                Constraint::Min(0),    // Command
                Constraint::Length(1), // Footer
            ])
            .split(area);

        let eta = encoding
            .eta
            .map(format_eta)
            .unwrap_or_else(|| "-".to_string());
        Paragraph::new(vec![
            Line::default(),
            Line::from(vec![
                Span::raw("Encoding \""),
                Span::styled(encoding.current_label.clone(), theme.label(true)),
                Span::raw(format!("\"... ETA: {eta}")),
            ]),
        ])
        .render(chunks[0], frame.buffer_mut());

        Paragraph::new(Line::from(vec![
            Span::styled(spinner_frame(state.ticks), Style::default().fg(theme.secondary)),
            Span::raw(format!(
                " {}/{} files encoded",
                encoding.done(),
                encoding.total
            )),
        ]))
        .render(chunks[1], frame.buffer_mut());

        Self::render_bar(
            frame,
            chunks[2],
            "File Progress:",
            encoding.file_progress,
            theme.file_progress(),
            theme,
        );

        if show_total {
            Self::render_bar(
                frame,
                chunks[3],
                "Total Progress:",
                encoding.total_progress(),
                theme.total_progress(),
                theme,
            );
        }

        if let Some(command) = &encoding.command {
            Paragraph::new(command.clone())
                .style(Style::default().fg(theme.muted))
                .wrap(Wrap { trim: false })
                .render(chunks[4], frame.buffer_mut());
        }

        Footer::encoding(theme).render(chunks[5], frame.buffer_mut());
    }

    fn render_bar(
        frame: &mut Frame,
        area: Rect,
        title: &str,
        ratio: f64,
        filled: Style,
        theme: &Theme,
    ) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        Paragraph::new(title.to_string())
            .style(theme.label(false))
            .render(rows[0], frame.buffer_mut());
        ProgressBar::new(ratio, filled, Style::default().fg(theme.muted))
            .render(rows[1], frame.buffer_mut());
    }
}
