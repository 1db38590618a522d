// Configuration screen

use crate::ui::{
    components::{Footer, button_width, render_button},
    state::{AppState, CONFIG_DRY_RUN, CONFIG_START},
    theme::Theme,
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

const START_LABEL: &str = "Start Encoding!";
const NEXT_LABEL: &str = "Next";
const DRY_RUN_LABEL: &str = "Print FFmpeg command and exit";

pub struct ConfigScreen;

impl ConfigScreen {
    pub fn render(frame: &mut Frame, state: &AppState, theme: &Theme) {
        let area = frame.area();
        let visible = state.config.visible();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(visible.len() as u16 * 2 + 1), // Options
                Constraint::Length(3),                            // Buttons
                Constraint::Min(0),                               // Scan status
                Constraint::Length(1),                            // Footer
            ])
            .split(area);

        Self::render_options(frame, chunks[0], state, theme);
        Self::render_buttons(frame, chunks[1], state, theme);

        if state.files.entries.is_none() {
            let spinner = crate::ui::dashboard::spinner_frame(state.ticks);
            Paragraph::new(format!("{spinner} Looking for video files..."))
                .style(theme.label(false))
                .render(chunks[2], frame.buffer_mut());
        }

        Footer::config(theme).render(chunks[3], frame.buffer_mut());
    }

    fn render_options(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        let mut lines = Vec::new();

        for (i, option) in state.config.visible().iter().enumerate() {
            let mut spans = vec![
                Span::styled(option.name.clone(), theme.label(i == state.config.focus)),
                Span::raw(" { "),
            ];
            for (j, choice) in option.choices.iter().enumerate() {
                if j > 0 {
                    spans.push(Span::raw(", "));
                }
                spans.push(Span::styled(choice.clone(), theme.choice(j == option.focused)));
            }
            spans.push(Span::raw(" }"));

            lines.push(Line::default());
            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(area, frame.buffer_mut());
    }

    fn render_buttons(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        let start_label = if state.selects_files() {
            NEXT_LABEL
        } else {
            START_LABEL
        };
        let on_buttons = state.config.buttons_focused();

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(button_width(start_label)),
                Constraint::Length(button_width(DRY_RUN_LABEL)),
                Constraint::Min(0),
            ])
            .split(area);

        let buf = frame.buffer_mut();
        render_button(
            start_label,
            on_buttons && state.config.button == CONFIG_START,
            false,
            theme,
            cols[0],
            buf,
        );
        render_button(
            DRY_RUN_LABEL,
            on_buttons && state.config.button == CONFIG_DRY_RUN,
            false,
            theme,
            cols[1],
            buf,
        );
    }
}
