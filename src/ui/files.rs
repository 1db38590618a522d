// File selection screen

use crate::ui::{
    components::{Footer, button_width, render_button},
    state::{AppState, FILES_SELECT_ALL, FILES_START},
    theme::Theme,
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Widget},
};

pub struct FilesScreen;

impl FilesScreen {
    pub fn render(frame: &mut Frame, state: &AppState, theme: &Theme) {
        let area = frame.area();
        let files = &state.files;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Prompt
                Constraint::Length(3), // Buttons
                Constraint::Min(0),    // File list
                Constraint::Length(1), // Footer
            ])
            .split(area);

        Paragraph::new("Select the files you wish to encode.")
            .style(theme.label(false))
            .render(chunks[0], frame.buffer_mut());

        let select_label = if files.all_selected() {
            "Deselect All"
        } else {
            "Select All"
        };
        let start_label = "Start Encoding!";
        let none_selected = !files.any_selected();
        let on_buttons = !files.list_focused;

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(button_width("Deselect All")),
                Constraint::Length(button_width(start_label)),
                Constraint::Min(0),
            ])
            .split(chunks[1]);

        render_button(
            select_label,
            on_buttons && files.button == FILES_SELECT_ALL,
            false,
            theme,
            cols[0],
            frame.buffer_mut(),
        );
        render_button(
            start_label,
            on_buttons && files.button == FILES_START,
            none_selected,
            theme,
            cols[1],
            frame.buffer_mut(),
        );

        let items: Vec<ListItem> = files
            .entries
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, entry)| {
                let focused = files.list_focused && i == files.focus;
                let mark = if entry.selected { "x" } else { " " };
                ListItem::new(Line::from(Span::styled(
                    format!("[{mark}] {}", entry.name()),
                    theme.label(focused),
                )))
            })
            .collect();

        let mut list_state = ListState::default().with_selected(Some(files.focus));
        frame.render_stateful_widget(List::new(items), chunks[2], &mut list_state);

        Footer::files(theme).render(chunks[3], frame.buffer_mut());
    }
}
