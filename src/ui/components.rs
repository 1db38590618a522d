// Reusable UI components

use crate::ui::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub struct Footer {
    content: Line<'static>,
}

impl Footer {
    fn with_controls(controls: &[(&'static str, &'static str)], hotkey: Color) -> Self {
        let mut spans = vec![Span::raw("CONTROLS: ")];

        for (i, (key, desc)) in controls.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(*key, Style::default().fg(hotkey)));
            spans.push(Span::raw(" "));
            spans.push(Span::raw(*desc));
        }

        Self {
            content: Line::from(spans),
        }
    }

    pub fn config(theme: &Theme) -> Self {
        Self::with_controls(
            &[
                ("[↑/↓]", "Navigate"),
                ("[←/→]", "Change"),
                ("[g/G]", "First/Last"),
                ("[Enter]", "Confirm"),
                ("[Esc]", "Quit"),
            ],
            theme.hotkey,
        )
    }

    pub fn files(theme: &Theme) -> Self {
        Self::with_controls(
            &[
                ("[Tab]", "Switch"),
                ("[↑/↓]", "Move"),
                ("[Space]", "Toggle"),
                ("[←/→]", "Button"),
                ("[Enter]", "Confirm"),
                ("[Esc]", "Quit"),
            ],
            theme.hotkey,
        )
    }

    pub fn encoding(theme: &Theme) -> Self {
        Self::with_controls(&[("[Ctrl+C]", "Stop ffmpeg")], theme.hotkey)
    }
}

impl Widget for Footer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.content)
            .style(Style::default().bg(Color::DarkGray))
            .render(area, buf);
    }
}

/// Bordered push button, as wide as its label plus padding
pub fn render_button(
    label: &str,
    focused: bool,
    disabled: bool,
    theme: &Theme,
    area: Rect,
    buf: &mut Buffer,
) {
    Paragraph::new(label.to_string())
        .style(theme.button(focused, disabled))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.button_border(focused, disabled)),
        )
        .render(area, buf);
}

/// Width a button needs for `label`
pub fn button_width(label: &str) -> u16 {
    label.chars().count() as u16 + 6
}
