// Colors and styles shared by every screen

use ratatui::style::{Color, Modifier, Style};

/// Palette handed to each renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub muted: Color,
    pub hotkey: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::Rgb(0xEE, 0xEE, 0xEE),
            secondary: Color::Rgb(0xCE, 0x53, 0xBC),
            accent: Color::Rgb(0x1C, 0x6D, 0xD0),
            muted: Color::DarkGray,
            hotkey: Color::Yellow,
        }
    }
}

impl Theme {
    /// Option name or list row
    pub fn label(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.primary)
        }
    }

    /// One choice inside an option
    pub fn choice(&self, selected: bool) -> Style {
        if selected {
            Style::default().fg(self.secondary)
        } else {
            Style::default().fg(self.primary)
        }
    }

    pub fn button(&self, focused: bool, disabled: bool) -> Style {
        if disabled {
            Style::default().fg(self.muted)
        } else if focused {
            Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.primary)
        }
    }

    pub fn button_border(&self, focused: bool, disabled: bool) -> Style {
        if disabled {
            Style::default().fg(self.muted)
        } else if focused {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.primary)
        }
    }

    pub fn file_progress(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn total_progress(&self) -> Style {
        Style::default().fg(self.secondary)
    }
}
