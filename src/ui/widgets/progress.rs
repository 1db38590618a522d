// Progress bar with a trailing percentage

use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::Widget};

pub struct ProgressBar {
    ratio: f64,
    filled: Style,
    unfilled: Style,
}

impl ProgressBar {
    pub fn new(ratio: f64, filled: Style, unfilled: Style) -> Self {
        Self {
            ratio: ratio.clamp(0.0, 1.0),
            filled,
            unfilled,
        }
    }
}

impl Widget for ProgressBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let label = format!(" {:>3.0}%", self.ratio * 100.0);
        let label_width = (label.chars().count() as u16).min(area.width);
        let bar_width = area.width - label_width;
        let filled_width = (bar_width as f64 * self.ratio).round() as u16;

        // Draw filled portion
        for x in 0..filled_width {
            buf.set_string(area.x + x, area.y, "█", self.filled);
        }

        // Draw unfilled portion
        for x in filled_width..bar_width {
            buf.set_string(area.x + x, area.y, "░", self.unfilled);
        }

        buf.set_stringn(
            area.x + bar_width,
            area.y,
            &label,
            label_width as usize,
            self.filled,
        );
    }
}
