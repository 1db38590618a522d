use std::path::PathBuf;

/// A candidate input file and whether the user picked it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub selected: bool,
}

impl FileEntry {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            selected: false,
        }
    }

    /// File name for display, falling back to the full path
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Which field a progress line carried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressField {
    OutTime,
    Speed,
    /// `progress=continue`, closes one report block
    BlockEnd,
    /// `progress=end`, ffmpeg is done writing
    End,
}

/// Parser for ffmpeg `-progress` output (key=value format)
#[derive(Debug, Default, Clone)]
pub struct ProgressParser {
    pub out_time_us: u64,
    pub speed: Option<f64>,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single line, returning the field it updated (if any)
    pub fn parse_line(&mut self, line: &str) -> Option<ProgressField> {
        let (key, value) = line.split_once('=')?;
        let value = value.trim();

        match key.trim() {
            // out_time_ms is microseconds too, despite the name
            "out_time_us" | "out_time_ms" => {
                let us = value.parse::<i64>().ok()?;
                self.out_time_us = us.max(0) as u64;
                Some(ProgressField::OutTime)
            }
            "speed" => {
                // Speed is in format "1.23x", strip the 'x'
                let speed = value.trim_end_matches('x').trim().parse::<f64>().ok()?;
                if speed.is_finite() && speed > 0.0 {
                    self.speed = Some(speed);
                    Some(ProgressField::Speed)
                } else {
                    None
                }
            }
            "progress" => match value {
                "end" => Some(ProgressField::End),
                "continue" => Some(ProgressField::BlockEnd),
                _ => None,
            },
            _ => None,
        }
    }
}
