use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Failures that end a run. Cancellation is not an error and has no variant here.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// Bad or missing input path, or nothing encodable in it
    #[error("{0}")]
    UserInput(String),

    /// ffprobe could not be run or its output could not be understood
    #[error("ffprobe failed for {path}: {reason}")]
    Probe { path: PathBuf, reason: String },

    /// Probed duration cannot be used to compute progress
    #[error("unusable media duration of {0}s")]
    InvalidDuration(f64),

    /// ffmpeg exited unsuccessfully
    #[error("FFmpeg exited with error code: {status}\n\nError: {stderr}")]
    Encoder { status: ExitStatus, stderr: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl TranscodeError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T, E = TranscodeError> = std::result::Result<T, E>;
