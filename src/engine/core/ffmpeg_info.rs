use super::error::{Result, TranscodeError};
use super::options::{SUPPORTED_AUDIO_ENCODERS, SUPPORTED_VIDEO_ENCODERS};
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

/// Encoders the local ffmpeg offers, restricted to the ones we support
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncoderCapabilities {
    pub video: Vec<String>,
    pub audio: Vec<String>,
}

impl EncoderCapabilities {
    /// Every supported encoder, used when ffmpeg can't be asked
    pub fn all_supported() -> Self {
        Self {
            video: SUPPORTED_VIDEO_ENCODERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            audio: SUPPORTED_AUDIO_ENCODERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Check if ffmpeg is available and return its version
pub fn ffmpeg_version(ffmpeg: &str) -> anyhow::Result<String> {
    tool_version(ffmpeg)
}

/// Check if ffprobe is available and return its version
pub fn ffprobe_version(ffprobe: &str) -> anyhow::Result<String> {
    tool_version(ffprobe)
}

fn tool_version(program: &str) -> anyhow::Result<String> {
    let output = Command::new(program)
        .arg("-version")
        .output()
        .with_context(|| format!("Failed to execute {program}. Is it installed and in PATH?"))?;

    if !output.status.success() {
        anyhow::bail!("{program} command failed with status: {}", output.status);
    }

    let version_output = String::from_utf8_lossy(&output.stdout);
    let first_line = version_output.lines().next().unwrap_or("Unknown version");

    Ok(first_line.to_string())
}

/// Ask ffmpeg which encoders it was built with
pub fn list_encoders(ffmpeg: &str) -> anyhow::Result<EncoderCapabilities> {
    let output = Command::new(ffmpeg)
        .arg("-hide_banner")
        .arg("-encoders")
        .output()
        .with_context(|| format!("Failed to execute {ffmpeg} -encoders"))?;

    if !output.status.success() {
        anyhow::bail!("{ffmpeg} -encoders failed with status: {}", output.status);
    }

    Ok(parse_encoders(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse the table printed by `ffmpeg -encoders`.
///
/// The listing starts after a ` ------` separator; each row is
/// `<flags> <name> <description>`.
pub fn parse_encoders(listing: &str) -> EncoderCapabilities {
    let rows = match listing.split_once(" ------\n") {
        Some((_, rows)) => rows,
        None => return EncoderCapabilities::default(),
    };

    let names: Vec<&str> = rows
        .lines()
        .filter_map(|row| row.split_whitespace().nth(1))
        .collect();

    let keep = |supported: &[&str]| -> Vec<String> {
        supported
            .iter()
            .filter(|name| names.contains(*name))
            .map(|name| name.to_string())
            .collect()
    };

    EncoderCapabilities {
        video: keep(SUPPORTED_VIDEO_ENCODERS),
        audio: keep(SUPPORTED_AUDIO_ENCODERS),
    }
}

/// Probe a video file to get its container duration in seconds
pub fn probe_duration(ffprobe: &str, path: &Path) -> Result<f64> {
    let output = Command::new(ffprobe)
        .arg("-v")
        .arg("quiet")
        .arg("-print_format")
        .arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .map_err(|e| TranscodeError::Probe {
            path: path.to_path_buf(),
            reason: format!("failed to execute {ffprobe}: {e}"),
        })?;

    if !output.status.success() {
        return Err(TranscodeError::Probe {
            path: path.to_path_buf(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    parse_ffprobe_duration(&String::from_utf8_lossy(&output.stdout)).map_err(|reason| {
        TranscodeError::Probe {
            path: path.to_path_buf(),
            reason,
        }
    })
}

/// Parse `format.duration` from ffprobe JSON output
pub fn parse_ffprobe_duration(json: &str) -> std::result::Result<f64, String> {
    let probe: FfprobeOutput =
        serde_json::from_str(json).map_err(|e| format!("Failed to parse ffprobe JSON: {e}"))?;

    let duration_str = probe
        .format
        .duration
        .ok_or_else(|| "No duration found in ffprobe output".to_string())?;

    duration_str
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("Failed to parse duration {duration_str:?}: {e}"))
}
