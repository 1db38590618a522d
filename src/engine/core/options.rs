// Encoding option model and the per-codec visibility rules

use super::ffmpeg_info::EncoderCapabilities;
use crate::config::DefaultsConfig;

pub const DELETE_ORIGINAL: &str = "Delete original video(s)?";
pub const ON_CONFLICT: &str = "On name conflict?";
pub const VIDEO_ENCODER: &str = "Video Encoder";
pub const AUDIO_ENCODER: &str = "Audio Encoder";
pub const PRESET: &str = "Preset";
pub const CRF: &str = "Constant Rate Factor (CRF)";

pub const YES_NO: &[&str] = &["No", "Yes"];
pub const CONFLICT_CHOICES: &[&str] = &["Skip", "Overwrite"];

/// Video encoders we know how to drive, in display order
pub const SUPPORTED_VIDEO_ENCODERS: &[&str] =
    &["libx264", "libx265", "libvpx-vp9", "librav1e", "libsvtav1"];

/// Audio encoders we know how to drive, in display order
pub const SUPPORTED_AUDIO_ENCODERS: &[&str] = &["aac", "libopus"];

pub const PRESETS: &[&str] = &[
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
];

pub const CRF_VALUES: &[&str] = &["10", "15", "20", "25", "30", "35", "40", "45", "50"];

/// One navigable setting on the configuration screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOption {
    pub name: String,
    pub choices: Vec<String>,
    pub focused: usize,
}

impl ConfigOption {
    pub fn new<S: AsRef<str>>(name: &str, choices: &[S]) -> Self {
        Self {
            name: name.to_string(),
            choices: choices.iter().map(|c| c.as_ref().to_string()).collect(),
            focused: 0,
        }
    }

    /// Focus the given choice, or the first one when it isn't offered
    pub fn with_focus_on(self, choice: &str) -> Self {
        self.with_focus_or(choice, None)
    }

    /// Focus `choice`, else `fallback`, else the first choice
    pub fn with_focus_or(mut self, choice: &str, fallback: Option<&str>) -> Self {
        let position = |wanted: &str| self.choices.iter().position(|c| c == wanted);
        self.focused = position(choice)
            .or_else(|| fallback.and_then(position))
            .unwrap_or(0);
        self
    }

    pub fn selected(&self) -> &str {
        self.choices
            .get(self.focused)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Rotate the focused choice, wrapping at both ends
    pub fn step(&mut self, delta: isize) {
        let len = self.choices.len() as isize;
        if len == 0 {
            return;
        }
        self.focused = (self.focused as isize + delta).rem_euclid(len) as usize;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    Skip,
    Overwrite,
}

/// What rate-control knobs an encoder understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityParams {
    CrfAndPreset,
    CrfOnly,
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodec {
    Copy,
    X264,
    X265,
    Vp9,
    Rav1e,
    SvtAv1,
}

impl VideoCodec {
    pub const ALL: [VideoCodec; 6] = [
        Self::Copy,
        Self::X264,
        Self::X265,
        Self::Vp9,
        Self::Rav1e,
        Self::SvtAv1,
    ];

    pub fn ffmpeg_name(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::X264 => "libx264",
            Self::X265 => "libx265",
            Self::Vp9 => "libvpx-vp9",
            Self::Rav1e => "librav1e",
            Self::SvtAv1 => "libsvtav1",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.ffmpeg_name() == name)
    }

    pub fn quality_params(self) -> QualityParams {
        match self {
            Self::X264 | Self::X265 => QualityParams::CrfAndPreset,
            // svt-av1 presets are numeric (-2..13), the x264 names don't apply
            Self::Vp9 | Self::SvtAv1 => QualityParams::CrfOnly,
            Self::Copy | Self::Rav1e => QualityParams::Nothing,
        }
    }

    /// Option names that mean nothing for this encoder
    pub fn hidden_options(self) -> &'static [&'static str] {
        match self.quality_params() {
            QualityParams::CrfAndPreset => &[],
            QualityParams::CrfOnly => &[PRESET],
            QualityParams::Nothing => &[PRESET, CRF],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodec {
    Disabled,
    Copy,
    Aac,
    Opus,
}

impl AudioCodec {
    pub const ALL: [AudioCodec; 4] = [Self::Disabled, Self::Copy, Self::Aac, Self::Opus];

    /// Label shown in the option list and used in output file names
    pub fn label(self) -> &'static str {
        match self {
            Self::Disabled => "None",
            Self::Copy => "copy",
            Self::Aac => "aac",
            Self::Opus => "libopus",
        }
    }

    /// Value for `-c:a`, or `None` when audio is dropped with `-an`
    pub fn ffmpeg_codec(self) -> Option<&'static str> {
        match self {
            Self::Disabled => None,
            other => Some(other.label()),
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

/// Snapshot of the options taken when the user commits the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfiguration {
    pub delete_original: bool,
    pub conflict: ConflictPolicy,
    pub video: VideoCodec,
    pub audio: AudioCodec,
    pub preset: String,
    pub crf: String,
}

impl ParsedConfiguration {
    /// Suffix inserted before the extension of every output file
    pub fn codec_tag(&self) -> String {
        format!("_[{}]_[{}]", self.video.ffmpeg_name(), self.audio.label())
    }
}

/// Build the option list from static choices, discovered encoders and configured defaults
pub fn default_options(
    defaults: &DefaultsConfig,
    capabilities: &EncoderCapabilities,
) -> Vec<ConfigOption> {
    let mut video = vec!["copy".to_string()];
    video.extend(capabilities.video.iter().cloned());

    let mut audio = vec!["None".to_string(), "copy".to_string()];
    audio.extend(capabilities.audio.iter().cloned());

    let delete = if defaults.delete_original { "Yes" } else { "No" };
    let conflict = match defaults.on_conflict.as_str() {
        "overwrite" | "Overwrite" => "Overwrite",
        _ => "Skip",
    };

    vec![
        ConfigOption::new(DELETE_ORIGINAL, YES_NO).with_focus_on(delete),
        ConfigOption::new(ON_CONFLICT, CONFLICT_CHOICES).with_focus_on(conflict),
        ConfigOption::new(VIDEO_ENCODER, video.as_slice()).with_focus_on(&defaults.video_encoder),
        // Keep the audio track when the configured encoder isn't available
        ConfigOption::new(AUDIO_ENCODER, audio.as_slice())
            .with_focus_or(&defaults.audio_encoder, Some("copy")),
        ConfigOption::new(PRESET, PRESETS).with_focus_on(&defaults.preset),
        ConfigOption::new(CRF, CRF_VALUES).with_focus_on(&defaults.crf.to_string()),
    ]
}

/// Look up an option by name.
///
/// # Panics
///
/// Panics when `name` is not present: the option list is built in-process, so a
/// missing entry is a programming error rather than a runtime condition.
pub fn find<'a>(options: &'a [ConfigOption], name: &str) -> &'a ConfigOption {
    match options.iter().find(|o| o.name == name) {
        Some(option) => option,
        None => panic!("Couldn't find requested option: {name}"),
    }
}

/// Read the typed configuration out of the option list.
///
/// # Panics
///
/// Panics when a required option is missing or an encoder choice is unknown.
pub fn resolve(options: &[ConfigOption]) -> ParsedConfiguration {
    let video_name = find(options, VIDEO_ENCODER).selected();
    let audio_name = find(options, AUDIO_ENCODER).selected();

    let video = VideoCodec::from_name(video_name)
        .unwrap_or_else(|| panic!("Unsupported video encoder choice: {video_name}"));
    let audio = AudioCodec::from_label(audio_name)
        .unwrap_or_else(|| panic!("Unsupported audio encoder choice: {audio_name}"));

    ParsedConfiguration {
        delete_original: find(options, DELETE_ORIGINAL).focused != 0,
        conflict: if find(options, ON_CONFLICT).focused == 0 {
            ConflictPolicy::Skip
        } else {
            ConflictPolicy::Overwrite
        },
        video,
        audio,
        preset: find(options, PRESET).selected().to_string(),
        crf: find(options, CRF).selected().to_string(),
    }
}

/// Options relevant for the currently chosen video encoder
pub fn visible(options: &[ConfigOption]) -> Vec<&ConfigOption> {
    let hidden = resolve(options).video.hidden_options();
    options
        .iter()
        .filter(|o| !hidden.contains(&o.name.as_str()))
        .collect()
}
