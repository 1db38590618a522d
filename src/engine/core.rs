mod error;
mod ffmpeg_cmd;
mod ffmpeg_info;
mod log;
mod natsort;
mod options;
mod scan;
mod types;

pub use error::{Result, TranscodeError};
pub use ffmpeg_cmd::{build_ffmpeg_cmd, derive_output_path, format_ffmpeg_cmd};
pub use ffmpeg_info::{
    EncoderCapabilities, ffmpeg_version, ffprobe_version, list_encoders, parse_encoders,
    parse_ffprobe_duration, probe_duration,
};
pub use log::init_file_logging;
pub use natsort::natural_cmp;
pub use options::{
    AUDIO_ENCODER, AudioCodec, CRF, ConfigOption, ConflictPolicy, DELETE_ORIGINAL, ON_CONFLICT,
    PRESET, ParsedConfiguration, QualityParams, SUPPORTED_AUDIO_ENCODERS,
    SUPPORTED_VIDEO_ENCODERS, VIDEO_ENCODER, VideoCodec, default_options, find, resolve, visible,
};
pub use scan::{ContentSniffer, InferSniffer, discover, is_video_file};
pub use types::{FileEntry, ProgressField, ProgressParser};
