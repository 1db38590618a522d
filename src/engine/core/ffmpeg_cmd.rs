use super::options::{ParsedConfiguration, QualityParams};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Output path: the input's name with the codec tag inserted before the extension
pub fn derive_output_path(input_path: &Path, config: &ParsedConfiguration) -> PathBuf {
    let tag = config.codec_tag();
    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    let filename = match input_path.extension() {
        Some(ext) => format!("{}{}.{}", stem, tag, ext.to_string_lossy()),
        None => format!("{}{}", stem, tag),
    };

    input_path.with_file_name(filename)
}

/// Build the ffmpeg invocation for one job.
///
/// `progress_url` is the `-progress` destination; dry runs pass `None` so the
/// printed command can be pasted into a shell as-is.
pub fn build_ffmpeg_cmd(
    ffmpeg: &str,
    input_path: &Path,
    output_path: &Path,
    config: &ParsedConfiguration,
    progress_url: Option<&str>,
) -> Command {
    let mut cmd = Command::new(ffmpeg);

    // Input file
    cmd.arg("-i").arg(input_path);

    // Video codec and whatever rate control it understands
    cmd.arg("-c:v").arg(config.video.ffmpeg_name());
    match config.video.quality_params() {
        QualityParams::CrfAndPreset => {
            cmd.arg("-crf").arg(&config.crf);
            cmd.arg("-preset").arg(&config.preset);
        }
        QualityParams::CrfOnly => {
            cmd.arg("-crf").arg(&config.crf);
        }
        QualityParams::Nothing => {}
    }

    // Audio: either a codec or dropped entirely
    match config.audio.ffmpeg_codec() {
        Some(codec) => {
            cmd.arg("-c:a").arg(codec);
        }
        None => {
            cmd.arg("-an");
        }
    }

    // Progress output (structured key=value to the monitor socket)
    if let Some(url) = progress_url {
        cmd.arg("-progress").arg(url).arg("-nostats");
    }

    // Output file
    cmd.arg(output_path);

    cmd
}

/// Format a command as a shell-safe string for display and logs
pub fn format_ffmpeg_cmd(cmd: &Command) -> String {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let args: Vec<String> = cmd
        .get_args()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    let words = std::iter::once(program.as_str()).chain(args.iter().map(String::as_str));
    shlex::try_join(words).unwrap_or_else(|_| {
        // Only fails on NUL bytes, which a path can't contain anyway
        std::iter::once(program.clone())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    })
}
