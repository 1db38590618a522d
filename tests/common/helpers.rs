use ffui::config::{DefaultsConfig, ToolsConfig};
use ffui::engine::{
    EncodeQueue, EncoderCapabilities, ParsedConfiguration, WorkerMessage, default_options, resolve,
};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// ffprobe stand-in reporting a 10 second container
pub const PROBE_TEN_SECONDS: &str = r#"echo '{"format":{"duration":"10.000000"}}'"#;

/// ffmpeg stand-in that records its arguments and writes the output file
pub fn recording_ffmpeg(dir: &Path) -> String {
    format!(
        "printf '%s\\n' \"$@\" > '{}'\nfor last; do :; done\nprintf encoded > \"$last\"",
        dir.join("args.txt").display()
    )
}

/// Write an executable `/bin/sh` script and return its path
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Tools pointing at fake ffmpeg/ffprobe scripts inside `dir`
pub fn fake_tools(dir: &Path, ffmpeg_body: &str, ffprobe_body: &str) -> ToolsConfig {
    let bin = dir.join("bin");
    fs::create_dir_all(&bin).unwrap();
    ToolsConfig {
        ffmpeg: write_script(&bin, "ffmpeg", ffmpeg_body)
            .to_string_lossy()
            .into_owned(),
        ffprobe: write_script(&bin, "ffprobe", ffprobe_body)
            .to_string_lossy()
            .into_owned(),
    }
}

/// Arguments the recording ffmpeg was last called with
pub fn recorded_args(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("args.txt"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Configuration resolved from the built-in defaults
pub fn default_config() -> ParsedConfiguration {
    resolve(&default_options(
        &DefaultsConfig::default(),
        &EncoderCapabilities::all_supported(),
    ))
}

/// Leading bytes of an ISO base media file, enough for content sniffing
pub fn mp4_bytes() -> Vec<u8> {
    let mut bytes = vec![0x00, 0x00, 0x00, 0x18];
    bytes.extend_from_slice(b"ftypisom");
    bytes.extend_from_slice(&[0x00, 0x00, 0x02, 0x00]);
    bytes.extend_from_slice(b"isomiso2avc1mp41");
    bytes
}

/// Stand-in ffmpeg that keeps running until it gets SIGINT
pub const SIGINT_FFMPEG: &str = "trap 'exit 255' INT\nsleep 5 >/dev/null 2>&1 &\nwait";

/// Progress socket named in a logged `-progress unix://...` command line
pub fn progress_socket(command: &str) -> PathBuf {
    command
        .split_whitespace()
        .find_map(|word| word.strip_prefix("unix://"))
        .map(PathBuf::from)
        .expect("command should carry a progress destination")
}

/// Whether `pid` still names a process (zombies excluded once reaped)
pub fn process_alive(pid: u32) -> bool {
    // SAFETY: signal 0 only checks for existence
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

/// Collect worker messages up to (not including) `WorkerIdle`
pub fn recv_until_idle(queue: &EncodeQueue) -> Vec<WorkerMessage> {
    let mut messages = Vec::new();
    loop {
        let message = queue
            .receiver()
            .recv_timeout(Duration::from_secs(20))
            .expect("encode job should report back");
        if message == WorkerMessage::WorkerIdle {
            return messages;
        }
        messages.push(message);
    }
}
