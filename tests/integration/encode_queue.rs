// Encode queue driving stand-in ffmpeg/ffprobe scripts

use crate::common::helpers::{
    PROBE_TEN_SECONDS, SIGINT_FFMPEG, default_config, fake_tools, process_alive,
    progress_socket, recorded_args, recording_ffmpeg, recv_until_idle,
};
use ffui::engine::{ConflictPolicy, EncodeQueue, WorkerMessage, derive_output_path};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_successful_job_keeps_original() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let input = dir.join("movie.mp4");
    fs::write(&input, b"source").unwrap();

    let config = default_config();
    let output = derive_output_path(&input, &config);
    let mut queue = EncodeQueue::new(fake_tools(dir, &recording_ffmpeg(dir), PROBE_TEN_SECONDS));
    queue.start_job(input.clone(), config).unwrap();

    let messages = recv_until_idle(&queue);
    assert!(matches!(
        messages.first(),
        Some(WorkerMessage::ProcessStarted { command, .. }) if command.contains("-progress unix://")
    ));
    assert_eq!(
        messages.last(),
        Some(&WorkerMessage::JobCompleted {
            input: input.clone(),
            skipped: false
        })
    );

    assert_eq!(fs::read_to_string(&output).unwrap(), "encoded");
    assert!(input.exists());

    let args = recorded_args(dir);
    assert_eq!(args.last().map(String::as_str), output.to_str());
    assert!(args.windows(2).any(|w| w == ["-crf", "30"]));
    assert!(args.windows(2).any(|w| w == ["-preset", "fast"]));
    assert!(args.windows(2).any(|w| w == ["-c:a", "aac"]));
}

#[test]
fn test_delete_original_after_success() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let input = dir.join("movie.mkv");
    fs::write(&input, b"source").unwrap();

    let mut config = default_config();
    config.delete_original = true;
    let output = derive_output_path(&input, &config);

    let mut queue = EncodeQueue::new(fake_tools(dir, &recording_ffmpeg(dir), PROBE_TEN_SECONDS));
    queue.start_job(input.clone(), config).unwrap();
    let messages = recv_until_idle(&queue);

    assert!(messages.contains(&WorkerMessage::DeletingOriginal {
        input: input.clone()
    }));
    assert!(!input.exists());
    assert!(output.exists());
}

#[test]
fn test_skip_policy_spawns_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let input = dir.join("movie.mp4");
    fs::write(&input, b"source").unwrap();

    let config = default_config();
    assert_eq!(config.conflict, ConflictPolicy::Skip);
    let output = derive_output_path(&input, &config);
    fs::write(&output, b"previous run").unwrap();

    let mut queue = EncodeQueue::new(fake_tools(dir, &recording_ffmpeg(dir), PROBE_TEN_SECONDS));
    queue.start_job(input.clone(), config).unwrap();

    assert_eq!(
        recv_until_idle(&queue),
        vec![WorkerMessage::JobCompleted {
            input,
            skipped: true
        }]
    );
    assert!(!dir.join("args.txt").exists());
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous run");
}

#[test]
fn test_overwrite_policy_reencodes() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let input = dir.join("movie.mp4");
    fs::write(&input, b"source").unwrap();

    let mut config = default_config();
    config.conflict = ConflictPolicy::Overwrite;
    let output = derive_output_path(&input, &config);
    fs::write(&output, b"previous run").unwrap();

    let mut queue = EncodeQueue::new(fake_tools(dir, &recording_ffmpeg(dir), PROBE_TEN_SECONDS));
    queue.start_job(input, config).unwrap();
    recv_until_idle(&queue);

    assert!(dir.join("args.txt").exists());
    assert_eq!(fs::read_to_string(&output).unwrap(), "encoded");
}

#[test]
fn test_encoder_failure_carries_stderr_and_output() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let input = dir.join("movie.mp4");
    fs::write(&input, b"source").unwrap();

    let config = default_config();
    let output = derive_output_path(&input, &config);
    let ffmpeg = "echo 'Unknown encoder libx264' >&2\nexit 1";

    let mut queue = EncodeQueue::new(fake_tools(dir, ffmpeg, PROBE_TEN_SECONDS));
    queue.start_job(input, config).unwrap();

    match recv_until_idle(&queue).last() {
        Some(WorkerMessage::JobFailed {
            error,
            partial_output,
        }) => {
            assert!(error.starts_with("FFmpeg exited with error code"));
            assert!(error.contains("Unknown encoder libx264"));
            assert_eq!(partial_output.as_ref(), Some(&output));
        }
        other => panic!("expected a failure, got {other:?}"),
    }
}

#[test]
fn test_unparsable_probe_fails_before_spawn() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let input = dir.join("movie.mp4");
    fs::write(&input, b"source").unwrap();

    let probe = r#"echo '{"format":{}}'"#;
    let mut queue = EncodeQueue::new(fake_tools(dir, &recording_ffmpeg(dir), probe));
    queue.start_job(input, default_config()).unwrap();

    assert!(matches!(
        recv_until_idle(&queue).as_slice(),
        [WorkerMessage::JobFailed {
            partial_output: None,
            ..
        }]
    ));
    assert!(!dir.join("args.txt").exists());
}

#[test]
fn test_zero_duration_is_a_probe_failure() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let input = dir.join("movie.mp4");
    fs::write(&input, b"source").unwrap();

    let probe = r#"echo '{"format":{"duration":"0.000000"}}'"#;
    let mut queue = EncodeQueue::new(fake_tools(dir, &recording_ffmpeg(dir), probe));
    queue.start_job(input, default_config()).unwrap();

    match recv_until_idle(&queue).as_slice() {
        [WorkerMessage::JobFailed { error, .. }] => assert!(error.contains("duration")),
        other => panic!("expected a failure, got {other:?}"),
    }
}

#[test]
fn test_cancel_interrupts_running_process() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let input = dir.join("movie.mp4");
    fs::write(&input, b"source").unwrap();

    let mut queue = EncodeQueue::new(fake_tools(dir, SIGINT_FFMPEG, PROBE_TEN_SECONDS));
    queue.start_job(input.clone(), default_config()).unwrap();

    let started = queue
        .receiver()
        .recv_timeout(Duration::from_secs(10))
        .unwrap();
    assert!(matches!(started, WorkerMessage::ProcessStarted { .. }));

    assert!(queue.cancel());
    assert_eq!(recv_until_idle(&queue), vec![WorkerMessage::JobCancelled]);
    assert!(input.exists());
    assert!(queue.drain_until_idle(Duration::from_secs(5)));
}

#[test]
fn test_dropping_busy_queue_stops_ffmpeg_and_removes_socket() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let input = dir.join("movie.mp4");
    fs::write(&input, b"source").unwrap();

    let mut queue = EncodeQueue::new(fake_tools(dir, SIGINT_FFMPEG, PROBE_TEN_SECONDS));
    queue.start_job(input, default_config()).unwrap();

    let (pid, command) = match queue
        .receiver()
        .recv_timeout(Duration::from_secs(10))
        .unwrap()
    {
        WorkerMessage::ProcessStarted { pid, command } => (pid, command),
        other => panic!("expected ffmpeg to start, got {other:?}"),
    };
    let socket = progress_socket(&command);
    assert!(socket.exists());
    assert!(process_alive(pid));

    drop(queue);

    assert!(!process_alive(pid));
    assert!(!socket.exists());
}
