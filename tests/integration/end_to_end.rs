// Screen state machine wired to a real encode queue, without a terminal

use crate::common::helpers::{
    PROBE_TEN_SECONDS, SIGINT_FFMPEG, default_config, fake_tools, recording_ffmpeg,
    write_script,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ffui::config::DefaultsConfig;
use ffui::engine::{
    EncodeQueue, EncoderCapabilities, FileEntry, default_options, derive_output_path,
};
use ffui::ui::{Action, AppEvent, AppState, Completion, Outcome, Screen};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

fn key(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn new_state(ffmpeg: &str, is_directory: bool) -> AppState {
    let options = default_options(
        &DefaultsConfig::default(),
        &EncoderCapabilities::all_supported(),
    );
    AppState::new(options, is_directory, ffmpeg)
}

fn write_inputs(dir: &Path, names: &[&str]) -> Vec<FileEntry> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            fs::write(&path, b"source").unwrap();
            FileEntry::new(path)
        })
        .collect()
}

/// Carry out actions and feed worker messages back until the run ends
fn drive(state: &mut AppState, queue: &mut EncodeQueue, mut actions: Vec<Action>) {
    loop {
        for action in actions.drain(..) {
            match action {
                Action::StartJob { input, config } => queue.start_job(input, config).unwrap(),
                Action::Interrupt => {
                    queue.cancel();
                }
                Action::RemovePartialOutput(path) => {
                    let _ = fs::remove_file(path);
                }
            }
        }
        if state.is_finished() {
            return;
        }
        let message = queue
            .receiver()
            .recv_timeout(Duration::from_secs(20))
            .expect("encode job should report back");
        actions = state.handle(AppEvent::Worker(message));
    }
}

/// Jump to the button row and press the start button
fn press_start(state: &mut AppState) -> Vec<Action> {
    state.handle(key(KeyCode::Char('G')));
    state.handle(key(KeyCode::Enter))
}

#[test]
fn test_single_file_encodes_with_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let tools = fake_tools(dir, &recording_ffmpeg(dir), PROBE_TEN_SECONDS);
    let files = write_inputs(dir, &["movie.mp4"]);
    let input = files[0].path.clone();

    let mut state = new_state(&tools.ffmpeg, false);
    let mut queue = EncodeQueue::new(tools);
    state.handle(AppEvent::ScanFinished(files));
    assert!(!state.selects_files());

    let actions = press_start(&mut state);
    assert_eq!(state.screen, Screen::Encoding);
    assert!(matches!(actions.as_slice(), [Action::StartJob { input: i, .. }] if *i == input));

    drive(&mut state, &mut queue, actions);

    let outcome = state.outcome().unwrap();
    assert_eq!(
        outcome,
        &Outcome::Success(Completion::Encoded { done: 1, total: 1 })
    );
    assert_eq!(outcome.message(), "✔ 1/1 files encoded");
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(
        fs::read_to_string(dir.join("movie_[libx264]_[aac].mp4")).unwrap(),
        "encoded"
    );
    assert!(input.exists());
}

#[test]
fn test_directory_selection_encodes_every_selected_file() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let tools = fake_tools(dir, &recording_ffmpeg(dir), PROBE_TEN_SECONDS);
    let files = write_inputs(dir, &["ep1.mp4", "ep2.mp4", "ep10.mp4"]);
    let paths: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();

    let mut state = new_state(&tools.ffmpeg, true);
    let mut queue = EncodeQueue::new(tools);
    state.handle(AppEvent::ScanFinished(files));

    assert!(press_start(&mut state).is_empty());
    assert_eq!(state.screen, Screen::FileSelection);

    // Select all, then deselect the middle file from the list
    state.handle(key(KeyCode::Enter));
    state.handle(key(KeyCode::Tab));
    state.handle(key(KeyCode::Down));
    state.handle(key(KeyCode::Char(' ')));
    state.handle(key(KeyCode::Tab));
    state.handle(key(KeyCode::Right));
    let actions = state.handle(key(KeyCode::Enter));

    assert_eq!(state.screen, Screen::Encoding);
    assert_eq!(state.encoding.total, 2);
    // The stack is worked from the end
    assert!(matches!(
        actions.as_slice(),
        [Action::StartJob { input, .. }] if *input == paths[2]
    ));

    drive(&mut state, &mut queue, actions);

    assert_eq!(
        state.outcome(),
        Some(&Outcome::Success(Completion::Encoded { done: 2, total: 2 }))
    );
    let config = default_config();
    assert!(derive_output_path(&paths[0], &config).exists());
    assert!(!derive_output_path(&paths[1], &config).exists());
    assert!(derive_output_path(&paths[2], &config).exists());
}

#[test]
fn test_failure_stops_run_and_removes_partial_output() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let ffmpeg = "for last; do :; done\nprintf partial > \"$last\"\necho 'disk full' >&2\nexit 1";
    let tools = fake_tools(dir, ffmpeg, PROBE_TEN_SECONDS);
    let files = write_inputs(dir, &["movie.mp4"]);
    let output = derive_output_path(&files[0].path, &default_config());

    let mut state = new_state(&tools.ffmpeg, false);
    let mut queue = EncodeQueue::new(tools);
    state.handle(AppEvent::ScanFinished(files));
    let actions = press_start(&mut state);
    drive(&mut state, &mut queue, actions);

    let outcome = state.outcome().unwrap();
    assert!(matches!(outcome, Outcome::Error(msg) if msg.contains("disk full")));
    assert_eq!(outcome.exit_code(), 1);
    assert!(!output.exists());
}

#[test]
fn test_dry_run_prints_commands_without_encoding() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let ffmpeg = write_script(dir, "ffmpeg", "exit 1");
    let ffmpeg = ffmpeg.to_str().unwrap();
    let files = write_inputs(dir, &["a.mp4", "b.mp4"]);

    let mut state = new_state(ffmpeg, true);
    state.handle(AppEvent::ScanFinished(files));
    state.handle(key(KeyCode::Char('G')));
    state.handle(key(KeyCode::Right));
    assert!(state.handle(key(KeyCode::Enter)).is_empty());

    let outcome = state.outcome().unwrap();
    let message = outcome.message();
    let lines: Vec<&str> = message.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(ffmpeg));
    assert!(lines[0].contains("a_[libx264]_[aac].mp4"));
    assert!(lines[1].contains("b_[libx264]_[aac].mp4"));
    assert!(!message.contains("-progress"));
    assert_eq!(outcome.exit_code(), 0);
    assert!(!dir.join("a_[libx264]_[aac].mp4").exists());
}

#[test]
fn test_quit_while_encoding_cancels_queue() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let tools = fake_tools(dir, SIGINT_FFMPEG, PROBE_TEN_SECONDS);
    let files = write_inputs(dir, &["movie.mp4"]);

    let mut state = new_state(&tools.ffmpeg, false);
    let mut queue = EncodeQueue::new(tools);
    state.handle(AppEvent::ScanFinished(files));
    for action in press_start(&mut state) {
        if let Action::StartJob { input, config } = action {
            queue.start_job(input, config).unwrap();
        }
    }

    let started = queue
        .receiver()
        .recv_timeout(Duration::from_secs(10))
        .unwrap();
    state.handle(AppEvent::Worker(started));
    assert!(state.encoding.command.is_some());

    let actions = state.handle(key(KeyCode::Esc));
    assert_eq!(actions, vec![Action::Interrupt]);
    assert!(queue.cancel());
    assert!(queue.drain_until_idle(Duration::from_secs(10)));

    let outcome = state.outcome().unwrap();
    assert_eq!(outcome, &Outcome::Cancelled { interrupted: true });
    assert_eq!(outcome.exit_code(), 130);
}
