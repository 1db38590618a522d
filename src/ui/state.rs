// Application state and the screen state machine

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::engine::{
    ConfigOption, FileEntry, ParsedConfiguration, ProgressSample, WorkerMessage,
    build_ffmpeg_cmd, derive_output_path, format_ffmpeg_cmd, resolve, visible,
};

/// Buttons under the option list on the configuration screen
pub const CONFIG_START: usize = 0;
pub const CONFIG_DRY_RUN: usize = 1;

/// Buttons above the file list on the file selection screen
pub const FILES_SELECT_ALL: usize = 0;
pub const FILES_START: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Configuration,
    FileSelection,
    Encoding,
    Terminal(Outcome),
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(Completion),
    /// `interrupted` is set when an ffmpeg process was running
    Cancelled { interrupted: bool },
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Encoded { done: usize, total: usize },
    DryRun { commands: Vec<String> },
}

impl Outcome {
    /// Text printed after the terminal is restored
    pub fn message(&self) -> String {
        match self {
            Outcome::Success(Completion::Encoded { done, total }) => {
                format!("✔ {done}/{total} files encoded")
            }
            Outcome::Success(Completion::DryRun { commands }) => commands.join("\n"),
            Outcome::Cancelled { interrupted: true } => {
                "✖ Encoding cancelled. Stopped ffmpeg process.\n   Make sure to clean up the created file"
                    .to_string()
            }
            Outcome::Cancelled { interrupted: false } => {
                "✖ Cancelled, no ffmpeg process was running".to_string()
            }
            Outcome::Error(message) => format!("✖ {message}"),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Success(_) => 0,
            Outcome::Cancelled { .. } => 130,
            Outcome::Error(_) => 1,
        }
    }
}

/// Everything the state machine reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    ScanFinished(Vec<FileEntry>),
    ScanFailed(String),
    Worker(WorkerMessage),
}

/// Side effects requested by a transition, carried out by the event loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    StartJob {
        input: PathBuf,
        config: ParsedConfiguration,
    },
    /// Send SIGINT to the running ffmpeg
    Interrupt,
    /// Remove the output of a job that failed mid-write
    RemovePartialOutput(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ConfigState {
    pub options: Vec<ConfigOption>,
    /// Index into the visible options; `visible.len()` is the button row
    pub focus: usize,
    pub button: usize,
}

impl ConfigState {
    pub fn visible(&self) -> Vec<&ConfigOption> {
        visible(&self.options)
    }

    pub fn buttons_focused(&self) -> bool {
        self.focus == self.visible().len()
    }

    fn focused_option_name(&self) -> Option<String> {
        self.visible().get(self.focus).map(|o| o.name.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilesState {
    /// `None` until the background scan reports
    pub entries: Option<Vec<FileEntry>>,
    pub focus: usize,
    pub list_focused: bool,
    pub button: usize,
}

impl FilesState {
    pub fn all_selected(&self) -> bool {
        self.entries
            .as_ref()
            .is_some_and(|files| files.iter().all(|f| f.selected))
    }

    pub fn any_selected(&self) -> bool {
        self.entries
            .as_ref()
            .is_some_and(|files| files.iter().any(|f| f.selected))
    }
}

#[derive(Debug, Clone, Default)]
pub struct EncodingState {
    /// Files still to encode; the last one is the current job
    pub pending: Vec<FileEntry>,
    pub total: usize,
    pub current_label: String,
    pub file_progress: f64,
    pub eta: Option<u64>,
    pub command: Option<String>,
    pub config: Option<ParsedConfiguration>,
}

impl EncodingState {
    /// Jobs finished or skipped so far
    pub fn done(&self) -> usize {
        self.total - self.pending.len()
    }

    /// Completion across all files, counting the current one fractionally
    pub fn total_progress(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        ((self.done() as f64 + self.file_progress) / self.total as f64).clamp(0.0, 1.0)
    }
}

pub struct AppState {
    pub screen: Screen,
    pub config: ConfigState,
    pub files: FilesState,
    pub encoding: EncodingState,
    pub is_directory: bool,
    pub ticks: u64,
    ffmpeg: String,
}

impl AppState {
    pub fn new(options: Vec<ConfigOption>, is_directory: bool, ffmpeg: impl Into<String>) -> Self {
        Self {
            screen: Screen::Configuration,
            config: ConfigState {
                options,
                focus: 0,
                button: CONFIG_START,
            },
            files: FilesState::default(),
            encoding: EncodingState::default(),
            is_directory,
            ticks: 0,
            ffmpeg: ffmpeg.into(),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.screen, Screen::Terminal(_))
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.screen {
            Screen::Terminal(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Whether committing the configuration leads to file selection
    pub fn selects_files(&self) -> bool {
        match &self.files.entries {
            Some(files) => files.len() > 1,
            None => self.is_directory,
        }
    }

    /// Apply one event and return the side effects it asks for
    pub fn handle(&mut self, event: AppEvent) -> Vec<Action> {
        if self.is_finished() {
            return Vec::new();
        }

        match event {
            AppEvent::Tick => {
                self.ticks = self.ticks.wrapping_add(1);
                Vec::new()
            }
            AppEvent::ScanFinished(files) => {
                info!(count = files.len(), "discovered input files");
                self.files.entries = Some(files);
                Vec::new()
            }
            AppEvent::ScanFailed(message) => {
                self.finish(Outcome::Error(message));
                Vec::new()
            }
            AppEvent::Key(key) => match self.screen {
                Screen::Configuration => self.handle_config_key(key),
                Screen::FileSelection => self.handle_files_key(key),
                Screen::Encoding => self.handle_encoding_key(key),
                Screen::Terminal(_) => Vec::new(),
            },
            AppEvent::Worker(message) => {
                if self.screen == Screen::Encoding {
                    self.handle_worker_message(message)
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        info!(?outcome, "run finished");
        self.screen = Screen::Terminal(outcome);
    }

    fn handle_config_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if is_quit(&key) {
            self.finish(Outcome::Cancelled { interrupted: false });
            return Vec::new();
        }

        let slots = self.config.visible().len() + 1;
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') if self.config.buttons_focused() => {
                if self.config.button == CONFIG_DRY_RUN {
                    return self.dry_run();
                }
                return self.commit_config();
            }
            KeyCode::Char('g') => self.config.focus = 0,
            KeyCode::Char('G') => self.config.focus = slots - 1,
            KeyCode::Up | KeyCode::BackTab | KeyCode::Char('k') => {
                self.config.focus = wrap(self.config.focus, -1, slots);
            }
            KeyCode::Down | KeyCode::Tab | KeyCode::Char('j') => {
                self.config.focus = wrap(self.config.focus, 1, slots);
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') => {
                let delta = if matches!(key.code, KeyCode::Right | KeyCode::Char('l')) {
                    1
                } else {
                    -1
                };
                match self.config.focused_option_name() {
                    Some(name) => {
                        if let Some(option) = self.config.options.iter_mut().find(|o| o.name == name)
                        {
                            option.step(delta);
                        }
                        // Hiding options can shrink the list under the focus
                        let last = self.config.visible().len();
                        self.config.focus = self.config.focus.min(last);
                    }
                    None => self.config.button = wrap(self.config.button, delta, 2),
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn commit_config(&mut self) -> Vec<Action> {
        let Some(files) = self.files.entries.clone() else {
            warn!("start pressed before file discovery finished");
            return Vec::new();
        };

        let config = resolve(&self.config.options);
        info!(?config, "configuration committed");

        if files.len() > 1 {
            self.files.focus = 0;
            self.files.list_focused = false;
            self.files.button = FILES_SELECT_ALL;
            self.screen = Screen::FileSelection;
            self.encoding.config = Some(config);
            Vec::new()
        } else {
            self.start_encoding(files, config)
        }
    }

    fn dry_run(&mut self) -> Vec<Action> {
        let Some(files) = self.files.entries.as_ref() else {
            warn!("dry run pressed before file discovery finished");
            return Vec::new();
        };

        let config = resolve(&self.config.options);
        let commands = files
            .iter()
            .map(|file| {
                let output = derive_output_path(&file.path, &config);
                format_ffmpeg_cmd(&build_ffmpeg_cmd(
                    &self.ffmpeg,
                    &file.path,
                    &output,
                    &config,
                    None,
                ))
            })
            .collect();

        self.finish(Outcome::Success(Completion::DryRun { commands }));
        Vec::new()
    }

    fn handle_files_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if is_quit(&key) {
            self.finish(Outcome::Cancelled { interrupted: false });
            return Vec::new();
        }

        let count = self.files.entries.as_ref().map_or(0, Vec::len);
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') if self.files.list_focused => {
                let focus = self.files.focus;
                if let Some(entry) = self
                    .files
                    .entries
                    .as_mut()
                    .and_then(|files| files.get_mut(focus))
                {
                    entry.selected = !entry.selected;
                }
                if !self.files.any_selected() {
                    self.files.button = FILES_SELECT_ALL;
                }
            }
            KeyCode::Enter if self.files.button == FILES_SELECT_ALL => {
                let select = !self.files.all_selected();
                if let Some(files) = self.files.entries.as_mut() {
                    files.iter_mut().for_each(|f| f.selected = select);
                }
            }
            KeyCode::Enter if self.files.any_selected() => {
                let selected: Vec<FileEntry> = self
                    .files
                    .entries
                    .iter()
                    .flatten()
                    .filter(|f| f.selected)
                    .cloned()
                    .collect();
                let config = self
                    .encoding
                    .config
                    .clone()
                    .unwrap_or_else(|| resolve(&self.config.options));
                return self.start_encoding(selected, config);
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.files.list_focused = !self.files.list_focused;
            }
            KeyCode::Char('g') if self.files.list_focused => self.files.focus = 0,
            KeyCode::Char('G') if self.files.list_focused => {
                self.files.focus = count.saturating_sub(1);
            }
            KeyCode::Up | KeyCode::Char('k') if self.files.list_focused => {
                self.files.focus = wrap(self.files.focus, -1, count);
            }
            KeyCode::Down | KeyCode::Char('j') if self.files.list_focused => {
                self.files.focus = wrap(self.files.focus, 1, count);
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l')
                if !self.files.list_focused && self.files.any_selected() =>
            {
                self.files.button = 1 - self.files.button;
            }
            _ => {}
        }
        Vec::new()
    }

    fn start_encoding(&mut self, files: Vec<FileEntry>, config: ParsedConfiguration) -> Vec<Action> {
        self.encoding = EncodingState {
            total: files.len(),
            pending: files,
            config: Some(config),
            ..EncodingState::default()
        };
        self.screen = Screen::Encoding;
        info!(total = self.encoding.total, "encoding started");
        self.next_job()
    }

    /// Start the job on top of the stack, or finish when it is empty
    fn next_job(&mut self) -> Vec<Action> {
        self.encoding.file_progress = 0.0;
        self.encoding.eta = None;
        self.encoding.command = None;

        let (Some(file), Some(config)) = (self.encoding.pending.last(), &self.encoding.config)
        else {
            let (done, total) = (self.encoding.done(), self.encoding.total);
            self.finish(Outcome::Success(Completion::Encoded { done, total }));
            return Vec::new();
        };

        self.encoding.current_label = file.name();
        vec![Action::StartJob {
            input: file.path.clone(),
            config: config.clone(),
        }]
    }

    fn handle_encoding_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if is_quit(&key) {
            // The command is only known once ffmpeg runs for the current job
            let interrupted = self.encoding.command.is_some();
            self.finish(Outcome::Cancelled { interrupted });
            return vec![Action::Interrupt];
        }
        Vec::new()
    }

    fn handle_worker_message(&mut self, message: WorkerMessage) -> Vec<Action> {
        match message {
            WorkerMessage::ProcessStarted { command, .. } => {
                self.encoding.command = Some(command);
            }
            WorkerMessage::Progress(ProgressSample::Fraction(fraction)) => {
                self.encoding.file_progress = fraction;
            }
            WorkerMessage::Progress(ProgressSample::Eta(secs)) => {
                self.encoding.eta = Some(secs);
            }
            WorkerMessage::DeletingOriginal { input } => {
                let name = FileEntry::new(input).name();
                self.encoding.current_label = format!("Deleting: {name}");
            }
            WorkerMessage::JobCompleted { .. } => {
                self.encoding.pending.pop();
                return self.next_job();
            }
            WorkerMessage::JobFailed {
                error,
                partial_output,
            } => {
                self.finish(Outcome::Error(error));
                return partial_output
                    .map(Action::RemovePartialOutput)
                    .into_iter()
                    .collect();
            }
            WorkerMessage::JobCancelled | WorkerMessage::WorkerIdle => {}
        }
        Vec::new()
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Move `index` by `delta` within `0..len`, wrapping at both ends
fn wrap(index: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index as isize + delta).rem_euclid(len as isize) as usize
}
