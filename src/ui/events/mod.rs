// Event handling and main UI loop

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::ToolsConfig;
use crate::engine::{ConfigOption, EncodeQueue, FileEntry, InferSniffer, WorkerMessage, discover};
use crate::ui::{
    ConfigScreen, Dashboard, FilesScreen,
    state::{Action, AppEvent, AppState, Outcome, Screen},
    theme::Theme,
};

/// How long to wait for an interrupted ffmpeg to wind down before exiting
const CANCEL_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on worker messages handled per frame
const MAX_WORKER_MESSAGES: usize = 64;

// Event types sent from dedicated threads to the main loop
enum UiEvent {
    Input(Event),                   // Keyboard or other terminal events
    Tick,                           // Periodic update for the spinner
    ScanFinished(Vec<FileEntry>),   // Discovery completed
    ScanFailed(String),             // Discovery failed
}

/// Spawn a dedicated thread for event polling.
fn spawn_event_thread(tx: mpsc::Sender<UiEvent>) {
    let tick_rate = Duration::from_millis(100);

    thread::spawn(move || {
        let mut last_tick = Instant::now();
        loop {
            // Calculate timeout until next tick
            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or(Duration::from_secs(0));

            if event::poll(timeout).unwrap_or(false) {
                if let Ok(evt) = event::read() {
                    if tx.send(UiEvent::Input(evt)).is_err() {
                        break; // Main thread dropped the receiver
                    }
                }
            }

            if last_tick.elapsed() >= tick_rate {
                if tx.send(UiEvent::Tick).is_err() {
                    break;
                }
                last_tick = Instant::now();
            }
        }
    });
}

fn spawn_scan_thread(path: PathBuf, tx: mpsc::Sender<UiEvent>) {
    thread::spawn(move || {
        let event = match discover(&path, &InferSniffer) {
            Ok(files) => UiEvent::ScanFinished(files),
            Err(e) => UiEvent::ScanFailed(e.to_string()),
        };
        let _ = tx.send(event);
    });
}

/// Run the interactive session for `input` until it reaches a terminal outcome
pub fn run_ui(
    input: PathBuf,
    options: Vec<ConfigOption>,
    tools: ToolsConfig,
    theme: Theme,
) -> io::Result<Outcome> {
    let mut state = AppState::new(options, input.is_dir(), tools.ffmpeg.clone());
    let mut queue = EncodeQueue::new(tools);

    let (event_tx, event_rx) = mpsc::channel();
    spawn_event_thread(event_tx.clone());
    spawn_scan_thread(input, event_tx);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut state, &mut queue, &event_rx, &theme);

    // Restore terminal. On any early return below, dropping `queue`
    // interrupts and joins a running job.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;

    if queue.is_cancelled() {
        info!("waiting for ffmpeg to exit after cancel");
        queue.drain_until_idle(CANCEL_DRAIN_TIMEOUT);
    }

    Ok(state
        .outcome()
        .cloned()
        .unwrap_or(Outcome::Cancelled { interrupted: false }))
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    state: &mut AppState,
    queue: &mut EncodeQueue,
    event_rx: &Receiver<UiEvent>,
    theme: &Theme,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| render(frame, state, theme))?;

        if state.is_finished() {
            return Ok(());
        }

        // Always block for at least one event, then drain the queue
        let mut input = Vec::new();
        match event_rx.recv() {
            Ok(evt) => input.extend(to_app_event(evt)),
            Err(_) => return Ok(()),
        }
        while let Ok(evt) = event_rx.try_recv() {
            input.extend(to_app_event(evt));
        }

        // Worker news first, so a quit key sees whether ffmpeg is running
        let mut events = Vec::new();
        for _ in 0..MAX_WORKER_MESSAGES {
            match queue.receiver().try_recv() {
                Ok(msg) => events.push(AppEvent::Worker(msg)),
                Err(_) => break,
            }
        }
        events.extend(input);

        for event in events {
            let actions = state.handle(event);
            execute_actions(actions, state, queue);
            if state.is_finished() {
                break;
            }
        }
    }
}

fn to_app_event(event: UiEvent) -> Option<AppEvent> {
    match event {
        UiEvent::Input(Event::Key(key)) if key.kind == KeyEventKind::Press => {
            Some(AppEvent::Key(key))
        }
        UiEvent::Input(_) => None,
        UiEvent::Tick => Some(AppEvent::Tick),
        UiEvent::ScanFinished(files) => Some(AppEvent::ScanFinished(files)),
        UiEvent::ScanFailed(err) => Some(AppEvent::ScanFailed(err)),
    }
}

fn execute_actions(actions: Vec<Action>, state: &mut AppState, queue: &mut EncodeQueue) {
    for action in actions {
        match action {
            Action::StartJob { input, config } => {
                if let Err(e) = queue.start_job(input, config) {
                    // Report it the same way a failing job would
                    let followup = state.handle(AppEvent::Worker(WorkerMessage::JobFailed {
                        error: e.to_string(),
                        partial_output: None,
                    }));
                    execute_actions(followup, state, queue);
                }
            }
            Action::Interrupt => {
                if !queue.cancel() {
                    info!("cancel requested with no ffmpeg running");
                }
            }
            Action::RemovePartialOutput(path) => match std::fs::remove_file(&path) {
                Ok(()) => info!(path = %path.display(), "removed partial output"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), "failed to remove partial output: {e}"),
            },
        }
    }
}

fn render(frame: &mut Frame, state: &AppState, theme: &Theme) {
    match state.screen {
        Screen::Configuration => ConfigScreen::render(frame, state, theme),
        Screen::FileSelection => FilesScreen::render(frame, state, theme),
        Screen::Encoding => Dashboard::render(frame, state, theme),
        // The outcome is printed after the terminal is restored
        Screen::Terminal(_) => {}
    }
}
