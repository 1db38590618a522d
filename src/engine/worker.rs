// Sequential encode queue: one ffmpeg job at a time on a background thread

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::core::{
    ConflictPolicy, ParsedConfiguration, Result, TranscodeError, build_ffmpeg_cmd,
    derive_output_path, format_ffmpeg_cmd, probe_duration,
};
use super::progress::{ProgressMonitor, ProgressSample};
use crate::config::ToolsConfig;

const DRAIN_POLL: Duration = Duration::from_millis(50);

/// How long dropping a busy queue waits for the interrupted job
const DROP_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// PID of the ffmpeg process currently running, if any
pub type PidRegistry = Arc<Mutex<Option<u32>>>;

/// Message from the job thread to the UI loop
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerMessage {
    /// ffmpeg was spawned for the current job
    ProcessStarted { pid: u32, command: String },

    /// Progress of the current job
    Progress(ProgressSample),

    /// Encode finished, original is being removed
    DeletingOriginal { input: PathBuf },

    /// Job done; `skipped` when the output existed and the policy is skip
    JobCompleted { input: PathBuf, skipped: bool },

    /// Job failed; `partial_output` is set when ffmpeg may have written it
    JobFailed {
        error: String,
        partial_output: Option<PathBuf>,
    },

    /// Job stopped because the queue was cancelled
    JobCancelled,

    /// The job thread has exited
    WorkerIdle,
}

enum JobOutcome {
    Completed { skipped: bool },
    Cancelled,
    Failed {
        error: TranscodeError,
        partial_output: Option<PathBuf>,
    },
}

impl From<TranscodeError> for JobOutcome {
    fn from(error: TranscodeError) -> Self {
        JobOutcome::Failed {
            error,
            partial_output: None,
        }
    }
}

/// Runs encode jobs one at a time and reports through a channel.
///
/// The queue itself holds no file list: the caller decides which file to
/// start next after each `JobCompleted`.
pub struct EncodeQueue {
    tools: ToolsConfig,
    tx: Sender<WorkerMessage>,
    rx: Receiver<WorkerMessage>,
    cancelled: Arc<AtomicBool>,
    pid: PidRegistry,
    current: Option<JoinHandle<()>>,
}

impl EncodeQueue {
    pub fn new(tools: ToolsConfig) -> Self {
        let (tx, rx) = mpsc::channel();

        Self {
            tools,
            tx,
            rx,
            cancelled: Arc::new(AtomicBool::new(false)),
            pid: Arc::new(Mutex::new(None)),
            current: None,
        }
    }

    /// Get the receiver for worker messages
    pub fn receiver(&self) -> &Receiver<WorkerMessage> {
        &self.rx
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Whether a job thread is still running
    pub fn is_busy(&self) -> bool {
        self.current.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start encoding `input` on a new thread.
    ///
    /// Jobs are strictly sequential: a previous job thread is joined first.
    /// It has normally reported its outcome already and is just exiting.
    pub fn start_job(&mut self, input: PathBuf, config: ParsedConfiguration) -> Result<()> {
        if let Some(previous) = self.current.take() {
            if !previous.is_finished() {
                debug!("waiting for previous encode thread to exit");
            }
            let _ = previous.join();
        }

        if self.is_cancelled() {
            debug!(path = %input.display(), "queue cancelled, not starting job");
            return Ok(());
        }

        let tools = self.tools.clone();
        let tx = self.tx.clone();
        let cancelled = self.cancelled.clone();
        let pid = self.pid.clone();

        let handle = thread::Builder::new()
            .name("encode-job".to_string())
            .spawn(move || {
                let outcome = run_job(&input, &config, &tools, &tx, &cancelled, &pid);
                let message = match outcome {
                    JobOutcome::Completed { skipped } => {
                        WorkerMessage::JobCompleted { input, skipped }
                    }
                    JobOutcome::Cancelled => WorkerMessage::JobCancelled,
                    JobOutcome::Failed {
                        error,
                        partial_output,
                    } => {
                        error!(path = %input.display(), "encode failed: {error}");
                        WorkerMessage::JobFailed {
                            error: error.to_string(),
                            partial_output,
                        }
                    }
                };
                let _ = tx.send(message);
                let _ = tx.send(WorkerMessage::WorkerIdle);
            })
            .map_err(|e| TranscodeError::io("Failed to spawn encode thread", e))?;

        self.current = Some(handle);
        Ok(())
    }

    /// Stop the queue and interrupt the live ffmpeg process, if any.
    ///
    /// Returns whether a process was signalled. The process is never killed
    /// outright; ffmpeg finalises and exits on SIGINT.
    pub fn cancel(&self) -> bool {
        self.cancelled.store(true, Ordering::SeqCst);
        let pid = *self.pid.lock().unwrap_or_else(PoisonError::into_inner);
        match pid {
            Some(pid) => {
                info!(pid, "interrupting ffmpeg");
                interrupt(pid);
                true
            }
            None => false,
        }
    }

    /// After a cancel, consume messages until the job thread exits or `timeout`
    /// passes. Returns whether the thread finished.
    pub fn drain_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.is_busy() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!("encode thread still running after {timeout:?}");
                return false;
            }
            if let Ok(message) = self.rx.recv_timeout(remaining.min(DRAIN_POLL)) {
                debug!(?message, "discarding message after cancel");
            }
        }

        while let Ok(message) = self.rx.try_recv() {
            debug!(?message, "discarding message after cancel");
        }
        if let Some(handle) = self.current.take() {
            let _ = handle.join();
        }
        true
    }
}

/// A queue dropped mid-job (e.g. the UI bailed out on an I/O error) still
/// interrupts ffmpeg and waits for the job, so its socket is removed.
impl Drop for EncodeQueue {
    fn drop(&mut self) {
        if self.is_busy() {
            warn!("encode queue dropped with a job running, interrupting it");
            self.cancel();
            self.drain_until_idle(DROP_DRAIN_TIMEOUT);
        }
    }
}

fn interrupt(pid: u32) {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: kill has no memory-safety preconditions
    let rc = unsafe { libc::kill(pid, libc::SIGINT) };
    if rc != 0 {
        warn!(pid, "failed to interrupt ffmpeg: {}", std::io::Error::last_os_error());
    }
}

fn run_job(
    input: &Path,
    config: &ParsedConfiguration,
    tools: &ToolsConfig,
    tx: &Sender<WorkerMessage>,
    cancelled: &AtomicBool,
    pid_registry: &PidRegistry,
) -> JobOutcome {
    let output = derive_output_path(input, config);

    if output.exists() {
        match config.conflict {
            ConflictPolicy::Skip => {
                info!(output = %output.display(), "output exists, skipping");
                return JobOutcome::Completed { skipped: true };
            }
            ConflictPolicy::Overwrite => {
                info!(output = %output.display(), "output exists, overwriting");
                if let Err(e) = fs::remove_file(&output) {
                    return TranscodeError::io(
                        format!("Failed to remove existing {}", output.display()),
                        e,
                    )
                    .into();
                }
            }
        }
    }

    let duration = match probe_duration(&tools.ffprobe, input) {
        Ok(duration) => duration,
        Err(e) => return e.into(),
    };
    debug!(path = %input.display(), duration, "probed duration");

    let progress_tx = tx.clone();
    let monitor = match ProgressMonitor::start(duration, move |sample| {
        let _ = progress_tx.send(WorkerMessage::Progress(sample));
    }) {
        Ok(monitor) => monitor,
        Err(e) => return e.into(),
    };

    if cancelled.load(Ordering::SeqCst) {
        return JobOutcome::Cancelled;
    }

    let mut cmd = build_ffmpeg_cmd(
        &tools.ffmpeg,
        input,
        &output,
        config,
        Some(&monitor.url()),
    );
    let command = format_ffmpeg_cmd(&cmd);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::piped());

    info!(%command, "spawning ffmpeg");
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => return TranscodeError::io(format!("Failed to spawn {}", tools.ffmpeg), e).into(),
    };

    let pid = child.id();
    *pid_registry.lock().unwrap_or_else(PoisonError::into_inner) = Some(pid);
    let _ = tx.send(WorkerMessage::ProcessStarted {
        pid,
        command: command.clone(),
    });

    // A cancel that landed between the check above and the registration
    if cancelled.load(Ordering::SeqCst) {
        interrupt(pid);
    }

    let stderr_thread = child.stderr.take().map(|stderr| {
        thread::spawn(move || {
            let mut stderr_output = String::new();
            let reader = BufReader::new(stderr);
            for line in reader.lines().map_while(std::io::Result::ok) {
                stderr_output.push_str(&line);
                stderr_output.push('\n');
            }
            stderr_output
        })
    });

    let status = child.wait();
    *pid_registry.lock().unwrap_or_else(PoisonError::into_inner) = None;

    let stream_end = monitor.finish();
    debug!(?stream_end, "progress stream finished");

    let stderr = stderr_thread
        .and_then(|t| t.join().ok())
        .unwrap_or_default();

    if cancelled.load(Ordering::SeqCst) {
        info!(output = %output.display(), "encode cancelled, leaving partial output");
        return JobOutcome::Cancelled;
    }

    let status = match status {
        Ok(status) => status,
        Err(e) => {
            return JobOutcome::Failed {
                error: TranscodeError::io("Failed to wait for ffmpeg", e),
                partial_output: Some(output),
            };
        }
    };

    if !status.success() {
        return JobOutcome::Failed {
            error: TranscodeError::Encoder {
                status,
                stderr: stderr.trim_end().to_string(),
            },
            partial_output: Some(output),
        };
    }

    info!(output = %output.display(), "encode finished");

    if config.delete_original {
        let _ = tx.send(WorkerMessage::DeletingOriginal {
            input: input.to_path_buf(),
        });
        if let Err(e) = fs::remove_file(input) {
            return TranscodeError::io(format!("Failed to delete {}", input.display()), e).into();
        }
        info!(path = %input.display(), "deleted original");
    }

    JobOutcome::Completed { skipped: false }
}
