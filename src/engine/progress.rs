// Per-job progress monitor fed by ffmpeg's -progress stream over a unix socket

use std::io::{BufRead, BufReader, ErrorKind};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

use super::core::{ProgressField, ProgressParser, Result, TranscodeError};

const ACCEPT_POLL: Duration = Duration::from_millis(50);
const READ_TIMEOUT: Duration = Duration::from_millis(250);

/// One observation derived from the progress stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressSample {
    /// Completion of the current file, 0.0..=1.0
    Fraction(f64),
    /// Estimated seconds left for the current file
    Eta(u64),
}

/// How the progress stream stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// ffmpeg sent `progress=end`
    Marker,
    /// The peer went away without an end marker
    Closed,
    /// Stopped before ffmpeg ever connected
    NeverConnected,
}

/// What feeding one line produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerStep {
    Sample(ProgressSample),
    End,
}

/// Fraction of `total_s` covered by `elapsed_us` microseconds, clamped to 0..=1
pub fn completion_fraction(elapsed_us: u64, total_s: f64) -> f64 {
    (elapsed_us as f64 / 1_000_000.0 / total_s).clamp(0.0, 1.0)
}

/// Seconds left when `fraction` of `total_s` is done at `speed`x realtime
pub fn estimate_eta(total_s: f64, fraction: f64, speed: f64) -> u64 {
    let remaining = total_s * (1.0 - fraction) / speed;
    if remaining.is_finite() && remaining > 0.0 {
        remaining as u64
    } else {
        0
    }
}

/// Turns raw progress lines into fraction/ETA samples for one file.
///
/// Fractions are only reported when they change at two-decimal resolution;
/// the ETA is reported once per ffmpeg report block.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total_s: f64,
    parser: ProgressParser,
    fraction: f64,
    last_hundredths: Option<u32>,
    eta: Option<u64>,
}

impl ProgressTracker {
    pub fn new(total_s: f64) -> Result<Self> {
        if !total_s.is_finite() || total_s <= 0.0 {
            return Err(TranscodeError::InvalidDuration(total_s));
        }

        Ok(Self {
            total_s,
            parser: ProgressParser::new(),
            fraction: 0.0,
            last_hundredths: None,
            eta: None,
        })
    }

    pub fn feed(&mut self, line: &str) -> Option<TrackerStep> {
        match self.parser.parse_line(line)? {
            ProgressField::OutTime => {
                self.fraction = completion_fraction(self.parser.out_time_us, self.total_s);
                let hundredths = (self.fraction * 100.0).round() as u32;
                if self.last_hundredths == Some(hundredths) {
                    return None;
                }
                self.last_hundredths = Some(hundredths);
                Some(TrackerStep::Sample(ProgressSample::Fraction(
                    hundredths as f64 / 100.0,
                )))
            }
            ProgressField::Speed => {
                let speed = self.parser.speed?;
                self.eta = Some(estimate_eta(self.total_s, self.fraction, speed));
                None
            }
            ProgressField::BlockEnd => self
                .eta
                .map(|eta| TrackerStep::Sample(ProgressSample::Eta(eta))),
            ProgressField::End => Some(TrackerStep::End),
        }
    }
}

/// Removes the socket file when the serving thread is done with it
struct SocketFile(PathBuf);

impl Drop for SocketFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.0) {
            Ok(()) => debug!(path = %self.0.display(), "removed progress socket"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.0.display(), "failed to remove progress socket: {e}"),
        }
    }
}

/// A listening socket plus the thread that serves its single connection.
///
/// The socket file is removed when serving ends, however it ends. Dropping
/// the monitor stops and joins the thread.
pub struct ProgressMonitor {
    socket_path: PathBuf,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<StreamEnd>>,
}

impl ProgressMonitor {
    /// Bind a fresh socket in the temp dir and start serving it
    pub fn start<F>(total_s: f64, on_sample: F) -> Result<Self>
    where
        F: FnMut(ProgressSample) + Send + 'static,
    {
        let socket_path = std::env::temp_dir().join(format!("{}_sock", rand::random::<u64>()));
        Self::start_at(socket_path, total_s, on_sample)
    }

    /// Same as [`ProgressMonitor::start`] with a caller-chosen socket path
    pub fn start_at<F>(socket_path: PathBuf, total_s: f64, on_sample: F) -> Result<Self>
    where
        F: FnMut(ProgressSample) + Send + 'static,
    {
        let tracker = ProgressTracker::new(total_s)?;

        let listener = UnixListener::bind(&socket_path).map_err(|e| {
            TranscodeError::io(
                format!("Failed to listen on {}", socket_path.display()),
                e,
            )
        })?;
        let guard = SocketFile(socket_path.clone());
        listener
            .set_nonblocking(true)
            .map_err(|e| TranscodeError::io("Failed to configure progress socket", e))?;
        debug!(path = %socket_path.display(), "progress socket listening");

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();
        let handle = thread::Builder::new()
            .name("progress-monitor".to_string())
            .spawn(move || {
                let _guard = guard;
                match accept_one(&listener, &thread_stop) {
                    Some(stream) => serve(stream, tracker, on_sample, &thread_stop),
                    None => StreamEnd::NeverConnected,
                }
            })
            .map_err(|e| TranscodeError::io("Failed to spawn progress monitor", e))?;

        Ok(Self {
            socket_path,
            stop,
            handle: Some(handle),
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Destination to hand to `ffmpeg -progress`
    pub fn url(&self) -> String {
        format!("unix://{}", self.socket_path.display())
    }

    /// Stop serving and wait for the thread; call once ffmpeg has exited
    pub fn finish(mut self) -> StreamEnd {
        self.shutdown()
    }

    fn shutdown(&mut self) -> StreamEnd {
        self.stop.store(true, Ordering::SeqCst);
        match self.handle.take().map(JoinHandle::join) {
            Some(Ok(end)) => end,
            Some(Err(_)) => {
                warn!("progress monitor thread panicked");
                StreamEnd::Closed
            }
            None => StreamEnd::Closed,
        }
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.shutdown();
        }
    }
}

fn accept_one(listener: &UnixListener, stop: &AtomicBool) -> Option<UnixStream> {
    loop {
        match listener.accept() {
            Ok((stream, _)) => return Some(stream),
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                if stop.load(Ordering::SeqCst) {
                    return None;
                }
                thread::sleep(ACCEPT_POLL);
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => {
                warn!("progress socket accept failed: {e}");
                return None;
            }
        }
    }
}

fn serve<F>(
    stream: UnixStream,
    mut tracker: ProgressTracker,
    mut on_sample: F,
    stop: &AtomicBool,
) -> StreamEnd
where
    F: FnMut(ProgressSample),
{
    debug!("ffmpeg connected to progress socket");
    if stream.set_nonblocking(false).is_err() || stream.set_read_timeout(Some(READ_TIMEOUT)).is_err()
    {
        warn!("could not configure progress stream, reading without timeout");
    }

    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    loop {
        match reader.read_line(&mut line) {
            Ok(0) => return StreamEnd::Closed,
            Ok(_) => {
                let step = tracker.feed(line.trim_end());
                line.clear();
                match step {
                    Some(TrackerStep::Sample(sample)) => on_sample(sample),
                    Some(TrackerStep::End) => return StreamEnd::Marker,
                    None => {}
                }
            }
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                if stop.load(Ordering::SeqCst) {
                    return StreamEnd::Closed;
                }
            }
            Err(e) => {
                debug!("progress stream read ended: {e}");
                return StreamEnd::Closed;
            }
        }
    }
}

/// `90061` -> `1d1h1m1s`; zero-valued leading units are left out
pub fn format_eta(total_secs: u64) -> String {
    let days = total_secs / 86_400;
    let hours = total_secs % 86_400 / 3_600;
    let minutes = total_secs % 3_600 / 60;
    let seconds = total_secs % 60;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{days}d"));
    }
    if days > 0 || hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&format!("{seconds}s"));
    out
}
