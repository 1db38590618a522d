// Progress monitor fed through a real unix socket

use ffui::engine::{ProgressMonitor, ProgressSample, StreamEnd, TranscodeError};
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::sync::mpsc;
use tempfile::TempDir;

fn start(dir: &TempDir, total_s: f64) -> (ProgressMonitor, mpsc::Receiver<ProgressSample>) {
    let (tx, rx) = mpsc::channel();
    let monitor = ProgressMonitor::start_at(dir.path().join("job_sock"), total_s, move |sample| {
        let _ = tx.send(sample);
    })
    .unwrap();
    (monitor, rx)
}

#[test]
fn test_stream_with_end_marker() {
    let temp_dir = TempDir::new().unwrap();
    let (monitor, rx) = start(&temp_dir, 100.0);
    assert!(monitor.url().starts_with("unix://"));
    assert!(monitor.socket_path().exists());

    let mut stream = UnixStream::connect(monitor.socket_path()).unwrap();
    stream
        .write_all(
            b"frame=10\nout_time_ms=45000000\nspeed=1.5x\nprogress=continue\n\
              out_time_ms=45001000\nspeed=1.5x\nprogress=continue\n\
              out_time_ms=100000000\nprogress=end\n",
        )
        .unwrap();

    let socket_path = monitor.socket_path().to_path_buf();
    assert_eq!(monitor.finish(), StreamEnd::Marker);
    assert!(!socket_path.exists());

    let samples: Vec<ProgressSample> = rx.try_iter().collect();
    assert_eq!(
        samples,
        vec![
            ProgressSample::Fraction(0.45),
            ProgressSample::Eta(36),
            ProgressSample::Eta(36),
            ProgressSample::Fraction(1.0),
        ]
    );
}

#[test]
fn test_peer_close_counts_as_finished() {
    let temp_dir = TempDir::new().unwrap();
    let (monitor, rx) = start(&temp_dir, 10.0);

    {
        let mut stream = UnixStream::connect(monitor.socket_path()).unwrap();
        stream.write_all(b"out_time_us=5000000\n").unwrap();
    }

    assert_eq!(monitor.finish(), StreamEnd::Closed);
    assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![ProgressSample::Fraction(0.5)]);
}

#[test]
fn test_stop_without_connection_cleans_up() {
    let temp_dir = TempDir::new().unwrap();
    let (monitor, rx) = start(&temp_dir, 10.0);
    let socket_path = monitor.socket_path().to_path_buf();

    assert_eq!(monitor.finish(), StreamEnd::NeverConnected);
    assert!(!socket_path.exists());
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_drop_removes_socket() {
    let temp_dir = TempDir::new().unwrap();
    let (monitor, _rx) = start(&temp_dir, 10.0);
    let socket_path = monitor.socket_path().to_path_buf();

    drop(monitor);
    assert!(!socket_path.exists());
}

#[test]
fn test_zero_duration_fails_before_binding() {
    let temp_dir = TempDir::new().unwrap();
    let socket_path = temp_dir.path().join("job_sock");

    let result = ProgressMonitor::start_at(socket_path.clone(), 0.0, |_| {});
    assert!(matches!(result, Err(TranscodeError::InvalidDuration(_))));
    assert!(!socket_path.exists());
}
