// File discovery against real content sniffing

use crate::common::helpers::mp4_bytes;
use ffui::engine::{InferSniffer, TranscodeError, discover};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_directory_keeps_sniffed_videos_in_natural_order() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();

    for name in ["ep10.mp4", "ep2.mp4", "ep1.mp4", "Ep3.bin"] {
        fs::write(dir.join(name), mp4_bytes()).unwrap();
    }
    // Extension says video, content doesn't
    fs::write(dir.join("fake.mp4"), b"just some text").unwrap();
    fs::create_dir(dir.join("season2")).unwrap();
    fs::write(dir.join("season2").join("ep1.mp4"), mp4_bytes()).unwrap();

    let files = discover(dir, &InferSniffer).unwrap();
    let names: Vec<String> = files.iter().map(|f| f.name()).collect();

    assert_eq!(names, vec!["Ep3.bin", "ep1.mp4", "ep2.mp4", "ep10.mp4"]);
    assert!(files.iter().all(|f| f.path.parent() == Some(dir)));
}

#[test]
fn test_directory_without_videos() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("notes.txt"), b"hello").unwrap();

    match discover(temp_dir.path(), &InferSniffer) {
        Err(TranscodeError::UserInput(message)) => {
            assert_eq!(message, "Chosen directory has no video files")
        }
        other => panic!("expected a user input error, got {other:?}"),
    }
}

#[test]
fn test_single_file_needs_no_sniffing() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("whatever.dat");
    fs::write(&path, b"not a video at all").unwrap();

    let files = discover(&path, &InferSniffer).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, path);
}
