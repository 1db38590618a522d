//! Interactive ffmpeg batch transcoder.
//!
//! `engine` holds everything that touches files and processes; `ui` holds the
//! screen state machine and its ratatui rendering.

pub mod config;
pub mod engine;
pub mod ui;
