// Encoding engine - independent of UI

pub mod core;
pub mod progress;
pub mod worker;

pub use core::*;
pub use progress::{ProgressMonitor, ProgressSample, ProgressTracker, StreamEnd, format_eta};
pub use worker::{EncodeQueue, WorkerMessage};
