// Terminal UI using Ratatui

pub mod components;
pub mod config;
pub mod dashboard;
pub mod events;
pub mod files;
pub mod state;
pub mod theme;
pub mod widgets;

pub use config::ConfigScreen;
pub use dashboard::Dashboard;
pub use events::run_ui;
pub use files::FilesScreen;
pub use state::{Action, AppEvent, AppState, Completion, Outcome, Screen};
pub use theme::Theme;
