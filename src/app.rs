use crate::cli::{Cli, Commands};
use ffui::{config, engine, ui};
use std::path::PathBuf;
use std::process;
use tracing::{info, warn};

pub fn run(cli: Cli) {
    let config = config::Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: {e:#}");
        eprintln!("Using built-in defaults.");
        config::Config::default()
    });

    init_logging(&config, cli.log_file.as_deref());

    // Handle subcommands first
    if let Some(command) = cli.command {
        match command {
            Commands::CheckFfmpeg => handle_check_ffmpeg(&config.tools),
            Commands::Probe { file } => handle_probe(&config.tools, file),
            Commands::Encoders => handle_encoders(&config.tools),
            Commands::InitConfig => handle_init_config(),
        }
        return;
    }

    let Some(path) = cli.path.filter(|p| !p.as_os_str().is_empty()) else {
        eprintln!("No directory or file provided.");
        process::exit(1);
    };

    let path = match std::path::absolute(&path) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: cannot resolve {}: {e}", path.display());
            process::exit(1);
        }
    };
    if let Err(e) = std::fs::metadata(&path) {
        eprintln!("Error: cannot access {}: {e}", path.display());
        process::exit(1);
    }

    let capabilities = engine::list_encoders(&config.tools.ffmpeg).unwrap_or_else(|e| {
        warn!("could not list ffmpeg encoders, offering all supported ones: {e:#}");
        engine::EncoderCapabilities::all_supported()
    });
    info!(?capabilities, path = %path.display(), "starting");

    let options = engine::default_options(&config.defaults, &capabilities);
    let outcome = match ui::run_ui(path, options, config.tools.clone(), ui::Theme::default()) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error running UI: {e}");
            process::exit(1);
        }
    };

    println!("{}", outcome.message());
    process::exit(outcome.exit_code());
}

fn init_logging(config: &config::Config, override_path: Option<&std::path::Path>) {
    let path: PathBuf = override_path
        .map(PathBuf::from)
        .unwrap_or_else(|| config.logging.file.clone());

    if let Err(e) = engine::init_file_logging(&path, &config.logging.level) {
        eprintln!("Warning: logging disabled: {e:#}");
    }
}

fn handle_check_ffmpeg(tools: &config::ToolsConfig) {
    match engine::ffmpeg_version(&tools.ffmpeg) {
        Ok(version) => {
            println!("ffmpeg found: {}", version);
            match engine::ffprobe_version(&tools.ffprobe) {
                Ok(probe_version) => {
                    println!("ffprobe found: {}", probe_version);
                    process::exit(0);
                }
                Err(e) => {
                    eprintln!("Error: {:#}", e);
                    process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn handle_probe(tools: &config::ToolsConfig, file: PathBuf) {
    match engine::probe_duration(&tools.ffprobe, &file) {
        Ok(duration) => {
            println!("Duration: {:.2} seconds", duration);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn handle_encoders(tools: &config::ToolsConfig) {
    match engine::list_encoders(&tools.ffmpeg) {
        Ok(capabilities) => {
            println!("Video: copy {}", capabilities.video.join(" "));
            println!("Audio: None copy {}", capabilities.audio.join(" "));
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn handle_init_config() {
    if config::Config::exists() {
        match config::Config::load() {
            Ok(cfg) => {
                if let Ok(path) = config::Config::config_path() {
                    println!("Config loaded successfully from {}", path.display());
                }
                println!("{:#?}", cfg);
            }
            Err(e) => {
                eprintln!("Config invalid: {:#}", e);
                process::exit(1);
            }
        }
        return;
    }

    println!("Creating default config...");
    let cfg = config::Config::default();
    if let Err(err) = cfg.save() {
        eprintln!("Failed to save default config: {:#}", err);
        process::exit(1);
    }
    match config::Config::config_path() {
        Ok(path) => println!("Default config saved to {}", path.display()),
        Err(e) => println!("Default config saved (path unknown): {:#}", e),
    }
}
