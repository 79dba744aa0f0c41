//! soundstage-replay: rebuild a scene from an edit journal.
//!
//! Usage: soundstage-replay [--verbose] [--seed scene.json] [journal.jsonl]
//!
//! Prints the resulting scene as JSON on stdout. Without a journal argument
//! the default journal location is used.

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use soundstage_core::journal::{default_journal_path, replay_journal};
use soundstage_types::SceneState;

fn init_logging(verbose: bool) {
    use simplelog::*;

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("soundstage")
        .join("soundstage.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path).or_else(|_| File::create("/tmp/soundstage.log")) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("cannot create log file: {}", e);
            return;
        }
    };

    if let Err(e) = WriteLogger::init(log_level, Config::default(), log_file) {
        eprintln!("failed to initialize logger: {}", e);
        return;
    }

    log::info!("soundstage-replay starting (log level: {:?})", log_level);
}

fn load_seed(path: Option<&PathBuf>) -> Result<SceneState, String> {
    let Some(path) = path else {
        return Ok(SceneState::new());
    };
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("{}: {}", path.display(), e))
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    init_logging(verbose);

    let seed_path = args
        .iter()
        .position(|a| a == "--seed")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from);
    let journal_path = args
        .iter()
        .enumerate()
        .filter(|(i, a)| !a.starts_with('-') && (*i == 0 || args[i - 1] != "--seed"))
        .map(|(_, a)| PathBuf::from(a))
        .next()
        .unwrap_or_else(default_journal_path);

    let seed = match load_seed(seed_path.as_ref()) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("bad seed scene: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let scene = match replay_journal(seed, &journal_path) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("{}: {}", journal_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&scene) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("cannot serialize scene: {}", e);
            ExitCode::FAILURE
        }
    }
}
