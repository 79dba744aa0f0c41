//! Append-only JSONL edit journal for debugging and replay.
//!
//! Every dispatched `EditAction` can be appended with the wall-clock time it
//! ran at. Replaying a journal over the same seed scene reproduces the final
//! scene, transport state included. Tail it with `tail -f`.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use soundstage_types::reduce::reduce_action;
use soundstage_types::{EditAction, MutationResult, SceneState};

/// Default journal location: `<data_local_dir>/soundstage/journal.jsonl`.
pub fn default_journal_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("soundstage")
        .join("journal.jsonl")
}

pub struct Journal {
    writer: BufWriter<File>,
    session_start: Instant,
}

#[derive(Serialize)]
struct SessionHeader {
    event: &'static str,
    epoch_ms: u128,
    pid: u32,
}

#[derive(Serialize)]
struct JournalEntry<'a> {
    t_ms: u128,
    /// Wall-clock seconds the action was reduced at.
    now: f64,
    action: &'a EditAction,
    undoable: bool,
    remote_writes: usize,
}

#[derive(Deserialize)]
struct ReplayEntry {
    #[serde(default)]
    now: f64,
    action: Option<EditAction>,
}

impl Journal {
    /// Open (or create) a journal for appending and write a session header.
    pub fn open(path: &Path) -> Result<Self, JournalError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::new(file);

        let header = SessionHeader {
            event: "session_start",
            epoch_ms: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis(),
            pid: std::process::id(),
        };
        writeln!(writer, "{}", serde_json::to_string(&header)?)?;
        writer.flush()?;

        Ok(Self {
            writer,
            session_start: Instant::now(),
        })
    }

    /// Append one dispatched action. Actions that changed nothing are not
    /// recorded.
    pub fn record(&mut self, action: &EditAction, now: f64, result: &MutationResult) -> Result<(), JournalError> {
        if !result.changed {
            return Ok(());
        }
        let entry = JournalEntry {
            t_ms: self.session_start.elapsed().as_millis(),
            now,
            action,
            undoable: action.undo_label().is_some(),
            remote_writes: result.sync.len(),
        };
        writeln!(self.writer, "{}", serde_json::to_string(&entry)?)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum JournalError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl From<std::io::Error> for JournalError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for JournalError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl std::fmt::Display for JournalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for JournalError {}

/// Replay a journal over `seed`.
///
/// Session headers, blank lines and lines that do not parse are skipped.
pub fn replay_journal(seed: SceneState, path: &Path) -> Result<SceneState, JournalError> {
    let mut scene = seed;
    let file = File::open(path)?;
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: ReplayEntry = match serde_json::from_str(&line) {
            Ok(e) => e,
            Err(e) => {
                log::debug!("skipping journal line: {}", e);
                continue;
            }
        };
        if let Some(action) = entry.action {
            reduce_action(&action, &mut scene, entry.now);
        }
    }
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundstage_types::{FieldTarget, ParamField, SoundAsset, Vec3};

    fn seed() -> (SceneState, soundstage_types::EntityId) {
        let mut scene = SceneState::new();
        let obj = scene.add_object("o", Vec3::default());
        (scene, obj)
    }

    fn run(journal: &mut Journal, scene: &mut SceneState, action: EditAction, now: f64) {
        let result = reduce_action(&action, scene, now);
        journal.record(&action, now, &result).unwrap();
    }

    #[test]
    fn replay_reproduces_the_scene() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");
        let (mut live, obj) = seed();

        let mut journal = Journal::open(&path).unwrap();
        run(
            &mut journal,
            &mut live,
            EditAction::AttachSound { entity: obj, cone: None, asset: SoundAsset::new("a.wav", 1, 60.0) },
            1.0,
        );
        run(&mut journal, &mut live, EditAction::TogglePlayback { entity: obj, cone: None }, 2.0);
        run(
            &mut journal,
            &mut live,
            EditAction::Adjust { target: FieldTarget::new(obj, ParamField::Altitude), delta: 500.0 },
            3.0,
        );
        drop(journal);

        let (fresh, _) = seed();
        let replayed = replay_journal(fresh, &path).unwrap();
        assert_eq!(replayed, live);
        assert_eq!(replayed.entity(obj).unwrap().position().y, 300.0);
    }

    #[test]
    fn headers_and_garbage_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");
        let (mut live, obj) = seed();
        let mut journal = Journal::open(&path).unwrap();
        run(
            &mut journal,
            &mut live,
            EditAction::Adjust { target: FieldTarget::new(obj, ParamField::PositionX), delta: 4.0 },
            0.0,
        );
        drop(journal);
        // A second session appends another header.
        drop(Journal::open(&path).unwrap());
        let mut raw = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(raw, "not json").unwrap();
        writeln!(raw).unwrap();

        let (fresh, _) = seed();
        let replayed = replay_journal(fresh, &path).unwrap();
        assert_eq!(replayed.entity(obj).unwrap().position().x, 4.0);
    }

    #[test]
    fn no_op_actions_are_not_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");
        let (mut scene, _) = seed();
        let mut journal = Journal::open(&path).unwrap();
        run(&mut journal, &mut scene, EditAction::SetEditingObject(false), 0.0);
        drop(journal);
        let lines = std::fs::read_to_string(&path).unwrap();
        assert_eq!(lines.lines().count(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = replay_journal(SceneState::new(), &dir.path().join("nope.jsonl")).unwrap_err();
        assert!(matches!(err, JournalError::Io(_)));
    }
}
