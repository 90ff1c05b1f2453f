//! Crash-safe JSON history document

use super::lock::LockGuard;
use super::turn::Turn;
use crate::config::HistoryConfig;
use crate::{Error, Result};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error, info, warn};

const BACKUP_EXTENSION: &str = "bak";
const TEMP_EXTENSION: &str = "tmp";
const LOCK_EXTENSION: &str = "lock";

/// Final step of a save: move the temp document onto the real path
type CommitFn = fn(&Path, &Path) -> io::Result<()>;

fn rename_into_place(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to)
}

/// Durable store for one conversation history document
///
/// The document is a JSON list of `{"speaker", "text"}` objects. Three
/// sidecars share its stem: `.bak` holds the previous document during and
/// after a write, `.tmp` holds the document being written, and `.lock` is
/// the advisory lock token for writers.
#[derive(Clone)]
pub struct HistoryStore {
    path: PathBuf,
    max_turns: usize,
    commit: CommitFn,
}

impl fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryStore")
            .field("path", &self.path)
            .field("max_turns", &self.max_turns)
            .finish()
    }
}

impl HistoryStore {
    /// Create a store for the document at `path`, keeping at most `max_turns` turns
    pub fn new(path: impl Into<PathBuf>, max_turns: usize) -> Result<Self> {
        let path = path.into();
        validate_document_path(&path)?;
        if max_turns == 0 {
            return Err(Error::Config(
                "history max_turns must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            path,
            max_turns,
            commit: rename_into_place,
        })
    }

    /// Create a store from the history section of the configuration
    pub fn from_config(config: &HistoryConfig) -> Result<Self> {
        Self::new(&config.path, config.max_turns)
    }

    /// Load the full history.
    ///
    /// Never fails: a missing, unreadable or malformed document yields an
    /// empty history and an error log. On first run an empty document is
    /// created so later existence checks succeed.
    pub fn load(&self) -> Vec<Turn> {
        match fs::read_to_string(&self.path) {
            Ok(content) => self.decode(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.load_missing(),
            Err(e) => {
                error!(
                    "Error reading conversation history file {}: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Persist `history`, truncated to the most recent `max_turns` turns.
    ///
    /// Never fails: on a write error the previous document is restored from
    /// the backup and the error is logged.
    pub fn save(&self, history: &[Turn]) {
        let turns = self.retained(history);
        let _lock = LockGuard::acquire(&self.lock_path());
        self.write_locked(turns);
    }

    /// Persist an empty history and drop the backup of what was cleared
    pub fn clear(&self) {
        info!("Clearing conversation history {}", self.path.display());
        let _lock = LockGuard::acquire(&self.lock_path());
        if !self.write_locked(&[]) {
            return;
        }

        let backup = self.backup_path();
        match fs::remove_file(&backup) {
            Ok(()) => debug!("Removed history backup {}", backup.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove history backup {}: {}", backup.display(), e),
        }
    }

    /// Path of the history document
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        self.path.with_extension(BACKUP_EXTENSION)
    }

    pub fn temp_path(&self) -> PathBuf {
        self.path.with_extension(TEMP_EXTENSION)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.path.with_extension(LOCK_EXTENSION)
    }

    /// Maximum number of turns kept on save
    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    #[cfg(test)]
    fn with_commit(mut self, commit: CommitFn) -> Self {
        self.commit = commit;
        self
    }

    fn retained<'a>(&self, history: &'a [Turn]) -> &'a [Turn] {
        if history.len() > self.max_turns {
            warn!(
                "Conversation history exceeds {} turns. Truncating history.",
                self.max_turns
            );
            &history[history.len() - self.max_turns..]
        } else {
            history
        }
    }

    /// Write `turns` with the lock held, recovering on failure
    fn write_locked(&self, turns: &[Turn]) -> bool {
        match self.write_document(turns) {
            Ok(()) => {
                debug!("Saved {} turns to {}", turns.len(), self.path.display());
                true
            }
            Err(e) => {
                error!(
                    "Error saving conversation history {}: {}",
                    self.path.display(),
                    e
                );
                self.recover();
                false
            }
        }
    }

    fn decode(&self, content: &str) -> Vec<Turn> {
        match parse_document(content) {
            Ok(turns) => {
                debug!("Loaded {} turns from {}", turns.len(), self.path.display());
                turns
            }
            Err(e) => {
                error!(
                    "Error loading conversation history {}: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// No document on disk. A writer moves the document aside before it
    /// commits the new one, so wait for any writer and look again. A
    /// document that is still missing is a first run.
    fn load_missing(&self) -> Vec<Turn> {
        let _lock = LockGuard::acquire(&self.lock_path());
        match fs::read_to_string(&self.path) {
            Ok(content) => return self.decode(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                error!(
                    "Error reading conversation history file {}: {}",
                    self.path.display(),
                    e
                );
                return Vec::new();
            }
        }

        if let Err(e) = self.create_empty() {
            error!(
                "Error creating conversation history file {}: {}",
                self.path.display(),
                e
            );
        }
        Vec::new()
    }

    fn create_empty(&self) -> io::Result<()> {
        fs::create_dir_all(self.parent_dir())?;
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(mut file) => {
                file.write_all(b"[]")?;
                info!("Created conversation history file {}", self.path.display());
                Ok(())
            }
            // Another process got there first.
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn write_document(&self, turns: &[Turn]) -> io::Result<()> {
        let backup = self.backup_path();
        let temp = self.temp_path();
        fs::create_dir_all(self.parent_dir())?;

        if self.path.exists() {
            if let Err(e) = fs::rename(&self.path, &backup) {
                debug!("Replacing stale backup {}: {}", backup.display(), e);
                if backup.exists() {
                    let _ = fs::remove_file(&backup);
                }
                fs::rename(&self.path, &backup)?;
            }
        }

        let mut writer = BufWriter::new(File::create(&temp)?);
        serde_json::to_writer_pretty(&mut writer, turns)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);

        (self.commit)(&temp, &self.path)?;

        if let Ok(dir) = File::open(self.parent_dir()) {
            let _ = dir.sync_all();
        }
        Ok(())
    }

    /// Undo a failed write: bring the backup back if the document is gone
    /// and drop any half-written temp file.
    fn recover(&self) {
        let backup = self.backup_path();
        if !self.path.exists() && backup.exists() {
            match fs::rename(&backup, &self.path) {
                Ok(()) => warn!(
                    "Restored conversation history {} from backup",
                    self.path.display()
                ),
                Err(e) => error!(
                    "Failed to restore conversation history from {}: {}",
                    backup.display(),
                    e
                ),
            }
        }

        let temp = self.temp_path();
        if temp.exists() {
            if let Err(e) = fs::remove_file(&temp) {
                debug!("Failed to remove temp history {}: {}", temp.display(), e);
            }
        }
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

/// Decode a whole document. Any bad element rejects the whole document.
fn parse_document(content: &str) -> serde_json::Result<Vec<Turn>> {
    serde_json::from_str(content)
}

/// Check that `path` is usable as a history document path
pub fn validate_document_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::Config("history path must not be empty".to_string()));
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(Error::Config(format!(
            "history path must not contain '..': {}",
            path.display()
        )));
    }
    if path.file_name().is_none() {
        return Err(Error::Config(format!(
            "history path must name a file: {}",
            path.display()
        )));
    }
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let ext = ext.to_ascii_lowercase();
        if [BACKUP_EXTENSION, TEMP_EXTENSION, LOCK_EXTENSION].contains(&ext.as_str()) {
            return Err(Error::Config(format!(
                "history path must not use a reserved .{} extension: {}",
                ext,
                path.display()
            )));
        }
    }
    Ok(())
}
