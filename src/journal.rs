//! Append-only session journal
//!
//! One line per notable event in a set. The file journal picks a fresh
//! file per session and never overwrites an existing one: on a name
//! collision it tries `<stem>0.txt`, `<stem>1.txt`, and so on.

use chrono::Local;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::JournalError;
use crate::models::constants::JOURNAL_MAX_SUFFIX;

/// A journal line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEntry {
    SetStart,
    BarbellFallen,
    BarbellLifted,
    HelpButtonPressed,
    RerackedSafely,
    AskedForHelp,
    RepFinished(u32),
    BarbellReracked,
    SetEnd,
    SetAborted(String),
}

impl fmt::Display for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalEntry::SetStart => write!(f, "SET START"),
            JournalEntry::BarbellFallen => write!(f, "barbell fallen"),
            JournalEntry::BarbellLifted => write!(f, "barbell lifted"),
            JournalEntry::HelpButtonPressed => write!(f, "help button pressed"),
            JournalEntry::RerackedSafely => write!(f, "reracked safely"),
            JournalEntry::AskedForHelp => write!(f, "lifter asked for help"),
            JournalEntry::RepFinished(n) => write!(f, "rep {n} finished"),
            JournalEntry::BarbellReracked => write!(f, "barbell reracked"),
            JournalEntry::SetEnd => write!(f, "SET END"),
            JournalEntry::SetAborted(reason) => write!(f, "SET ABORTED: {reason}"),
        }
    }
}

/// Sink for journal entries.
pub trait SessionJournal: Send {
    fn record(&mut self, entry: &JournalEntry) -> Result<(), JournalError>;
}

/// Journal backed by a text file, one timestamped line per entry.
#[derive(Debug)]
pub struct FileJournal {
    path: PathBuf,
    file: File,
}

impl FileJournal {
    /// Create a new journal file in `dir`.
    pub fn create(dir: &Path, stem: &str) -> Result<Self, JournalError> {
        fs::create_dir_all(dir).map_err(|source| JournalError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let candidates = std::iter::once(format!("{stem}.txt"))
            .chain((0..JOURNAL_MAX_SUFFIX).map(|n| format!("{stem}{n}.txt")));

        for name in candidates {
            let path = dir.join(name);
            match OpenOptions::new().append(true).create_new(true).open(&path) {
                Ok(file) => return Ok(Self { path, file }),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(JournalError::Write { path, source }),
            }
        }

        Err(JournalError::Exhausted {
            stem: stem.to_string(),
            attempts: JOURNAL_MAX_SUFFIX + 1,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionJournal for FileJournal {
    fn record(&mut self, entry: &JournalEntry) -> Result<(), JournalError> {
        let line = format!("{} {entry}\n", Local::now().to_rfc3339());
        self.file
            .write_all(line.as_bytes())
            .and_then(|()| self.file.flush())
            .map_err(|source| JournalError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

/// In-memory journal; clones share the same entries.
#[derive(Debug, Default, Clone)]
pub struct MemoryJournal {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn contains(&self, entry: &JournalEntry) -> bool {
        self.entries().contains(entry)
    }
}

impl SessionJournal for MemoryJournal {
    fn record(&mut self, entry: &JournalEntry) -> Result<(), JournalError> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry.clone());
        Ok(())
    }
}

/// Journal that only emits diagnostics; used when no file can be opened.
#[derive(Debug, Default)]
pub struct TracingJournal;

impl SessionJournal for TracingJournal {
    fn record(&mut self, entry: &JournalEntry) -> Result<(), JournalError> {
        tracing::info!(target: "spotter::journal", "{entry}");
        Ok(())
    }
}
