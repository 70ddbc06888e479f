//! Durable quote corpus backed by a JSON file.
//!
//! The file holds a JSON array of strings. Writes go to a temporary file in
//! the same directory which is then renamed over the target, so readers of
//! the target path only ever see a complete old or a complete new corpus.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use tempfile::Builder;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::quotes::selector;

/// Minimum length of a quote, in characters, after trimming.
pub const MIN_QUOTE_CHARS: usize = 6;

/// Corpus used when the quotes file is missing or unusable.
pub const DEFAULT_QUOTES: [&str; 20] = [
    "It's okay not to be okay. You're doing your best.",
    "Small steps still count. Showing up matters.",
    "You are not your thoughts; they come and they go.",
    "Asking for help shows strength, not weakness.",
    "Breathe in calm, breathe out pressure. One moment at a time.",
    "You matter, even on the hard days.",
    "Recovery isn’t linear – and that’s perfectly fine.",
    "You’ve survived every tough day so far. That’s power.",
    "Self-compassion is allowed — especially today.",
    "You don’t have to be perfect to be worthy.",
    "Feeling things deeply means you care — that’s courage.",
    "Rest is productive, too.",
    "Thoughts aren’t facts.",
    "You can start small — progress is still progress.",
    "Good enough is good enough.",
    "You are more than your anxiety.",
    "One slow breath can change everything.",
    "Be as kind to yourself as you are to others.",
    "A pause is not a failure.",
    "You are enough. Always have been.",
];

pub fn default_quotes() -> Vec<String> {
    DEFAULT_QUOTES.iter().map(|q| q.to_string()).collect()
}

/// Why the quotes file could not be used as-is.
#[derive(Debug)]
pub enum LoadError {
    /// The file does not exist.
    Missing,
    /// The file exists but could not be read (includes invalid UTF-8).
    Read(io::Error),
    /// The content is not a JSON array of strings.
    Malformed(serde_json::Error),
    /// The content is an empty array.
    Empty,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "quotes file does not exist"),
            Self::Read(e) => write!(f, "failed to read quotes file: {}", e),
            Self::Malformed(e) => write!(f, "quotes file is not a list of strings: {}", e),
            Self::Empty => write!(f, "quotes file contains no quotes"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read(e) => Some(e),
            Self::Malformed(e) => Some(e),
            Self::Missing | Self::Empty => None,
        }
    }
}

/// Failure to persist the corpus.
#[derive(Debug)]
pub enum StoreError {
    /// Could not create the directory holding the quotes file.
    CreateDir { path: PathBuf, source: io::Error },
    /// Could not create or fill the temporary file.
    WriteTemp { dir: PathBuf, source: io::Error },
    /// Could not serialize the corpus.
    Serialize(serde_json::Error),
    /// Could not rename the temporary file over the target.
    Replace { path: PathBuf, source: io::Error },
    /// The blocking write task panicked or was cancelled.
    Task(tokio::task::JoinError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDir { path, source } => {
                write!(f, "failed to create directory '{}': {}", path.display(), source)
            }
            Self::WriteTemp { dir, source } => {
                write!(f, "failed to write temporary quotes file in '{}': {}", dir.display(), source)
            }
            Self::Serialize(e) => write!(f, "failed to serialize quotes: {}", e),
            Self::Replace { path, source } => {
                write!(f, "failed to replace '{}': {}", path.display(), source)
            }
            Self::Task(e) => write!(f, "quotes write task failed: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::WriteTemp { source, .. } => Some(source),
            Self::Serialize(e) => Some(e),
            Self::Replace { source, .. } => Some(source),
            Self::Task(e) => Some(e),
        }
    }
}

/// Result of an add request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Appended and written to disk.
    Added,
    /// Exact text already stored; nothing written.
    AlreadyPresent,
    /// Too short after trimming; nothing changed.
    Rejected,
}

/// Trim `text` and return it if it is long enough to be a quote.
pub fn normalize(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (trimmed.chars().count() >= MIN_QUOTE_CHARS).then_some(trimmed)
}

/// Read the quotes file without any fallback.
pub fn try_load(path: &Path) -> Result<Vec<String>, LoadError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(LoadError::Missing),
        Err(e) => return Err(LoadError::Read(e)),
    };
    let quotes: Vec<String> = serde_json::from_str(&content).map_err(LoadError::Malformed)?;
    if quotes.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(quotes)
}

/// Read the quotes file, replacing it with the defaults if it is unusable.
pub fn load(path: &Path) -> Vec<String> {
    match try_load(path) {
        Ok(quotes) => {
            info!("Loaded {} quotes from {:?}", quotes.len(), path);
            quotes
        }
        Err(e) => {
            match e {
                LoadError::Missing => info!("No quotes file at {:?}, writing defaults", path),
                other => warn!("Ignoring quotes file {:?}: {other}", path),
            }
            let defaults = default_quotes();
            if let Err(e) = save(path, &defaults) {
                warn!("Failed to write default quotes: {e}");
            }
            defaults
        }
    }
}

/// Write the corpus through a temporary sibling file and an atomic rename.
///
/// The temporary file is deleted on every failure path.
pub fn save(path: &Path, quotes: &[String]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| StoreError::CreateDir { path: dir.to_path_buf(), source: e })?;

    let json = serde_json::to_string_pretty(quotes).map_err(StoreError::Serialize)?;

    let write_temp = |e: io::Error| StoreError::WriteTemp { dir: dir.to_path_buf(), source: e };
    let mut tmp = Builder::new()
        .prefix("quotes_")
        .suffix(".json")
        .tempfile_in(dir)
        .map_err(write_temp)?;
    tmp.write_all(json.as_bytes()).map_err(write_temp)?;
    tmp.as_file().sync_all().map_err(write_temp)?;

    tmp.persist(path)
        .map_err(|e| StoreError::Replace { path: path.to_path_buf(), source: e.error })?;
    Ok(())
}

/// The in-memory corpus and its file.
///
/// Readers take a cheap snapshot. Writers serialize on `writer` for the whole
/// check-append-save sequence and publish the new corpus only once it is on
/// disk, so memory never runs ahead of the file.
pub struct QuoteStore {
    path: PathBuf,
    corpus: RwLock<Arc<Vec<String>>>,
    writer: Mutex<()>,
    /// Successful writes made by `add`.
    writes: AtomicUsize,
}

impl QuoteStore {
    /// Load the corpus at `path`, falling back to the defaults.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let quotes = load(&path);
        Self {
            path,
            corpus: RwLock::new(Arc::new(quotes)),
            writer: Mutex::new(()),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current corpus. Later adds do not affect a snapshot already taken.
    pub fn snapshot(&self) -> Arc<Vec<String>> {
        self.corpus
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Number of times `add` has written the file since `open`.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// A uniformly random quote.
    pub fn random_quote(&self) -> String {
        let corpus = self.snapshot();
        selector::pick(&corpus)
            .map(str::to_owned)
            .unwrap_or_else(|| DEFAULT_QUOTES[0].to_string())
    }

    /// Validate and append `text`, persisting before the change is visible.
    pub async fn add(&self, text: &str) -> Result<AddOutcome, StoreError> {
        let Some(quote) = normalize(text) else {
            return Ok(AddOutcome::Rejected);
        };

        let _guard = self.writer.lock().await;
        let current = self.snapshot();
        if current.iter().any(|q| q == quote) {
            return Ok(AddOutcome::AlreadyPresent);
        }

        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(quote.to_string());

        // fsync stays off the async workers; the writer lock is still held
        let path = self.path.clone();
        let saved = tokio::task::spawn_blocking(move || save(&path, &next).map(|()| next))
            .await
            .map_err(StoreError::Task)
            .and_then(|result| result);
        let next = match saved {
            Ok(next) => next,
            Err(e) => {
                error!("Failed to save quotes: {e}");
                return Err(e);
            }
        };
        self.writes.fetch_add(1, Ordering::SeqCst);

        let count = next.len();
        *self
            .corpus
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::new(next);
        info!("Added quote, corpus now has {count} entries");
        Ok(AddOutcome::Added)
    }
}
