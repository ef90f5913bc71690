//! History of past checks.
//!
//! The history is a small newest-first log capped at [`HISTORY_CAPACITY`]
//! entries. It is persisted as a JSON document holding the entries under the
//! `checkHistory` key.

use {
    crate::{
        errors::{Error, Result},
        structs::HistoryEntry,
    },
    serde_json::{Map, Value},
    std::{
        collections::VecDeque,
        io::ErrorKind,
        path::PathBuf,
        sync::Mutex,
    },
    tracing::debug,
};

pub const HISTORY_CAPACITY: usize = 20;
pub const HISTORY_KEY: &str = "checkHistory";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn from_entries(entries: impl IntoIterator<Item = HistoryEntry>) -> Self {
        let mut entries: VecDeque<HistoryEntry> = entries.into_iter().collect();
        entries.truncate(HISTORY_CAPACITY);
        History { entries }
    }

    /// Add an entry at the front, evicting the oldest one past capacity.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Durable storage for the check history.
pub trait HistoryStore: Send + Sync {
    fn load(&self) -> Result<History>;

    fn save(&self, history: &History) -> Result<()>;

    fn clear(&self) -> Result<()>;

    /// Read, push and write back in one step.
    fn append(&self, entry: HistoryEntry) -> Result<()> {
        let mut history = self.load()?;
        history.push(entry);
        self.save(&history)
    }
}

#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    history: Mutex<History>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<History> {
        Ok(self
            .history
            .lock()
            .map_err(|e| Error::History(e.to_string()))?
            .clone())
    }

    fn save(&self, history: &History) -> Result<()> {
        *self
            .history
            .lock()
            .map_err(|e| Error::History(e.to_string()))? = history.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.save(&History::default())
    }
}

/// Key-value JSON file. Other keys in the document are left untouched.
#[derive(Debug)]
pub struct FileHistoryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileHistoryStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_document(&self) -> Result<Map<String, Value>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        if text.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&text)? {
            Value::Object(document) => Ok(document),
            _ => Err(Error::History(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
        }
    }

    fn write_document(&self, document: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(document)?)?;
        Ok(())
    }

    fn with_lock<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| Error::History(e.to_string()))?;
        f()
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> Result<History> {
        self.with_lock(|| {
            let entries = match self.read_document()?.remove(HISTORY_KEY) {
                Some(value) => serde_json::from_value::<Vec<HistoryEntry>>(value)?,
                None => Vec::new(),
            };
            Ok(History::from_entries(entries))
        })
    }

    fn save(&self, history: &History) -> Result<()> {
        self.with_lock(|| {
            let mut document = self.read_document()?;
            let entries = history.iter().collect::<Vec<_>>();
            document.insert(HISTORY_KEY.to_owned(), serde_json::to_value(entries)?);
            self.write_document(&document)?;
            debug!(path = %self.path.display(), entries = history.len(), "History saved");
            Ok(())
        })
    }

    fn clear(&self) -> Result<()> {
        self.with_lock(|| {
            let mut document = self.read_document()?;
            if document.remove(HISTORY_KEY).is_some() {
                self.write_document(&document)?;
            }
            Ok(())
        })
    }
}
