//! Save/load through a key-value store.
//!
//! Saves are JSON documents under [`SAVE_KEY`]. Decoding checks the version
//! field before touching the rest of the document, so a save from another
//! format version is reported as such instead of as a parse error.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use blockfall_core::{BoardManager, ScoreManager};

use crate::adventure::AdventureManager;
use crate::config::GameSetup;
use crate::modes::BattleOpponent;
use crate::replay::ReplayRecorder;

pub const SAVE_KEY: &str = "blockfall.save";
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid key: {0}")]
    InvalidKey(String),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("save version {found} is not supported (expected {expected})")]
    Version { found: u64, expected: u32 },
}

/// Minimal string key-value storage the engine persists through.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One `{key}.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.base_dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path(key)?;
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path(key)?;
        let temp_path = path.with_extension("json.tmp");

        fs::write(&temp_path, value)?;
        // Atomic rename
        fs::rename(&temp_path, &path)?;

        log::debug!("wrote {} ({} bytes)", path.display(), value.len());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Everything needed to resume a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub setup: GameSetup,
    pub board: BoardManager,
    pub score: ScoreManager,
    pub adventure: AdventureManager,
    pub opponent: Option<BattleOpponent>,
    pub sim_time_ms: u32,
    pub episode_id: u32,
    pub replay: ReplayRecorder,
}

impl SaveData {
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let found = value.get("version").and_then(|v| v.as_u64()).unwrap_or(0);
        if found != SAVE_VERSION as u64 {
            return Err(PersistenceError::Version {
                found,
                expected: SAVE_VERSION,
            });
        }
        Ok(serde_json::from_value(value)?)
    }
}

pub fn write_save(store: &mut dyn KeyValueStore, data: &SaveData) -> Result<(), PersistenceError> {
    store.set(SAVE_KEY, &data.to_json()?)?;
    Ok(())
}

/// `Ok(None)` when nothing is saved.
pub fn read_save(store: &dyn KeyValueStore) -> Result<Option<SaveData>, PersistenceError> {
    match store.get(SAVE_KEY)? {
        Some(json) => SaveData::from_json(&json).map(Some),
        None => Ok(None),
    }
}
