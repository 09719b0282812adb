// SPDX-License-Identifier: MPL-2.0
//! Key/value persistence used by opt-in features such as dismiss memory.
//!
//! - [`MemoryStore`]: process-local map, for tests and ephemeral sessions
//! - [`FileStore`]: TOML table on disk, under the platform data directory

use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

const APP_NAME: &str = "FeedbackKit";
const STORE_FILE: &str = "dismissed.toml";

/// Minimal string key/value store.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, `None` if the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items().remove(key);
        Ok(())
    }
}

/// Store backed by a TOML file of string entries.
///
/// The file is read on every access and rewritten on every change, so
/// several processes see each other's writes.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within the process.
    write_lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Opens the store at its default location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if the platform has no data directory.
    pub fn open_default() -> Result<Self> {
        Self::default_location()
            .map(Self::new)
            .ok_or_else(|| Error::Storage("no data directory on this platform".to_string()))
    }

    /// `<data dir>/FeedbackKit/dismissed.toml`
    #[must_use]
    pub fn default_location() -> Option<PathBuf> {
        dirs::data_dir().map(|mut path| {
            path.push(APP_NAME);
            path.push(STORE_FILE);
            path
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path).map_err(storage_error)?;
        toml::from_str(&content).map_err(storage_error)
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(storage_error)?;
        }
        let content = toml::to_string(entries).map_err(storage_error)?;
        fs::write(&self.path, content).map_err(storage_error)
    }

    fn modify(&self, change: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read()?;
        if change(&mut entries) {
            self.write(&entries)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.modify(|entries| entries.remove(key).is_some())
    }
}

fn storage_error(err: impl std::fmt::Display) -> Error {
    Error::Storage(err.to_string())
}
