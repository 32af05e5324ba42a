//! Key-value persistence
//!
//! The store saves its state as JSON blobs under fixed logical keys. The
//! file-backed implementation keeps every key in one JSON object in the XDG
//! data directory (~/.local/share/exchange-map/store.json).

use crate::constants::storage::STORE_FILE_NAME;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, warn};

const APP_DIR_NAME: &str = "exchange-map";

/// A string-keyed blob store
pub trait KeyValueStore: Send + Sync {
    /// Read the blob stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous blob
    fn set(&mut self, key: &str, value: String) -> Result<()>;

    /// Delete the blob under `key`; missing keys are not an error
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store, lost on exit
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    entries: BTreeMap<String, String>,
    path: PathBuf,
}

impl JsonFileStore {
    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))
    }

    /// Get the default store file path
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join(STORE_FILE_NAME))
    }

    /// Open the store at the default path
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path()?)
    }

    /// Open the store at a specific path; a missing file is an empty store
    pub fn load_from(path: PathBuf) -> Result<Self> {
        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Persistence(format!("Failed to read store file: {}", e))
            })?;

            serde_json::from_str(&content).map_err(|e| {
                Error::Persistence(format!("Failed to parse store file: {}", e))
            })?
        } else {
            BTreeMap::new()
        };

        Ok(Self { entries, path })
    }

    /// Open the store at `path`, starting empty if the file is unreadable
    ///
    /// A damaged file is moved aside to `<name>.corrupt` so the next save
    /// does not overwrite it.
    pub fn open_or_reset(path: PathBuf) -> Self {
        match Self::load_from(path.clone()) {
            Ok(store) => store,
            Err(e) => {
                error!("{} ({}); starting with an empty store", e, path.display());
                let backup = sibling(&path, "corrupt");
                match fs::rename(&path, &backup) {
                    Ok(()) => warn!("Moved damaged store file to {}", backup.display()),
                    Err(e) => warn!("Could not move damaged store file aside: {}", e),
                }
                Self {
                    entries: BTreeMap::new(),
                    path,
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Persistence(format!("Failed to create store directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            Error::Persistence(format!("Failed to serialize store: {}", e))
        })?;

        // Write next to the target, then swap it in
        let temp = sibling(&self.path, "tmp");
        fs::write(&temp, content).map_err(|e| {
            Error::Persistence(format!("Failed to write store file: {}", e))
        })?;
        fs::rename(&temp, &self.path).map_err(|e| {
            Error::Persistence(format!("Failed to replace store file: {}", e))
        })?;

        Ok(())
    }
}

/// `store.json` -> `store.json.<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
