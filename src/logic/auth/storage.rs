//! Local Key-Value State Storage
//!
//! Durable per-profile storage for small pieces of client state (login
//! attempt counters, lockout deadline, kiosk password hash). The browser
//! build of the app kept these in localStorage; here they live in a JSON
//! document under the user's local data directory.
//!
//! The login guard must never raise, so write failures degrade to a logged
//! warning and reads degrade to "no value".

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use parking_lot::Mutex;

/// Capability the login guard is written against, so tests can substitute
/// an in-memory store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// ============================================================================
// MEMORY STORE
// ============================================================================

/// Ephemeral store for tests and throwaway kiosk profiles.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

// ============================================================================
// FILE STORE
// ============================================================================

/// Store backed by a single JSON document on disk.
///
/// The whole document is kept in memory and rewritten on every mutation;
/// the values stored here are a handful of short strings.
pub struct FileStore {
    file_path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Create a store at the default per-user location.
    pub fn new() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("start-clinic");

        fs::create_dir_all(&data_dir).ok();

        Self::from_path(data_dir.join("state.json"))
    }

    /// Create a store at an explicit path (tests point this at a tempdir).
    pub fn from_path(file_path: PathBuf) -> Self {
        let entries = Self::load(&file_path);
        Self {
            file_path,
            entries: Mutex::new(entries),
        }
    }

    fn load(path: &PathBuf) -> HashMap<String, String> {
        let Ok(content) = fs::read_to_string(path) else {
            return HashMap::new();
        };

        match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                log::warn!("State file {} is unreadable, starting fresh: {}", path.display(), e);
                HashMap::new()
            }
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        let content = match serde_json::to_string_pretty(entries) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Failed to serialize state: {}", e);
                return;
            }
        };

        if let Err(e) = fs::write(&self.file_path, content) {
            log::warn!("Failed to write {}: {}", self.file_path.display(), e);
        }
    }

    /// Get the file path (for debugging)
    pub fn file_path(&self) -> &PathBuf {
        &self.file_path
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock();
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }
}
