//! Durable client-local key-value storage.
//!
//! The SDK persists a handful of independent keys across restarts: the
//! session token, the anonymous cart identifier, and the locale/currency
//! preferences. Each key is read at startup and written on change; there is
//! no schema versioning.
//!
//! Storage writes are best-effort: a failed write is logged and the
//! in-memory value stays authoritative for the rest of the session.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Keys for the values the SDK persists.
pub mod keys {
    /// Bearer token for the authenticated session.
    pub const SESSION_TOKEN: &str = "session_token";

    /// Identifier of the server-side cart owned by this client.
    pub const CART_ID: &str = "cart_id";

    /// Preferred locale, sent as `Accept-Language`.
    pub const LOCALE: &str = "locale";

    /// Preferred currency, sent as `X-Currency`.
    pub const CURRENCY: &str = "currency";
}

/// Client-local key-value storage.
///
/// Implementations must be safe to share across the store graph; the SDK
/// holds them behind `Arc<dyn KeyValueStorage>`.
pub trait KeyValueStorage: Send + Sync {
    /// Read a value, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str);

    /// Remove a value. Removing an absent key is a no-op.
    fn remove(&self, key: &str);
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-memory storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock_poison_free(&self.map).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        lock_poison_free(&self.map).insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        lock_poison_free(&self.map).remove(key);
    }
}

// =============================================================================
// FileStorage
// =============================================================================

/// Storage backed by a single JSON file.
///
/// The file is read once when opened and rewritten after every change. This
/// is the durable storage used by the CLI; concurrent processes writing the
/// same file will race on cart creation, which mirrors the multi-tab
/// behavior of the storefront and is accepted.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    map: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open storage at `path`, creating an empty store if the file does not
    /// exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let map = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(std::io::Error::other)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e),
        };

        Ok(Self {
            path,
            map: Mutex::new(map),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, map: &HashMap<String, String>) {
        let result = serde_json::to_string_pretty(map)
            .map_err(std::io::Error::other)
            .and_then(|contents| {
                if let Some(parent) = self.path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&self.path, contents)
            });

        if let Err(e) = result {
            tracing::error!(path = %self.path.display(), error = %e, "Failed to persist client storage");
        }
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock_poison_free(&self.map).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut map = lock_poison_free(&self.map);
        map.insert(key.to_owned(), value.to_owned());
        self.persist(&map);
    }

    fn remove(&self, key: &str) {
        let mut map = lock_poison_free(&self.map);
        if map.remove(key).is_some() {
            self.persist(&map);
        }
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked.
fn lock_poison_free<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
