//! In-memory and file-backed storage areas.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use serde_json::Value;
use tracing::{debug, warn};

use super::{ChangeHandler, PersistentKv, StorageError, Subscription};

/// Storage shared by every context of one origin.
///
/// Cheap to clone; clones refer to the same entries.
#[derive(Clone)]
pub struct StorageArea {
    inner: Arc<AreaInner>,
}

struct AreaInner {
    entries: RwLock<BTreeMap<String, String>>,
    backing: Option<PathBuf>,
    listeners: Mutex<Vec<Listener>>,
    next_listener: AtomicU64,
    next_context: AtomicU64,
}

struct Listener {
    id: u64,
    context: u64,
    key: String,
    handler: ChangeHandler,
}

impl StorageArea {
    /// Create an empty area that lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_entries(BTreeMap::new(), None)
    }

    /// Open an area backed by the JSON file at `path`.
    ///
    /// A missing file yields an empty area; the file is created on the first
    /// write. A file that is not a JSON object of strings is logged and
    /// ignored, and will be replaced on the next write.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable storage file");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = entries.len(), "Opened storage area");
        Ok(Self::with_entries(entries, Some(path)))
    }

    fn with_entries(entries: BTreeMap<String, String>, backing: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(AreaInner {
                entries: RwLock::new(entries),
                backing,
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(1),
                next_context: AtomicU64::new(1),
            }),
        }
    }

    /// Attach a new execution context to this area.
    #[must_use]
    pub fn context(&self) -> StorageContext {
        StorageContext {
            area: self.clone(),
            id: self.inner.next_context.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Path of the backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.inner.backing.as_deref()
    }

    fn read_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .inner
            .entries
            .read()
            .map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    /// Apply a write, persist it, then notify other contexts.
    fn write_raw(&self, origin: u64, key: &str, value: Option<String>) -> Result<(), StorageError> {
        {
            let mut entries = self
                .inner
                .entries
                .write()
                .map_err(|_| StorageError::Poisoned)?;

            let previous = match value {
                Some(text) => entries.insert(key.to_owned(), text),
                None => entries.remove(key),
            };

            if let Some(path) = &self.inner.backing
                && let Err(e) = persist(path, &entries)
            {
                // Keep memory and file in step.
                match previous {
                    Some(text) => entries.insert(key.to_owned(), text),
                    None => entries.remove(key),
                };
                return Err(e);
            }
        }

        self.notify(origin, key);
        Ok(())
    }

    /// Run handlers registered for `key` by contexts other than `origin`.
    ///
    /// Handlers run after every storage lock is released so they may read
    /// or write the area themselves.
    fn notify(&self, origin: u64, key: &str) {
        let handlers: Vec<ChangeHandler> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|l| l.context != origin && l.key == key)
            .map(|l| Arc::clone(&l.handler))
            .collect();

        for handler in handlers {
            handler(key);
        }
    }

    fn subscribe(&self, context: u64, key: &str, handler: ChangeHandler) -> Subscription {
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Listener {
                id,
                context,
                key: key.to_owned(),
                handler,
            });

        let area: Weak<AreaInner> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(area) = area.upgrade() {
                area.listeners
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .retain(|l| l.id != id);
            }
        })
    }
}

impl std::fmt::Debug for StorageArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageArea")
            .field("backing", &self.inner.backing)
            .finish_non_exhaustive()
    }
}

/// Write the whole map to `path` through a temporary file and rename.
fn persist(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(entries).map_err(StorageError::Encode)?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, text)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// One execution context (page, tab or process) attached to a [`StorageArea`].
#[derive(Debug, Clone)]
pub struct StorageContext {
    area: StorageArea,
    id: u64,
}

impl StorageContext {
    /// Identifier of this context within its area.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// The area this context is attached to.
    #[must_use]
    pub const fn area(&self) -> &StorageArea {
        &self.area
    }

    /// Read the raw text stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Poisoned`] if the storage lock is poisoned.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.area.read_raw(key)
    }

    /// Store raw text under `key` without validating it as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing file cannot be written.
    pub fn set_raw(&self, key: &str, text: impl Into<String>) -> Result<(), StorageError> {
        self.area.write_raw(self.id, key, Some(text.into()))
    }
}

impl PersistentKv for StorageContext {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        self.get_raw(key)?
            .map(|text| {
                serde_json::from_str(&text).map_err(|source| StorageError::Malformed {
                    key: key.to_owned(),
                    source,
                })
            })
            .transpose()
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        self.set_raw(key, value.to_string())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.area.write_raw(self.id, key, None)
    }

    fn on_external_change(&self, key: &str, handler: ChangeHandler) -> Subscription {
        self.area.subscribe(self.id, key, handler)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use serde_json::json;

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, ChangeHandler) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let handler: ChangeHandler = Arc::new(move |_key: &str| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (count, handler)
    }

    #[test]
    fn test_get_absent_key() {
        let context = StorageArea::in_memory().context();
        assert!(context.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_set_then_get() {
        let context = StorageArea::in_memory().context();
        context.set("k", &json!([1, 2])).unwrap();
        assert_eq!(context.get("k").unwrap(), Some(json!([1, 2])));

        context.remove("k").unwrap();
        assert!(context.get("k").unwrap().is_none());
    }

    #[test]
    fn test_malformed_text_is_reported() {
        let context = StorageArea::in_memory().context();
        context.set_raw("k", "{not json").unwrap();
        assert!(matches!(
            context.get("k"),
            Err(StorageError::Malformed { .. })
        ));
    }

    #[test]
    fn test_notifies_other_contexts_only() {
        let area = StorageArea::in_memory();
        let writer = area.context();
        let reader = area.context();

        let (own_count, own_handler) = counter();
        let (other_count, other_handler) = counter();
        let _own = writer.on_external_change("k", own_handler);
        let _other = reader.on_external_change("k", other_handler);

        writer.set("k", &json!(1)).unwrap();
        writer.set("unrelated", &json!(1)).unwrap();

        assert_eq!(own_count.load(Ordering::SeqCst), 0);
        assert_eq!(other_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropping_subscription_unregisters() {
        let area = StorageArea::in_memory();
        let writer = area.context();
        let reader = area.context();

        let (count, handler) = counter();
        let subscription = reader.on_external_change("k", handler);
        writer.set("k", &json!(1)).unwrap();
        drop(subscription);
        writer.set("k", &json!(2)).unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_file_backed_area_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let area = StorageArea::open(&path).unwrap();
        area.context().set("k", &json!({"a": 1})).unwrap();
        assert!(path.exists());

        let reopened = StorageArea::open(&path).unwrap();
        assert_eq!(reopened.context().get("k").unwrap(), Some(json!({"a": 1})));
        assert_eq!(reopened.path(), Some(path.as_path()));
    }

    #[test]
    fn test_corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "garbage").unwrap();

        let area = StorageArea::open(&path).unwrap();
        assert!(area.context().get("k").unwrap().is_none());
    }
}
