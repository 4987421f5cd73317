//! File registry.
//!
//! Maps file names to shared handles. A handle is created the first time a
//! name is opened and lives for the rest of the run; later opens reuse it.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use bytes::Bytes;

use crate::{ClientId, error::StorageError, storage::Storage};

/// Open flag and content, guarded together.
#[derive(Debug)]
struct FileState {
    open: bool,
    content: Bytes,
}

/// In-memory representation of a shared file.
#[derive(Debug)]
pub struct FileHandle {
    name: String,
    state: Mutex<FileState>,
}

impl FileHandle {
    fn new(name: String, content: Bytes) -> Self {
        Self { name, state: Mutex::new(FileState { open: true, content }) }
    }

    /// File name (registry key).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the file is currently marked open.
    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    /// Current in-memory content.
    pub fn content(&self) -> Bytes {
        self.lock().content.clone()
    }

    /// Replace the in-memory content.
    pub(crate) fn replace_content(&self, content: Bytes) {
        self.lock().content = content;
    }

    fn set_open(&self, open: bool) {
        self.lock().open = open;
    }

    fn lock(&self) -> MutexGuard<'_, FileState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Name to handle map, guarded by one coarse lock.
#[derive(Debug, Default)]
pub struct FileRegistry {
    files: Mutex<HashMap<String, Arc<FileHandle>>>,
}

impl FileRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `name` on behalf of `client_id`.
    ///
    /// The first open loads the initial content from `storage` and inserts
    /// an open handle. The registry lock is held across lookup, load and
    /// insert, so two clients racing on the same name share one handle.
    /// Later opens mark the existing handle open.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the first load fails. No handle is
    /// created in that case.
    pub fn open(
        &self,
        client_id: ClientId,
        name: &str,
        storage: &impl Storage,
    ) -> Result<Arc<FileHandle>, StorageError> {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);

        let handle = if let Some(handle) = files.get(name) {
            handle.set_open(true);
            Arc::clone(handle)
        } else {
            let content = storage.load(name).inspect_err(|e| {
                tracing::error!("Error opening file {}: {}", name, e);
            })?;
            let handle = Arc::new(FileHandle::new(name.to_string(), content));
            files.insert(name.to_string(), Arc::clone(&handle));
            handle
        };

        tracing::info!("Client {} opened file {}", client_id, name);
        Ok(handle)
    }

    /// Mark `handle` closed.
    pub fn close(&self, handle: &FileHandle) {
        handle.set_open(false);
        tracing::info!("File {} closed", handle.name());
    }

    /// Look up the handle for `name`, if it was ever opened.
    pub fn get(&self, name: &str) -> Option<Arc<FileHandle>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner).get(name).cloned()
    }

    /// Number of distinct files opened so far.
    pub fn len(&self) -> usize {
        self.files.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no file has been opened.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn first_open_loads_content() {
        let storage = MemoryStorage::with_file("file1.txt", "initial");
        let registry = FileRegistry::new();

        let handle = registry.open(1, "file1.txt", &storage).unwrap();
        assert_eq!(handle.name(), "file1.txt");
        assert!(handle.is_open());
        assert_eq!(handle.content(), Bytes::from_static(b"initial"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn second_open_reuses_handle() {
        let storage = MemoryStorage::with_file("file1.txt", "initial");
        let registry = FileRegistry::new();

        let first = registry.open(1, "file1.txt", &storage).unwrap();
        registry.close(&first);
        assert!(!first.is_open());

        // Later storage changes are not reloaded
        storage.insert("file1.txt", "changed");
        let second = registry.open(2, "file1.txt", &storage).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.is_open());
        assert_eq!(second.content(), Bytes::from_static(b"initial"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn failed_load_creates_no_handle() {
        let storage = MemoryStorage::new();
        let registry = FileRegistry::new();

        let result = registry.open(1, "missing.txt", &storage);
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
        assert!(registry.is_empty());
        assert!(registry.get("missing.txt").is_none());
    }

    #[test]
    fn concurrent_first_opens_share_one_handle() {
        let storage = Arc::new(MemoryStorage::with_file("shared", "x"));
        let registry = Arc::new(FileRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|client_id| {
                let storage = Arc::clone(&storage);
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.open(client_id, "shared", &*storage).unwrap())
            })
            .collect();

        let opened: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for handle in &opened[1..] {
            assert!(Arc::ptr_eq(&opened[0], handle));
        }
        assert_eq!(registry.len(), 1);
    }
}
