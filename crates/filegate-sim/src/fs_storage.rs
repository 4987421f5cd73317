//! Filesystem storage.
//!
//! File names resolve relative to a data directory. Saves replace the whole
//! file.
//!
//! Loads and saves are blocking `std::fs` calls made from runtime tasks;
//! saves run under the admission lock.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use bytes::Bytes;
use filegate_core::{Storage, StorageError};

/// Storage backed by files under `root`.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Store files under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Storage for FsStorage {
    fn load(&self, name: &str) -> Result<Bytes, StorageError> {
        match std::fs::read(self.path(name)) {
            Ok(content) => Ok(Bytes::from(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound { name: name.to_string() })
            },
            Err(source) => Err(StorageError::Io { name: name.to_string(), source }),
        }
    }

    fn save(&self, name: &str, content: &[u8]) -> Result<(), StorageError> {
        std::fs::write(self.path(name), content)
            .map_err(|source| StorageError::Io { name: name.to_string(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path());

        let result = storage.load("file1.txt");
        assert!(matches!(result, Err(StorageError::NotFound { name }) if name == "file1.txt"));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("file1.txt"), "before").unwrap();
        let storage = FsStorage::new(dir.path());

        assert_eq!(storage.load("file1.txt").unwrap(), Bytes::from_static(b"before"));
        storage.save("file1.txt", b"after").unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("file1.txt")).unwrap(), "after");
    }

    #[test]
    fn save_into_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path().join("absent"));

        let result = storage.save("file1.txt", b"x");
        assert!(matches!(result, Err(StorageError::Io { .. })));
    }
}
