//! Storage collaborator.
//!
//! The coordinator loads a file's initial content the first time it is
//! opened and saves the whole content after every write. It never reads back
//! what it saved, so memory and backing store may diverge after a failed
//! save.

use std::{
    collections::{HashMap, HashSet},
    sync::{Mutex, PoisonError, RwLock},
};

use bytes::Bytes;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::StorageError;

/// Load/save interface for raw file bytes.
pub trait Storage: Send + Sync + 'static {
    /// Load the full content of `name`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if nothing is stored under `name`.
    fn load(&self, name: &str) -> Result<Bytes, StorageError>;

    /// Replace the full content of `name`.
    fn save(&self, name: &str, content: &[u8]) -> Result<(), StorageError>;
}

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage holding a single file.
    pub fn with_file(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let storage = Self::new();
        storage.insert(name, content);
        storage
    }

    /// Store `content` under `name`, bypassing the `Storage` trait.
    pub fn insert(&self, name: impl Into<String>, content: impl Into<Bytes>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), content.into());
    }

    /// Current stored content of `name`.
    pub fn get(&self, name: &str) -> Option<Bytes> {
        self.files.read().unwrap_or_else(PoisonError::into_inner).get(name).cloned()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, name: &str) -> Result<Bytes, StorageError> {
        self.get(name).ok_or_else(|| StorageError::NotFound { name: name.to_string() })
    }

    fn save(&self, name: &str, content: &[u8]) -> Result<(), StorageError> {
        self.insert(name, Bytes::copy_from_slice(content));
        Ok(())
    }
}

/// Storage wrapper that injects failures.
///
/// Failures are either targeted (every save of a named file fails) or random
/// with a fixed rate drawn from a seeded RNG, so a given seed always fails
/// the same calls.
#[derive(Debug)]
pub struct ChaoticStorage<S> {
    inner: S,
    failing_saves: RwLock<HashSet<String>>,
    save_failure_rate: f64,
    rng: Mutex<ChaCha8Rng>,
}

impl<S: Storage> ChaoticStorage<S> {
    /// Wrap `inner` with no failures configured.
    pub fn new(inner: S, seed: u64) -> Self {
        Self {
            inner,
            failing_saves: RwLock::new(HashSet::new()),
            save_failure_rate: 0.0,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Fail each save with probability `rate` (clamped to `0.0..=1.0`).
    #[must_use]
    pub fn with_save_failure_rate(mut self, rate: f64) -> Self {
        self.save_failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Make every save of `name` fail until `heal` is called.
    pub fn fail_saves(&self, name: impl Into<String>) {
        self.failing_saves.write().unwrap_or_else(PoisonError::into_inner).insert(name.into());
    }

    /// Stop failing saves of `name`.
    pub fn heal(&self, name: &str) {
        self.failing_saves.write().unwrap_or_else(PoisonError::into_inner).remove(name);
    }

    /// Wrapped storage.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn should_fail_save(&self, name: &str) -> bool {
        if self.failing_saves.read().unwrap_or_else(PoisonError::into_inner).contains(name) {
            return true;
        }
        if self.save_failure_rate <= 0.0 {
            return false;
        }
        self.rng.lock().unwrap_or_else(PoisonError::into_inner).gen_bool(self.save_failure_rate)
    }
}

impl<S: Storage> Storage for ChaoticStorage<S> {
    fn load(&self, name: &str) -> Result<Bytes, StorageError> {
        self.inner.load(name)
    }

    fn save(&self, name: &str, content: &[u8]) -> Result<(), StorageError> {
        if self.should_fail_save(name) {
            tracing::debug!("injecting save failure for {}", name);
            return Err(StorageError::Injected { name: name.to_string() });
        }
        self.inner.save(name, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_load_missing_is_not_found() {
        let storage = MemoryStorage::new();
        let result = storage.load("missing.txt");
        assert!(matches!(result, Err(StorageError::NotFound { name }) if name == "missing.txt"));
    }

    #[test]
    fn memory_storage_save_replaces_content() {
        let storage = MemoryStorage::with_file("file1.txt", "old");
        storage.save("file1.txt", b"new").unwrap();
        assert_eq!(storage.load("file1.txt").unwrap(), Bytes::from_static(b"new"));
    }

    #[test]
    fn chaotic_storage_targeted_failure_and_heal() {
        let storage = ChaoticStorage::new(MemoryStorage::with_file("a", "x"), 7);
        storage.fail_saves("a");

        assert!(matches!(storage.save("a", b"y"), Err(StorageError::Injected { .. })));
        assert_eq!(storage.inner().get("a"), Some(Bytes::from_static(b"x")));

        storage.heal("a");
        storage.save("a", b"y").unwrap();
        assert_eq!(storage.inner().get("a"), Some(Bytes::from_static(b"y")));
    }

    #[test]
    fn chaotic_storage_rate_is_deterministic_per_seed() {
        let outcomes = |seed| {
            let storage =
                ChaoticStorage::new(MemoryStorage::new(), seed).with_save_failure_rate(0.5);
            (0..32).map(|_| storage.save("f", b"c").is_ok()).collect::<Vec<_>>()
        };

        assert_eq!(outcomes(42), outcomes(42));
        assert!(outcomes(42).iter().any(|ok| *ok));
        assert!(outcomes(42).iter().any(|ok| !*ok));
    }

    #[test]
    fn chaotic_storage_loads_pass_through() {
        let storage = ChaoticStorage::new(MemoryStorage::with_file("a", "x"), 1)
            .with_save_failure_rate(1.0);
        assert_eq!(storage.load("a").unwrap(), Bytes::from_static(b"x"));
        assert!(storage.save("a", b"y").is_err());
    }
}
