//! In-memory content-addressed store.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use palmares_core::content::{ContentId, ContentStore};
use palmares_core::error::ContentStoreError;
use sha2::{Digest, Sha256};

/// An in-memory content store addressing blobs by their SHA-256 digest, so
/// `put` is idempotent the way the real store is: identical bytes yield the
/// same identifier. Reads can be switched to fail to exercise
/// unavailability paths.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    blobs: Mutex<HashMap<ContentId, Vec<u8>>>,
    unavailable: AtomicBool,
}

impl MemoryContentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `get` fail with `Unavailable` (or restores
    /// normal service).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns the number of stored blobs.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn blob_count(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    fn address(bytes: &[u8]) -> ContentId {
        let digest = Sha256::digest(bytes);
        let mut hex = String::with_capacity(2 * digest.len());
        for byte in digest {
            hex.push_str(&format!("{byte:02x}"));
        }
        ContentId::new(format!("cas://{hex}"))
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn put(&self, bytes: Vec<u8>) -> Result<ContentId, ContentStoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ContentStoreError::Unavailable("simulated outage".into()));
        }
        let id = Self::address(&bytes);
        self.blobs.lock().unwrap().insert(id.clone(), bytes);
        Ok(id)
    }

    async fn get(&self, id: &ContentId) -> Result<Vec<u8>, ContentStoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ContentStoreError::Unavailable("simulated outage".into()));
        }
        self.blobs
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| ContentStoreError::NotFound(id.clone()))
    }
}
