//! Content-addressed store port.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ContentStoreError;

/// Opaque identifier of a document in the content-addressed store.
///
/// Identifiers are scheme-prefixed strings (e.g. `cas://…`) so that callers
/// can distinguish addressing schemes without parsing them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId(String);

impl ContentId {
    /// Wraps a raw identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Port to the external content-addressed blob store.
///
/// `put` is idempotent: storing identical bytes yields the same identifier.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Stores a blob and returns its content identifier.
    async fn put(&self, bytes: Vec<u8>) -> Result<ContentId, ContentStoreError>;

    /// Retrieves the blob behind a content identifier.
    async fn get(&self, id: &ContentId) -> Result<Vec<u8>, ContentStoreError>;
}
