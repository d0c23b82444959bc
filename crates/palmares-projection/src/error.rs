//! Projection error types.

use palmares_core::error::{ContentStoreError, LedgerError};
use palmares_core::ledger::Registry;
use palmares_metadata::error::MetadataError;
use thiserror::Error;

/// Errors raised while projecting ledger events.
///
/// Malformed events and unavailable metadata are isolated per event/entity;
/// neither aborts the stream.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// An event's shape does not match any known (registry, name) decoder.
    /// Logged and dropped, never fatal to the stream.
    #[error("malformed event {event_name} from {registry}: {detail}")]
    MalformedEvent {
        /// The emitting registry.
        registry: Registry,
        /// The event name as received.
        event_name: String,
        /// What was wrong with the shape.
        detail: String,
    },

    /// A ledger query or read call failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The metadata document for one entity could not be fetched. The
    /// entity stays deferred and is retried on next access.
    #[error("metadata for token {token_id} on {registry} unavailable")]
    MetadataUnavailable {
        /// The registry the token belongs to.
        registry: Registry,
        /// The affected token.
        token_id: u64,
        /// The underlying store failure.
        #[source]
        source: ContentStoreError,
    },

    /// The metadata document for one entity exists but cannot be parsed.
    #[error("metadata for token {token_id} on {registry} is invalid")]
    MetadataInvalid {
        /// The registry the token belongs to.
        registry: Registry,
        /// The affected token.
        token_id: u64,
        /// The underlying codec failure.
        #[source]
        source: MetadataError,
    },
}
