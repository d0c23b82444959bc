//! Transport-level error types for the external collaborator ports.

use thiserror::Error;

use crate::content::ContentId;
use crate::ledger::Registry;

/// Errors raised by the ledger port.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A historical event query failed.
    #[error("event query {event_name} on {registry} failed: {reason}")]
    Query {
        /// The registry queried.
        registry: Registry,
        /// The event name queried.
        event_name: String,
        /// Transport-level failure description.
        reason: String,
    },

    /// A read-only call failed.
    #[error("call {method} on {registry} failed: {reason}")]
    Call {
        /// The registry called.
        registry: Registry,
        /// The method invoked.
        method: String,
        /// Transport-level failure description.
        reason: String,
    },

    /// A transaction could not be submitted or confirmed.
    #[error("submission of {method} on {registry} failed: {reason}")]
    Submit {
        /// The registry written to.
        registry: Registry,
        /// The method invoked.
        method: String,
        /// Transport-level failure description.
        reason: String,
    },

    /// A live subscription could not be established or torn down.
    #[error("subscription to {event_name} on {registry} failed: {reason}")]
    Subscribe {
        /// The registry subscribed to.
        registry: Registry,
        /// The event name subscribed to.
        event_name: String,
        /// Transport-level failure description.
        reason: String,
    },

    /// A read call returned a value of an unexpected shape.
    #[error("call {method} returned an unexpected value: {detail}")]
    UnexpectedValue {
        /// The method whose result could not be decoded.
        method: String,
        /// What was wrong with the value.
        detail: String,
    },
}

/// Errors raised by the content store port.
#[derive(Debug, Error)]
pub enum ContentStoreError {
    /// The store could not be reached; the read may be retried later.
    #[error("content store unavailable: {0}")]
    Unavailable(String),

    /// The identifier resolved to no content.
    #[error("content not found: {0}")]
    NotFound(ContentId),
}
