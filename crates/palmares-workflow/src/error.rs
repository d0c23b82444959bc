//! Workflow error taxonomy.

use palmares_core::error::{ContentStoreError, LedgerError};
use palmares_core::ledger::Registry;
use palmares_projection::error::ProjectionError;
use thiserror::Error;

/// Errors raised by the write-side workflows.
///
/// Every variant aborts only the failing step; the caller's progress value
/// keeps the completed steps so a retry resumes where it stopped.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The draft failed local validation; nothing was published or sent.
    #[error("invalid draft: {0}")]
    InvalidDraft(String),

    /// Publishing to the content store failed.
    #[error(transparent)]
    ContentStore(#[from] ContentStoreError),

    /// A ledger submission or confirmation failed at the transport level.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Reading the projection failed while preparing the step.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// The transaction was included but the ledger reverted it.
    #[error("{method} on {registry} reverted (reason: {reason:?})")]
    Reverted {
        /// The registry written to.
        registry: Registry,
        /// The method invoked.
        method: String,
        /// Revert reason reported by the ledger, when available.
        reason: Option<String>,
    },

    /// The transaction succeeded but its receipt carries no usable copy of
    /// the event the workflow needs to learn the assigned id.
    #[error("receipt of {method} carries no usable {event_name} event")]
    ExpectedEventMissing {
        /// The method whose receipt was inspected.
        method: String,
        /// The event the receipt was expected to carry.
        event_name: String,
    },

    /// The competition is not present in the projection.
    #[error("unknown competition {0}")]
    UnknownCompetition(u64),

    /// Winner designation was refused locally, before any transaction.
    #[error("winner designation on competition {competition_id} refused: {detail}")]
    PrematureWinnerDesignation {
        /// The competition.
        competition_id: u64,
        /// Which precondition failed.
        detail: String,
    },

    /// The ledger reports a different winner than the one already projected.
    #[error("competition {competition_id} already has a different winner")]
    WinnerConflict {
        /// The competition.
        competition_id: u64,
    },

    /// Some ids of a batch failed; the listed ids may be retried alone.
    #[error("{operation} failed for ids {failed:?}")]
    PartialBatchFailure {
        /// The batch operation that partially failed.
        operation: &'static str,
        /// Exactly the ids whose transactions did not take effect.
        failed: Vec<u64>,
    },
}
