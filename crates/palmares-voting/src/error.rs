//! Voting error taxonomy.

use palmares_core::error::LedgerError;
use palmares_projection::error::ProjectionError;
use thiserror::Error;

/// Errors raised when casting a vote.
#[derive(Debug, Error)]
pub enum VoteError {
    /// The competition is not present in the projection.
    #[error("unknown competition {0}")]
    UnknownCompetition(u64),

    /// The jury member already has a recorded vote on this competition.
    #[error("jury {jury_id} already voted on competition {competition_id}")]
    AlreadyVoted {
        /// The competition.
        competition_id: u64,
        /// The jury member.
        jury_id: u64,
    },

    /// The jury member is not assigned to this competition.
    #[error("jury {jury_id} is not assigned to competition {competition_id}")]
    NotEligible {
        /// The competition.
        competition_id: u64,
        /// The jury member.
        jury_id: u64,
    },

    /// The competition is outside its voting window.
    #[error("competition {0} is not accepting votes")]
    CompetitionClosed(u64),

    /// The chosen nominee is not part of this competition.
    #[error("nominee {nominee_local_id} is not part of competition {competition_id}")]
    UnknownNominee {
        /// The competition.
        competition_id: u64,
        /// The chosen nominee's competition-scoped id.
        nominee_local_id: u64,
    },

    /// The ledger rejected the vote for a reason with no typed mapping.
    #[error("vote rejected by the ledger (reason: {reason:?})")]
    Rejected {
        /// Revert reason reported by the ledger, when available.
        reason: Option<String>,
    },

    /// The submission failed at the transport level.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Reading the projection failed.
    #[error(transparent)]
    Projection(#[from] ProjectionError),
}
