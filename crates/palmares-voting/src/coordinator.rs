//! Vote submission and pending-vote computation.

use std::sync::Arc;

use palmares_core::clock::Clock;
use palmares_core::ledger::{LedgerClient, Registry, TxStatus};
use palmares_projection::application::projector::EventProjector;
use palmares_projection::domain::entities::{Competition, CompetitionPhase};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::VoteError;

const METHOD_VOTE: &str = "voteOnCompetition";

/// Coordinates jury voting over the shared projection.
pub struct VotingCoordinator {
    ledger: Arc<dyn LedgerClient>,
    clock: Arc<dyn Clock>,
    projector: Arc<Mutex<EventProjector>>,
}

impl VotingCoordinator {
    /// Creates the coordinator over the shared ports and projection.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        clock: Arc<dyn Clock>,
        projector: Arc<Mutex<EventProjector>>,
    ) -> Self {
        Self {
            ledger,
            clock,
            projector,
        }
    }

    /// Competitions the given jury member can still vote on: assigned,
    /// currently in their voting window, and without a recorded vote by
    /// this member.
    pub async fn pending_votes(&self, jury_id: u64) -> Vec<Competition> {
        let now = self.clock.now();
        self.projector
            .lock()
            .await
            .competitions()
            .into_iter()
            .filter(|competition| {
                competition.juries.contains(&jury_id)
                    && competition.phase(now) == CompetitionPhase::VotingOpen
                    && !competition.has_voted(jury_id)
            })
            .collect()
    }

    /// Casts a vote for a nominee.
    ///
    /// Obviously doomed votes are refused locally without a transaction.
    /// A ledger rejection is mapped to the matching typed error; on success
    /// the vote is merged into the projection, so the later live echo is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns `CompetitionClosed`, `NotEligible`, `AlreadyVoted` or
    /// `UnknownNominee` from the local pre-checks or the mapped ledger
    /// rejection, `Rejected` for unmapped rejections, and transport errors.
    pub async fn cast_vote(
        &self,
        competition_id: u64,
        jury_id: u64,
        nominee_local_id: u64,
    ) -> Result<(), VoteError> {
        let competition = {
            let mut projector = self.projector.lock().await;
            projector
                .load_competition(competition_id)
                .await?
                .ok_or(VoteError::UnknownCompetition(competition_id))?
        };
        if competition.phase(self.clock.now()) != CompetitionPhase::VotingOpen {
            return Err(VoteError::CompetitionClosed(competition_id));
        }
        if !competition.juries.contains(&jury_id) {
            return Err(VoteError::NotEligible {
                competition_id,
                jury_id,
            });
        }
        if competition.has_voted(jury_id) {
            return Err(VoteError::AlreadyVoted {
                competition_id,
                jury_id,
            });
        }
        if !competition
            .nominees
            .iter()
            .any(|nominee| nominee.local_id == nominee_local_id)
        {
            return Err(VoteError::UnknownNominee {
                competition_id,
                nominee_local_id,
            });
        }

        let handle = self
            .ledger
            .submit(
                Registry::Competitions,
                METHOD_VOTE,
                vec![json!(competition_id), json!(jury_id), json!(nominee_local_id)],
            )
            .await?;
        let receipt = handle.wait().await?;
        if let TxStatus::Reverted { reason } = receipt.status {
            return Err(map_rejection(reason, competition_id, jury_id));
        }

        self.projector
            .lock()
            .await
            .merge_vote(competition_id, jury_id, nominee_local_id);
        info!(competition_id, jury_id, "vote recorded");
        Ok(())
    }
}

/// Maps a revert reason to the matching typed rejection by case-insensitive
/// substring. Unmatched reasons stay opaque in `Rejected`.
fn map_rejection(reason: Option<String>, competition_id: u64, jury_id: u64) -> VoteError {
    let Some(text) = reason else {
        return VoteError::Rejected { reason: None };
    };
    let lowered = text.to_lowercase();
    if lowered.contains("already voted") {
        VoteError::AlreadyVoted {
            competition_id,
            jury_id,
        }
    } else if lowered.contains("not a jury") || lowered.contains("not registered") {
        VoteError::NotEligible {
            competition_id,
            jury_id,
        }
    } else if lowered.contains("closed") || lowered.contains("ended") || lowered.contains("not open")
    {
        VoteError::CompetitionClosed(competition_id)
    } else {
        VoteError::Rejected { reason: Some(text) }
    }
}
