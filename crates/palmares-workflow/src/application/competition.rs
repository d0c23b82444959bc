//! Competition lifecycle orchestration.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use palmares_core::clock::Clock;
use palmares_core::content::{ContentId, ContentStore};
use palmares_core::ledger::{LedgerClient, Registry};
use palmares_metadata::codec::{self, CompetitionFields};
use palmares_projection::application::projector::EventProjector;
use palmares_projection::domain::entities::{Competition, NomineeRef, Winner};
use palmares_projection::domain::events::{
    EVENT_COMPETITION_REGISTERED, EVENT_NOMINEE_REGISTERED, EVENT_WINNER_DESIGNATED,
};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::support::{event_id, publish_once, required_event, submit_and_wait};
use crate::domain::draft::CompetitionDraft;
use crate::error::WorkflowError;

const METHOD_ADD_COMPETITION: &str = "addCompetition";
const METHOD_ADD_NOMINEE: &str = "addNomineeToCompetition";
const METHOD_ADD_JURY: &str = "addJuryToCompetition";
const METHOD_DESIGNATE_WINNER: &str = "designateWinner";

/// Completed steps of one `create_competition` attempt.
///
/// A retried call with the same progress value resumes at the first
/// incomplete step instead of re-publishing or re-submitting.
#[derive(Debug, Clone, Default)]
pub struct CreateProgress {
    /// Published trophy picture, once step one completed.
    pub picture: Option<ContentId>,
    /// Published metadata document, once step two completed.
    pub document: Option<ContentId>,
    /// The ledger-assigned id, once registration confirmed.
    pub competition_id: Option<u64>,
}

/// Orchestrates competition registration, nominee and jury attachment, and
/// winner designation.
pub struct CompetitionWorkflow {
    ledger: Arc<dyn LedgerClient>,
    content: Arc<dyn ContentStore>,
    clock: Arc<dyn Clock>,
    projector: Arc<Mutex<EventProjector>>,
}

impl CompetitionWorkflow {
    /// Creates the workflow over the shared ports and projection.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        content: Arc<dyn ContentStore>,
        clock: Arc<dyn Clock>,
        projector: Arc<Mutex<EventProjector>>,
    ) -> Self {
        Self {
            ledger,
            content,
            clock,
            projector,
        }
    }

    /// Registers a new competition from a validated draft.
    ///
    /// Steps: publish the trophy picture, publish the metadata document,
    /// submit the registration, extract the assigned id from the receipt's
    /// registration event, then update the projection optimistically.
    ///
    /// # Errors
    ///
    /// Returns the failing step's error; `progress` keeps the completed
    /// steps so the call can be retried with the same value.
    pub async fn create_competition(
        &self,
        draft: &CompetitionDraft,
        progress: &mut CreateProgress,
    ) -> Result<u64, WorkflowError> {
        if let Some(competition_id) = progress.competition_id {
            return Ok(competition_id);
        }
        draft.validate()?;
        let correlation_id = Uuid::new_v4();
        info!(%correlation_id, title = %draft.title, "creating competition");

        let picture = publish_once(
            self.content.as_ref(),
            &mut progress.picture,
            draft.picture.clone(),
        )
        .await?;
        let document = codec::competition_document(&CompetitionFields {
            award_name: draft.award_name.clone(),
            picture: picture.clone(),
        });
        let document_id = publish_once(
            self.content.as_ref(),
            &mut progress.document,
            document.to_bytes(),
        )
        .await?;

        let receipt = submit_and_wait(
            self.ledger.as_ref(),
            Registry::Competitions,
            METHOD_ADD_COMPETITION,
            vec![
                json!(draft.title),
                json!(document_id.as_str()),
                json!(draft.category.code()),
                json!(draft.start_time.timestamp()),
                json!(draft.end_time.timestamp()),
            ],
        )
        .await?;
        let event = required_event(&receipt, METHOD_ADD_COMPETITION, EVENT_COMPETITION_REGISTERED)?;
        let competition_id = event_id(event, 0, METHOD_ADD_COMPETITION)?;

        self.projector.lock().await.upsert_competition(Competition {
            id: competition_id,
            title: draft.title.clone(),
            award_name: draft.award_name.clone(),
            picture,
            category: draft.category,
            start_time: draft.start_time,
            end_time: draft.end_time,
            nominees: Vec::new(),
            juries: BTreeSet::new(),
            votes: BTreeMap::new(),
            winner: None,
        });
        progress.competition_id = Some(competition_id);
        info!(%correlation_id, competition_id, "competition registered");
        Ok(competition_id)
    }

    /// Attaches nominees to a competition, one transaction per token.
    ///
    /// Tokens already attached are skipped. Tokens the projection does not
    /// know under the competition's category are refused locally. Individual
    /// failures do not stop the batch.
    ///
    /// # Errors
    ///
    /// Returns `PartialBatchFailure` naming exactly the token ids that did
    /// not take effect; retrying with those ids resubmits nothing else.
    pub async fn add_nominees(
        &self,
        competition_id: u64,
        token_ids: &[u64],
    ) -> Result<(), WorkflowError> {
        let competition = self.known_competition(competition_id).await?;
        let mut failed = Vec::new();

        for &token_id in token_ids {
            if competition
                .nominees
                .iter()
                .any(|nominee| nominee.token_id == token_id)
            {
                continue;
            }
            if !self
                .projector
                .lock()
                .await
                .knows_token(competition.category, token_id)
            {
                warn!(
                    competition_id,
                    token_id, "token not known under the competition category, refused locally"
                );
                failed.push(token_id);
                continue;
            }
            let outcome = submit_and_wait(
                self.ledger.as_ref(),
                Registry::Competitions,
                METHOD_ADD_NOMINEE,
                vec![json!(competition_id), json!(token_id)],
            )
            .await
            .and_then(|receipt| {
                let event = required_event(&receipt, METHOD_ADD_NOMINEE, EVENT_NOMINEE_REGISTERED)?;
                event_id(event, 1, METHOD_ADD_NOMINEE)
            });
            match outcome {
                Ok(nominee_id) => {
                    self.projector.lock().await.merge_nominee(
                        competition_id,
                        NomineeRef {
                            local_id: nominee_id,
                            token_id,
                        },
                    );
                }
                Err(error) => {
                    warn!(competition_id, token_id, %error, "nominee attachment failed");
                    failed.push(token_id);
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(WorkflowError::PartialBatchFailure {
                operation: "add_nominees",
                failed,
            })
        }
    }

    /// Assigns jury members to a competition, one transaction per member.
    ///
    /// Members already assigned are skipped (jury assignment is idempotent).
    /// Ids the projection does not know as jury members are refused locally.
    ///
    /// # Errors
    ///
    /// Returns `PartialBatchFailure` naming exactly the jury ids that did
    /// not take effect.
    pub async fn assign_juries(
        &self,
        competition_id: u64,
        jury_ids: &[u64],
    ) -> Result<(), WorkflowError> {
        let competition = self.known_competition(competition_id).await?;
        let mut failed = Vec::new();

        for &jury_id in jury_ids {
            if competition.juries.contains(&jury_id) {
                continue;
            }
            if !self.projector.lock().await.knows_jury_member(jury_id) {
                warn!(competition_id, jury_id, "unknown jury member, refused locally");
                failed.push(jury_id);
                continue;
            }
            let outcome = submit_and_wait(
                self.ledger.as_ref(),
                Registry::Competitions,
                METHOD_ADD_JURY,
                vec![json!(competition_id), json!(jury_id)],
            )
            .await;
            match outcome {
                Ok(_) => {
                    self.projector
                        .lock()
                        .await
                        .merge_jury(competition_id, jury_id);
                }
                Err(error) => {
                    warn!(competition_id, jury_id, %error, "jury assignment failed");
                    failed.push(jury_id);
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(WorkflowError::PartialBatchFailure {
                operation: "assign_juries",
                failed,
            })
        }
    }

    /// Designates the winner of a closed competition.
    ///
    /// Refused locally, with no transaction, while the voting window is
    /// still open or no vote was recorded. An already-decided competition is
    /// a no-op success returning the known winner.
    ///
    /// # Errors
    ///
    /// Returns `PrematureWinnerDesignation` on a failed precondition,
    /// `WinnerConflict` when the ledger reports a different winner than the
    /// one already projected, and the transport errors of the submission.
    pub async fn designate_winner(&self, competition_id: u64) -> Result<Winner, WorkflowError> {
        let competition = self.known_competition(competition_id).await?;
        if let Some(winner) = competition.winner {
            return Ok(winner);
        }
        let now = self.clock.now();
        if now <= competition.end_time {
            return Err(WorkflowError::PrematureWinnerDesignation {
                competition_id,
                detail: "voting window still open".to_owned(),
            });
        }
        if competition.votes.is_empty() {
            return Err(WorkflowError::PrematureWinnerDesignation {
                competition_id,
                detail: "no vote recorded".to_owned(),
            });
        }

        let receipt = submit_and_wait(
            self.ledger.as_ref(),
            Registry::Competitions,
            METHOD_DESIGNATE_WINNER,
            vec![json!(competition_id)],
        )
        .await?;
        let event = required_event(&receipt, METHOD_DESIGNATE_WINNER, EVENT_WINNER_DESIGNATED)?;
        let winner = Winner {
            token_id: event_id(event, 1, METHOD_DESIGNATE_WINNER)?,
            local_id: event_id(event, 2, METHOD_DESIGNATE_WINNER)?,
        };

        let mut projector = self.projector.lock().await;
        if !projector.merge_winner(competition_id, winner)
            && projector
                .competition(competition_id)
                .and_then(|competition| competition.winner)
                != Some(winner)
        {
            return Err(WorkflowError::WinnerConflict { competition_id });
        }
        info!(competition_id, winner_token_id = winner.token_id, "winner designated");
        Ok(winner)
    }

    async fn known_competition(&self, competition_id: u64) -> Result<Competition, WorkflowError> {
        let mut projector = self.projector.lock().await;
        projector
            .load_competition(competition_id)
            .await?
            .ok_or(WorkflowError::UnknownCompetition(competition_id))
    }
}
