//! Registration (minting) workflows for people, movies and jury members.
//!
//! Same shape for every kind: publish the picture, publish the metadata
//! document, submit the mint, extract the token id from the receipt's mint
//! event, update the projection optimistically.

use std::sync::Arc;

use palmares_core::content::{ContentId, ContentStore};
use palmares_core::ledger::{LedgerClient, Registry};
use palmares_metadata::codec::{self, MovieFields, PersonFields};
use palmares_projection::application::projector::EventProjector;
use palmares_projection::domain::entities::{JuryMember, Movie, PeopleKind, Person};
use palmares_projection::domain::events::{
    EVENT_ACTOR_MINTED, EVENT_DIRECTOR_MINTED, EVENT_JURY_MINTED, EVENT_MOVIE_MINTED,
};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::application::support::{event_id, publish_once, required_event, submit_and_wait};
use crate::domain::draft::{JuryDraft, MovieDraft, PersonDraft};
use crate::error::WorkflowError;

const METHOD_MINT: &str = "mint";

/// Completed steps of one registration attempt, reusable across retries.
#[derive(Debug, Clone, Default)]
pub struct MintProgress {
    /// Published picture, once step one completed.
    pub picture: Option<ContentId>,
    /// Published metadata document, once step two completed.
    pub document: Option<ContentId>,
    /// The ledger-assigned token id, once the mint confirmed.
    pub token_id: Option<u64>,
}

/// Mints registry tokens from validated drafts.
pub struct MintingWorkflow {
    ledger: Arc<dyn LedgerClient>,
    content: Arc<dyn ContentStore>,
    projector: Arc<Mutex<EventProjector>>,
}

impl MintingWorkflow {
    /// Creates the workflow over the shared ports and projection.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        content: Arc<dyn ContentStore>,
        projector: Arc<Mutex<EventProjector>>,
    ) -> Self {
        Self {
            ledger,
            content,
            projector,
        }
    }

    /// Mints an actor or director token.
    ///
    /// # Errors
    ///
    /// Returns the failing step's error; `progress` keeps the completed
    /// steps for a retry.
    pub async fn register_person(
        &self,
        draft: &PersonDraft,
        progress: &mut MintProgress,
    ) -> Result<u64, WorkflowError> {
        if let Some(token_id) = progress.token_id {
            return Ok(token_id);
        }
        draft.validate()?;
        let registry = draft.kind.registry();
        let correlation_id = Uuid::new_v4();
        info!(%correlation_id, %registry, "minting person token");

        let picture = publish_once(
            self.content.as_ref(),
            &mut progress.picture,
            draft.picture.clone(),
        )
        .await?;
        let fields = PersonFields {
            firstname: draft.firstname.clone(),
            lastname: draft.lastname.clone(),
            picture: picture.clone(),
            wallet: draft.wallet.clone(),
        };
        let document_id = publish_once(
            self.content.as_ref(),
            &mut progress.document,
            codec::person_document(&fields).to_bytes(),
        )
        .await?;

        let receipt = submit_and_wait(
            self.ledger.as_ref(),
            registry,
            METHOD_MINT,
            vec![json!(document_id.as_str())],
        )
        .await?;
        let event_name = match draft.kind {
            PeopleKind::Actor => EVENT_ACTOR_MINTED,
            PeopleKind::Director => EVENT_DIRECTOR_MINTED,
        };
        let event = required_event(&receipt, METHOD_MINT, event_name)?;
        let token_id = event_id(event, 0, METHOD_MINT)?;

        let person = Person {
            id: token_id,
            firstname: fields.firstname,
            lastname: fields.lastname,
            picture: fields.picture,
            wallet: fields.wallet,
        };
        {
            let mut projector = self.projector.lock().await;
            match draft.kind {
                PeopleKind::Actor => projector.upsert_actor(person),
                PeopleKind::Director => projector.upsert_director(person),
            }
        }
        progress.token_id = Some(token_id);
        info!(%correlation_id, token_id, "person token minted");
        Ok(token_id)
    }

    /// Mints a movie token.
    ///
    /// # Errors
    ///
    /// Returns the failing step's error; `progress` keeps the completed
    /// steps for a retry.
    pub async fn register_movie(
        &self,
        draft: &MovieDraft,
        progress: &mut MintProgress,
    ) -> Result<u64, WorkflowError> {
        if let Some(token_id) = progress.token_id {
            return Ok(token_id);
        }
        draft.validate()?;
        let correlation_id = Uuid::new_v4();
        info!(%correlation_id, title = %draft.title, "minting movie token");

        let picture = publish_once(
            self.content.as_ref(),
            &mut progress.picture,
            draft.picture.clone(),
        )
        .await?;
        let fields = MovieFields {
            title: draft.title.clone(),
            description: draft.description.clone(),
            picture: picture.clone(),
            director_id: draft.director_id,
        };
        let document_id = publish_once(
            self.content.as_ref(),
            &mut progress.document,
            codec::movie_document(&fields).to_bytes(),
        )
        .await?;

        let receipt = submit_and_wait(
            self.ledger.as_ref(),
            Registry::Movies,
            METHOD_MINT,
            vec![json!(document_id.as_str())],
        )
        .await?;
        let event = required_event(&receipt, METHOD_MINT, EVENT_MOVIE_MINTED)?;
        let token_id = event_id(event, 0, METHOD_MINT)?;

        self.projector.lock().await.upsert_movie(Movie {
            id: token_id,
            title: fields.title,
            description: fields.description,
            picture: fields.picture,
            director_id: fields.director_id,
        });
        progress.token_id = Some(token_id);
        info!(%correlation_id, token_id, "movie token minted");
        Ok(token_id)
    }

    /// Mints a jury membership token for the draft's wallet.
    ///
    /// # Errors
    ///
    /// Returns the failing step's error; `progress` keeps the completed
    /// steps for a retry.
    pub async fn register_jury(
        &self,
        draft: &JuryDraft,
        progress: &mut MintProgress,
    ) -> Result<u64, WorkflowError> {
        if let Some(token_id) = progress.token_id {
            return Ok(token_id);
        }
        draft.validate()?;
        let correlation_id = Uuid::new_v4();
        info!(%correlation_id, wallet = %draft.wallet, "minting jury token");

        let picture = publish_once(
            self.content.as_ref(),
            &mut progress.picture,
            draft.picture.clone(),
        )
        .await?;
        let fields = PersonFields {
            firstname: draft.firstname.clone(),
            lastname: draft.lastname.clone(),
            picture: picture.clone(),
            wallet: draft.wallet.clone(),
        };
        let document_id = publish_once(
            self.content.as_ref(),
            &mut progress.document,
            codec::jury_document(&fields).to_bytes(),
        )
        .await?;

        let receipt = submit_and_wait(
            self.ledger.as_ref(),
            Registry::Juries,
            METHOD_MINT,
            vec![json!(draft.wallet.as_str()), json!(document_id.as_str())],
        )
        .await?;
        let event = required_event(&receipt, METHOD_MINT, EVENT_JURY_MINTED)?;
        // JuryMinted carries the wallet first, then the token id.
        let token_id = event_id(event, 1, METHOD_MINT)?;

        self.projector.lock().await.upsert_jury_member(JuryMember {
            id: token_id,
            firstname: fields.firstname,
            lastname: fields.lastname,
            picture: fields.picture,
            wallet: fields.wallet,
        });
        progress.token_id = Some(token_id);
        info!(%correlation_id, token_id, "jury token minted");
        Ok(token_id)
    }
}
