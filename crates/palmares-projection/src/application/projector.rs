//! The event projector.
//!
//! Turns raw ledger events plus synchronous reads into typed entities.
//! Merges are upsert-by-id and idempotent, so duplicate delivery across the
//! historical/live overlap window or an optimistic local update followed by
//! its echo leaves the state unchanged. A content-store failure defers only
//! the affected entity; deferred entities are retried lazily on access.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use palmares_core::content::{ContentId, ContentStore};
use palmares_core::error::LedgerError;
use palmares_core::ledger::{EventFilter, LedgerClient, RawEvent, Registry};
use palmares_metadata::codec::{self, PersonFields};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::application::subscriptions::SubscriptionManager;
use crate::domain::entities::{
    Category, Competition, JuryMember, Movie, NomineeRef, PeopleKind, Person, Winner,
};
use crate::domain::events::{self, DecodedEvent};
use crate::error::ProjectionError;

#[derive(Debug, Clone)]
struct CompetitionMeta {
    title: String,
    award_name: String,
    picture: ContentId,
    category: Category,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

/// Internal competition record. Composite events may arrive while the
/// metadata half is still deferred, so the sets live apart from the meta.
#[derive(Debug, Clone, Default)]
struct CompetitionRecord {
    meta: Option<CompetitionMeta>,
    nominees: Vec<NomineeRef>,
    juries: BTreeSet<u64>,
    votes: BTreeMap<u64, u64>,
    winner: Option<Winner>,
}

impl CompetitionRecord {
    fn add_nominee(&mut self, nominee: NomineeRef) -> bool {
        if self
            .nominees
            .iter()
            .any(|existing| existing.local_id == nominee.local_id)
        {
            return false;
        }
        self.nominees.push(nominee);
        true
    }

    fn add_jury(&mut self, jury_id: u64) -> bool {
        self.juries.insert(jury_id)
    }

    fn record_vote(&mut self, jury_id: u64, nominee_local_id: u64) -> bool {
        if self.votes.contains_key(&jury_id) {
            return false;
        }
        self.votes.insert(jury_id, nominee_local_id);
        true
    }

    fn assemble(&self, id: u64) -> Option<Competition> {
        let meta = self.meta.as_ref()?;
        Some(Competition {
            id,
            title: meta.title.clone(),
            award_name: meta.award_name.clone(),
            picture: meta.picture.clone(),
            category: meta.category,
            start_time: meta.start_time,
            end_time: meta.end_time,
            nominees: self.nominees.clone(),
            juries: self.juries.clone(),
            votes: self.votes.clone(),
            winner: self.winner,
        })
    }
}

/// Projects ledger events into the in-memory read models.
///
/// The projector is the only writer of the projection collections; workflows
/// apply optimistic updates through the same `merge_*`/`upsert_*` entry
/// points the event path uses, which keeps every write idempotent.
pub struct EventProjector {
    ledger: Arc<dyn LedgerClient>,
    content: Arc<dyn ContentStore>,
    actors: BTreeMap<u64, Person>,
    directors: BTreeMap<u64, Person>,
    movies: BTreeMap<u64, Movie>,
    jury_members: BTreeMap<u64, JuryMember>,
    competitions: BTreeMap<u64, CompetitionRecord>,
    deferred_tokens: BTreeMap<(Registry, u64), String>,
    deferred_competitions: BTreeSet<u64>,
}

impl EventProjector {
    /// Creates an empty projector over the given ports.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerClient>, content: Arc<dyn ContentStore>) -> Self {
        Self {
            ledger,
            content,
            actors: BTreeMap::new(),
            directors: BTreeMap::new(),
            movies: BTreeMap::new(),
            jury_members: BTreeMap::new(),
            competitions: BTreeMap::new(),
            deferred_tokens: BTreeMap::new(),
            deferred_competitions: BTreeSet::new(),
        }
    }

    /// Decodes and applies one raw event.
    ///
    /// # Errors
    ///
    /// Returns `MalformedEvent` for unknown shapes, `MetadataUnavailable` /
    /// `MetadataInvalid` when an entity cannot be materialized, and
    /// `LedgerError` when a synchronous read fails. All of these are
    /// per-event; the stream drivers log and continue.
    pub async fn project(&mut self, raw: &RawEvent) -> Result<(), ProjectionError> {
        match events::decode(raw)? {
            DecodedEvent::PersonMinted {
                kind,
                token_id,
                token_uri,
            } => self.materialize_person(kind, token_id, &token_uri).await,
            DecodedEvent::MovieMinted {
                token_id,
                token_uri,
            } => self.materialize_movie(token_id, &token_uri).await,
            DecodedEvent::JuryMinted {
                token_id,
                token_uri,
                ..
            } => self.materialize_jury_member(token_id, &token_uri).await,
            DecodedEvent::CompetitionRegistered { competition_id } => {
                self.materialize_competition(competition_id).await
            }
            DecodedEvent::NomineeRegistered {
                competition_id,
                nominee_id,
                token_id,
            } => {
                self.merge_nominee(
                    competition_id,
                    NomineeRef {
                        local_id: nominee_id,
                        token_id,
                    },
                );
                Ok(())
            }
            DecodedEvent::JuryAssigned {
                competition_id,
                jury_id,
            } => {
                self.merge_jury(competition_id, jury_id);
                Ok(())
            }
            DecodedEvent::VoteCast {
                competition_id,
                jury_id,
                nominee_id,
            } => {
                self.merge_vote(competition_id, jury_id, nominee_id);
                Ok(())
            }
            DecodedEvent::WinnerDesignated {
                competition_id,
                nominee_token_id,
                nominee_id,
                ..
            } => {
                self.merge_winner(
                    competition_id,
                    Winner {
                        token_id: nominee_token_id,
                        local_id: nominee_id,
                    },
                );
                Ok(())
            }
        }
    }

    /// Replays the full history of a registry, one known event name at a
    /// time, creation events first. Per-event failures are logged and
    /// dropped; only the queries themselves can fail the replay.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` when a historical query fails.
    pub async fn replay_history(&mut self, registry: Registry) -> Result<(), ProjectionError> {
        for event_name in events::known_events(registry) {
            let raws = self
                .ledger
                .query_events(registry, event_name, &EventFilter::any(), 0)
                .await?;
            for raw in &raws {
                self.project_isolated(raw).await;
            }
        }
        Ok(())
    }

    /// Attaches live subscriptions for every known event of a registry.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` when the ledger refuses a subscription.
    pub async fn attach_live(
        &self,
        manager: &mut SubscriptionManager,
        registry: Registry,
    ) -> Result<(), LedgerError> {
        for event_name in events::known_events(registry) {
            manager.attach(registry, event_name).await?;
        }
        Ok(())
    }

    /// Applies every buffered live event. Per-event failures are logged and
    /// dropped.
    pub async fn pump(&mut self, manager: &mut SubscriptionManager) {
        for raw in manager.drain() {
            self.project_isolated(&raw).await;
        }
    }

    /// Brings a registry's projection up to date: subscribe first so that
    /// events raced during the replay buffer in the subscription channel,
    /// replay history, then drain the buffer. Duplicates across the overlap
    /// window are absorbed by the idempotent merges.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` when subscribing or querying fails.
    pub async fn sync(
        &mut self,
        manager: &mut SubscriptionManager,
        registry: Registry,
    ) -> Result<(), ProjectionError> {
        self.attach_live(manager, registry).await?;
        self.replay_history(registry).await?;
        self.pump(manager).await;
        Ok(())
    }

    async fn project_isolated(&mut self, raw: &RawEvent) {
        if let Err(error) = self.project(raw).await {
            warn!(
                registry = %raw.registry,
                event = %raw.name,
                %error,
                "event dropped from projection"
            );
        }
    }

    // ---- read accessors -------------------------------------------------

    /// All materialized actors.
    #[must_use]
    pub fn actors(&self) -> Vec<Person> {
        self.actors.values().cloned().collect()
    }

    /// All materialized directors.
    #[must_use]
    pub fn directors(&self) -> Vec<Person> {
        self.directors.values().cloned().collect()
    }

    /// All materialized movies.
    #[must_use]
    pub fn movies(&self) -> Vec<Movie> {
        self.movies.values().cloned().collect()
    }

    /// All materialized jury members.
    #[must_use]
    pub fn jury_members(&self) -> Vec<JuryMember> {
        self.jury_members.values().cloned().collect()
    }

    /// All materialized competitions.
    #[must_use]
    pub fn competitions(&self) -> Vec<Competition> {
        self.competitions
            .iter()
            .filter_map(|(id, record)| record.assemble(*id))
            .collect()
    }

    /// One materialized competition.
    #[must_use]
    pub fn competition(&self, competition_id: u64) -> Option<Competition> {
        self.competitions
            .get(&competition_id)
            .and_then(|record| record.assemble(competition_id))
    }

    /// Returns whether a person token of the given kind is known.
    #[must_use]
    pub fn knows_token(&self, category: Category, token_id: u64) -> bool {
        match category {
            Category::Actor => self.actors.contains_key(&token_id),
            Category::Director => self.directors.contains_key(&token_id),
            Category::Movie => self.movies.contains_key(&token_id),
        }
    }

    /// Returns whether a jury membership token is known.
    #[must_use]
    pub fn knows_jury_member(&self, jury_id: u64) -> bool {
        self.jury_members.contains_key(&jury_id)
    }

    // ---- lazy loads (retry deferred metadata on access) -----------------

    /// Loads one actor, retrying a deferred metadata fetch if needed.
    ///
    /// # Errors
    ///
    /// Returns the materialization failure when the retry fails again.
    pub async fn load_actor(&mut self, token_id: u64) -> Result<Option<Person>, ProjectionError> {
        if let Some(person) = self.actors.get(&token_id) {
            return Ok(Some(person.clone()));
        }
        let key = (Registry::Actors, token_id);
        let Some(uri) = self.deferred_tokens.get(&key).cloned() else {
            return Ok(None);
        };
        self.materialize_person(PeopleKind::Actor, token_id, &uri)
            .await?;
        Ok(self.actors.get(&token_id).cloned())
    }

    /// Loads one director, retrying a deferred metadata fetch if needed.
    ///
    /// # Errors
    ///
    /// Returns the materialization failure when the retry fails again.
    pub async fn load_director(
        &mut self,
        token_id: u64,
    ) -> Result<Option<Person>, ProjectionError> {
        if let Some(person) = self.directors.get(&token_id) {
            return Ok(Some(person.clone()));
        }
        let key = (Registry::Directors, token_id);
        let Some(uri) = self.deferred_tokens.get(&key).cloned() else {
            return Ok(None);
        };
        self.materialize_person(PeopleKind::Director, token_id, &uri)
            .await?;
        Ok(self.directors.get(&token_id).cloned())
    }

    /// Loads one movie, retrying a deferred metadata fetch if needed.
    ///
    /// # Errors
    ///
    /// Returns the materialization failure when the retry fails again.
    pub async fn load_movie(&mut self, token_id: u64) -> Result<Option<Movie>, ProjectionError> {
        if let Some(movie) = self.movies.get(&token_id) {
            return Ok(Some(movie.clone()));
        }
        let key = (Registry::Movies, token_id);
        let Some(uri) = self.deferred_tokens.get(&key).cloned() else {
            return Ok(None);
        };
        self.materialize_movie(token_id, &uri).await?;
        Ok(self.movies.get(&token_id).cloned())
    }

    /// Loads one jury member, retrying a deferred metadata fetch if needed.
    ///
    /// # Errors
    ///
    /// Returns the materialization failure when the retry fails again.
    pub async fn load_jury_member(
        &mut self,
        token_id: u64,
    ) -> Result<Option<JuryMember>, ProjectionError> {
        if let Some(member) = self.jury_members.get(&token_id) {
            return Ok(Some(member.clone()));
        }
        let key = (Registry::Juries, token_id);
        let Some(uri) = self.deferred_tokens.get(&key).cloned() else {
            return Ok(None);
        };
        self.materialize_jury_member(token_id, &uri).await?;
        Ok(self.jury_members.get(&token_id).cloned())
    }

    /// Loads one competition, retrying deferred materialization if needed.
    ///
    /// # Errors
    ///
    /// Returns the materialization failure when the retry fails again.
    pub async fn load_competition(
        &mut self,
        competition_id: u64,
    ) -> Result<Option<Competition>, ProjectionError> {
        if let Some(competition) = self.competition(competition_id) {
            return Ok(Some(competition));
        }
        if !self.competitions.contains_key(&competition_id) {
            return Ok(None);
        }
        self.materialize_competition(competition_id).await?;
        Ok(self.competition(competition_id))
    }

    // ---- idempotent merges (event path and optimistic path) -------------

    /// Records an actor; a no-op when the id is already known.
    pub fn upsert_actor(&mut self, person: Person) {
        self.deferred_tokens.remove(&(Registry::Actors, person.id));
        self.actors.entry(person.id).or_insert(person);
    }

    /// Records a director; a no-op when the id is already known.
    pub fn upsert_director(&mut self, person: Person) {
        self.deferred_tokens
            .remove(&(Registry::Directors, person.id));
        self.directors.entry(person.id).or_insert(person);
    }

    /// Records a movie; a no-op when the id is already known.
    pub fn upsert_movie(&mut self, movie: Movie) {
        self.deferred_tokens.remove(&(Registry::Movies, movie.id));
        self.movies.entry(movie.id).or_insert(movie);
    }

    /// Records a jury member; a no-op when the id is already known.
    pub fn upsert_jury_member(&mut self, member: JuryMember) {
        self.deferred_tokens.remove(&(Registry::Juries, member.id));
        self.jury_members.entry(member.id).or_insert(member);
    }

    /// Records a competition and merges its sets; metadata of an already
    /// materialized competition is left untouched.
    pub fn upsert_competition(&mut self, competition: Competition) {
        self.deferred_competitions.remove(&competition.id);
        let record = self.competitions.entry(competition.id).or_default();
        if record.meta.is_none() {
            record.meta = Some(CompetitionMeta {
                title: competition.title,
                award_name: competition.award_name,
                picture: competition.picture,
                category: competition.category,
                start_time: competition.start_time,
                end_time: competition.end_time,
            });
        }
        for nominee in competition.nominees {
            record.add_nominee(nominee);
        }
        for jury_id in competition.juries {
            record.add_jury(jury_id);
        }
        for (jury_id, nominee_local_id) in competition.votes {
            record.record_vote(jury_id, nominee_local_id);
        }
        if let Some(winner) = competition.winner {
            record.winner.get_or_insert(winner);
        }
    }

    /// Merges a nominee into a competition; a no-op when present.
    /// Returns whether the set changed.
    pub fn merge_nominee(&mut self, competition_id: u64, nominee: NomineeRef) -> bool {
        self.competitions
            .entry(competition_id)
            .or_default()
            .add_nominee(nominee)
    }

    /// Merges a jury assignment into a competition; a no-op when present.
    /// Returns whether the set changed.
    pub fn merge_jury(&mut self, competition_id: u64, jury_id: u64) -> bool {
        self.competitions
            .entry(competition_id)
            .or_default()
            .add_jury(jury_id)
    }

    /// Merges a vote into a competition; a no-op when the jury member
    /// already has a recorded vote. Returns whether the map changed.
    pub fn merge_vote(&mut self, competition_id: u64, jury_id: u64, nominee_local_id: u64) -> bool {
        self.competitions
            .entry(competition_id)
            .or_default()
            .record_vote(jury_id, nominee_local_id)
    }

    /// Merges a winner observation. The first observation wins; a
    /// conflicting later one is ignored with a warning.
    pub fn merge_winner(&mut self, competition_id: u64, winner: Winner) -> bool {
        let record = self.competitions.entry(competition_id).or_default();
        if let Some(existing) = record.winner {
            if existing != winner {
                warn!(competition_id, "conflicting winner observation ignored");
            }
            return false;
        }
        record.winner = Some(winner);
        true
    }

    // ---- materialization ------------------------------------------------

    async fn materialize_person(
        &mut self,
        kind: PeopleKind,
        token_id: u64,
        token_uri: &str,
    ) -> Result<(), ProjectionError> {
        let registry = kind.registry();
        let known = match kind {
            PeopleKind::Actor => self.actors.contains_key(&token_id),
            PeopleKind::Director => self.directors.contains_key(&token_id),
        };
        if known {
            return Ok(());
        }
        match self.fetch_person_fields(registry, token_id, token_uri).await {
            Ok(fields) => {
                self.deferred_tokens.remove(&(registry, token_id));
                let person = Person {
                    id: token_id,
                    firstname: fields.firstname,
                    lastname: fields.lastname,
                    picture: fields.picture,
                    wallet: fields.wallet,
                };
                debug!(%registry, token_id, "materialized person");
                match kind {
                    PeopleKind::Actor => self.actors.insert(token_id, person),
                    PeopleKind::Director => self.directors.insert(token_id, person),
                };
                Ok(())
            }
            Err(error) => {
                self.defer_token(registry, token_id, token_uri, &error);
                Err(error)
            }
        }
    }

    async fn materialize_movie(
        &mut self,
        token_id: u64,
        token_uri: &str,
    ) -> Result<(), ProjectionError> {
        if self.movies.contains_key(&token_id) {
            return Ok(());
        }
        let registry = Registry::Movies;
        let bytes = match self.get_content(registry, token_id, token_uri).await {
            Ok(bytes) => bytes,
            Err(error) => {
                self.defer_token(registry, token_id, token_uri, &error);
                return Err(error);
            }
        };
        let fields =
            codec::parse_movie(&bytes).map_err(|source| ProjectionError::MetadataInvalid {
                registry,
                token_id,
                source,
            })?;
        self.deferred_tokens.remove(&(registry, token_id));
        self.movies.insert(
            token_id,
            Movie {
                id: token_id,
                title: fields.title,
                description: fields.description,
                picture: fields.picture,
                director_id: fields.director_id,
            },
        );
        debug!(token_id, "materialized movie");
        Ok(())
    }

    async fn materialize_jury_member(
        &mut self,
        token_id: u64,
        token_uri: &str,
    ) -> Result<(), ProjectionError> {
        if self.jury_members.contains_key(&token_id) {
            return Ok(());
        }
        let registry = Registry::Juries;
        match self.fetch_person_fields(registry, token_id, token_uri).await {
            Ok(fields) => {
                self.deferred_tokens.remove(&(registry, token_id));
                self.jury_members.insert(
                    token_id,
                    JuryMember {
                        id: token_id,
                        firstname: fields.firstname,
                        lastname: fields.lastname,
                        picture: fields.picture,
                        wallet: fields.wallet,
                    },
                );
                debug!(token_id, "materialized jury member");
                Ok(())
            }
            Err(error) => {
                self.defer_token(registry, token_id, token_uri, &error);
                Err(error)
            }
        }
    }

    async fn materialize_competition(
        &mut self,
        competition_id: u64,
    ) -> Result<(), ProjectionError> {
        self.competitions.entry(competition_id).or_default();
        if self
            .competitions
            .get(&competition_id)
            .is_some_and(|record| record.meta.is_some())
        {
            return Ok(());
        }
        match self.fetch_competition_meta(competition_id).await {
            Ok(meta) => {
                self.deferred_competitions.remove(&competition_id);
                if let Some(record) = self.competitions.get_mut(&competition_id) {
                    record.meta = Some(meta);
                }
                debug!(competition_id, "materialized competition");
                Ok(())
            }
            Err(error) => {
                match error {
                    ProjectionError::MetadataUnavailable { .. } | ProjectionError::Ledger(_) => {
                        self.deferred_competitions.insert(competition_id);
                    }
                    _ => {}
                }
                Err(error)
            }
        }
    }

    async fn fetch_person_fields(
        &self,
        registry: Registry,
        token_id: u64,
        token_uri: &str,
    ) -> Result<PersonFields, ProjectionError> {
        let bytes = self.get_content(registry, token_id, token_uri).await?;
        codec::parse_person(&bytes).map_err(|source| ProjectionError::MetadataInvalid {
            registry,
            token_id,
            source,
        })
    }

    async fn fetch_competition_meta(
        &self,
        competition_id: u64,
    ) -> Result<CompetitionMeta, ProjectionError> {
        let value = self
            .ledger
            .call(
                Registry::Competitions,
                "getCompetition",
                &[json!(competition_id)],
            )
            .await?;
        let title = object_string(&value, "title")?;
        let token_uri = object_string(&value, "tokenURI")?;
        let category_code = object_u64(&value, "typeCompetitions")?;
        let category = Category::from_code(category_code).ok_or_else(|| {
            unexpected_read(format!("unknown category code {category_code}"))
        })?;
        let start_time = object_timestamp(&value, "startTime")?;
        let end_time = object_timestamp(&value, "endTime")?;

        let bytes = self
            .get_content(Registry::Competitions, competition_id, &token_uri)
            .await?;
        let fields = codec::parse_competition(&bytes).map_err(|source| {
            ProjectionError::MetadataInvalid {
                registry: Registry::Competitions,
                token_id: competition_id,
                source,
            }
        })?;
        Ok(CompetitionMeta {
            title,
            award_name: fields.award_name,
            picture: fields.picture,
            category,
            start_time,
            end_time,
        })
    }

    async fn get_content(
        &self,
        registry: Registry,
        token_id: u64,
        token_uri: &str,
    ) -> Result<Vec<u8>, ProjectionError> {
        self.content
            .get(&ContentId::new(token_uri))
            .await
            .map_err(|source| ProjectionError::MetadataUnavailable {
                registry,
                token_id,
                source,
            })
    }

    fn defer_token(
        &mut self,
        registry: Registry,
        token_id: u64,
        token_uri: &str,
        error: &ProjectionError,
    ) {
        if matches!(error, ProjectionError::MetadataUnavailable { .. }) {
            self.deferred_tokens
                .insert((registry, token_id), token_uri.to_owned());
            warn!(%registry, token_id, "deferred entity materialization");
        }
    }
}

fn unexpected_read(detail: String) -> ProjectionError {
    ProjectionError::Ledger(LedgerError::UnexpectedValue {
        method: "getCompetition".to_owned(),
        detail,
    })
}

fn object_field<'a>(value: &'a Value, key: &str) -> Result<&'a Value, ProjectionError> {
    value
        .get(key)
        .ok_or_else(|| unexpected_read(format!("missing field {key}")))
}

fn object_string(value: &Value, key: &str) -> Result<String, ProjectionError> {
    let field = object_field(value, key)?;
    field
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| unexpected_read(format!("field {key} is not a string: {field}")))
}

fn object_u64(value: &Value, key: &str) -> Result<u64, ProjectionError> {
    let field = object_field(value, key)?;
    field
        .as_u64()
        .ok_or_else(|| unexpected_read(format!("field {key} is not an unsigned integer: {field}")))
}

fn object_timestamp(value: &Value, key: &str) -> Result<DateTime<Utc>, ProjectionError> {
    let seconds = object_u64(value, key)?;
    let seconds = i64::try_from(seconds)
        .map_err(|_| unexpected_read(format!("field {key} overflows a timestamp")))?;
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .ok_or_else(|| unexpected_read(format!("field {key} is not a valid timestamp")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use palmares_core::identity::Address;
    use palmares_metadata::codec::{CompetitionFields, competition_document, person_document};
    use palmares_test_support::{FakeLedger, MemoryContentStore};

    const START_TIME: u64 = 1_767_225_600;
    const END_TIME: u64 = 1_767_830_400;

    struct Harness {
        ledger: Arc<FakeLedger>,
        content: Arc<MemoryContentStore>,
        projector: EventProjector,
        manager: SubscriptionManager,
    }

    fn harness() -> Harness {
        let ledger = Arc::new(FakeLedger::new());
        let content = Arc::new(MemoryContentStore::new());
        let projector = EventProjector::new(
            Arc::clone(&ledger) as Arc<dyn LedgerClient>,
            Arc::clone(&content) as Arc<dyn ContentStore>,
        );
        let manager = SubscriptionManager::new(Arc::clone(&ledger) as Arc<dyn LedgerClient>);
        Harness {
            ledger,
            content,
            projector,
            manager,
        }
    }

    async fn seed_actor(harness: &Harness, token_id: u64, firstname: &str) -> String {
        let document = person_document(&PersonFields {
            firstname: firstname.to_owned(),
            lastname: "Deneuve".to_owned(),
            picture: ContentId::new("cas://portrait"),
            wallet: Address::new("0xactor"),
        });
        let uri = harness.content.put(document.to_bytes()).await.unwrap();
        harness.ledger.emit(
            Registry::Actors,
            "ActorMinted",
            vec![json!(token_id), json!(uri.as_str())],
        );
        uri.as_str().to_owned()
    }

    async fn seed_competition(harness: &Harness, competition_id: u64, category_code: u64) {
        let document = competition_document(&CompetitionFields {
            award_name: "Golden Mask".to_owned(),
            picture: ContentId::new("cas://trophy"),
        });
        let uri = harness.content.put(document.to_bytes()).await.unwrap();
        harness.ledger.set_call_result_for(
            Registry::Competitions,
            "getCompetition",
            &[json!(competition_id)],
            json!({
                "title": "Best of 2026",
                "tokenURI": uri.as_str(),
                "typeCompetitions": category_code,
                "startTime": START_TIME,
                "endTime": END_TIME,
            }),
        );
        harness.ledger.emit(
            Registry::Competitions,
            "CompetitionSessionRegistered",
            vec![json!(competition_id)],
        );
    }

    #[tokio::test]
    async fn test_sync_materializes_minted_actor() {
        // Arrange
        let mut harness = harness();
        seed_actor(&harness, 1, "Catherine").await;

        // Act
        harness
            .projector
            .sync(&mut harness.manager, Registry::Actors)
            .await
            .unwrap();

        // Assert
        let actors = harness.projector.actors();
        assert_eq!(actors.len(), 1);
        assert_eq!(actors[0].id, 1);
        assert_eq!(actors[0].firstname, "Catherine");
        assert_eq!(actors[0].wallet, Address::new("0xactor"));
    }

    #[tokio::test]
    async fn test_replaying_the_same_event_twice_is_idempotent() {
        // Arrange
        let mut harness = harness();
        let uri = seed_actor(&harness, 1, "Catherine").await;
        let raw = RawEvent {
            registry: Registry::Actors,
            name: "ActorMinted".to_owned(),
            args: vec![json!(1), json!(uri)],
        };

        // Act
        harness.projector.project(&raw).await.unwrap();
        harness.projector.project(&raw).await.unwrap();

        // Assert
        assert_eq!(harness.projector.actors().len(), 1);
    }

    #[tokio::test]
    async fn test_historical_and_live_duplicate_merges_as_noop() {
        // Arrange: one event in history, then its live duplicate.
        let mut harness = harness();
        let uri = seed_actor(&harness, 1, "Catherine").await;
        harness
            .projector
            .sync(&mut harness.manager, Registry::Actors)
            .await
            .unwrap();

        // Act
        harness.ledger.deliver_live_only(
            Registry::Actors,
            "ActorMinted",
            vec![json!(1), json!(uri)],
        );
        harness.projector.pump(&mut harness.manager).await;

        // Assert
        assert_eq!(harness.projector.actors().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_event_is_dropped_without_blocking_others() {
        // Arrange: a shape-mismatched mint followed by a valid one.
        let mut harness = harness();
        harness
            .ledger
            .emit(Registry::Actors, "ActorMinted", vec![json!(7)]);
        seed_actor(&harness, 1, "Catherine").await;

        // Act
        harness
            .projector
            .sync(&mut harness.manager, Registry::Actors)
            .await
            .unwrap();

        // Assert: the valid event still projected.
        let actors = harness.projector.actors();
        assert_eq!(actors.len(), 1);
        assert_eq!(actors[0].id, 1);
    }

    #[tokio::test]
    async fn test_content_outage_defers_entity_and_lazy_access_retries() {
        // Arrange
        let mut harness = harness();
        seed_actor(&harness, 1, "Catherine").await;
        harness.content.set_unavailable(true);

        // Act: replay with the store down.
        harness
            .projector
            .sync(&mut harness.manager, Registry::Actors)
            .await
            .unwrap();
        assert!(harness.projector.actors().is_empty());

        // The store recovers; the next access retries.
        harness.content.set_unavailable(false);
        let actor = harness.projector.load_actor(1).await.unwrap();

        // Assert
        assert_eq!(actor.unwrap().firstname, "Catherine");
        assert_eq!(harness.projector.actors().len(), 1);
    }

    #[tokio::test]
    async fn test_composite_events_merge_into_competition() {
        // Arrange
        let mut harness = harness();
        seed_competition(&harness, 1, 0).await;
        harness.ledger.emit(
            Registry::Competitions,
            "NomineeCompetitionsRegistered",
            vec![json!(1), json!(1), json!(42)],
        );
        harness.ledger.emit(
            Registry::Competitions,
            "JuryAddedToCompetition",
            vec![json!(1), json!(7)],
        );
        harness.ledger.emit(
            Registry::Competitions,
            "VotedOnCompetition",
            vec![json!(1), json!(7), json!(1)],
        );

        // Act
        harness
            .projector
            .sync(&mut harness.manager, Registry::Competitions)
            .await
            .unwrap();

        // Assert
        let competition = harness.projector.competition(1).unwrap();
        assert_eq!(competition.title, "Best of 2026");
        assert_eq!(competition.award_name, "Golden Mask");
        assert_eq!(competition.category, Category::Actor);
        assert_eq!(
            competition.nominees,
            vec![NomineeRef {
                local_id: 1,
                token_id: 42
            }]
        );
        assert!(competition.juries.contains(&7));
        assert_eq!(competition.votes.get(&7), Some(&1));
        assert!(competition.winner.is_none());
    }

    #[tokio::test]
    async fn test_nominee_and_jury_sets_never_shrink_under_replay() {
        // Arrange
        let mut harness = harness();
        seed_competition(&harness, 1, 0).await;
        for _ in 0..3 {
            harness.ledger.emit(
                Registry::Competitions,
                "NomineeCompetitionsRegistered",
                vec![json!(1), json!(1), json!(42)],
            );
            harness.ledger.emit(
                Registry::Competitions,
                "JuryAddedToCompetition",
                vec![json!(1), json!(7)],
            );
        }

        // Act: full replay, twice.
        harness
            .projector
            .sync(&mut harness.manager, Registry::Competitions)
            .await
            .unwrap();
        harness
            .projector
            .replay_history(Registry::Competitions)
            .await
            .unwrap();

        // Assert
        let competition = harness.projector.competition(1).unwrap();
        assert_eq!(competition.nominees.len(), 1);
        assert_eq!(competition.juries.len(), 1);
    }

    #[tokio::test]
    async fn test_two_projectors_converge_regardless_of_registry_interleaving() {
        // Arrange: one actor, one competition referencing it.
        let harness_template = harness();
        seed_actor(&harness_template, 42, "Catherine").await;
        seed_competition(&harness_template, 1, 0).await;
        harness_template.ledger.emit(
            Registry::Competitions,
            "NomineeCompetitionsRegistered",
            vec![json!(1), json!(1), json!(42)],
        );

        let ledger = Arc::clone(&harness_template.ledger);
        let content = Arc::clone(&harness_template.content);
        let mut left = EventProjector::new(
            Arc::clone(&ledger) as Arc<dyn LedgerClient>,
            Arc::clone(&content) as Arc<dyn ContentStore>,
        );
        let mut right = EventProjector::new(
            Arc::clone(&ledger) as Arc<dyn LedgerClient>,
            Arc::clone(&content) as Arc<dyn ContentStore>,
        );

        // Act: same per-registry order, opposite cross-registry order.
        left.replay_history(Registry::Actors).await.unwrap();
        left.replay_history(Registry::Competitions).await.unwrap();
        right.replay_history(Registry::Competitions).await.unwrap();
        right.replay_history(Registry::Actors).await.unwrap();

        // Assert
        assert_eq!(left.actors(), right.actors());
        assert_eq!(left.competitions(), right.competitions());
    }

    #[tokio::test]
    async fn test_optimistic_update_then_echo_is_a_noop() {
        // Arrange: a materialized competition with an optimistic nominee.
        let mut harness = harness();
        seed_competition(&harness, 1, 0).await;
        harness
            .projector
            .sync(&mut harness.manager, Registry::Competitions)
            .await
            .unwrap();
        harness.projector.merge_nominee(
            1,
            NomineeRef {
                local_id: 1,
                token_id: 42,
            },
        );

        // Act: the live echo arrives later.
        harness.ledger.deliver_live_only(
            Registry::Competitions,
            "NomineeCompetitionsRegistered",
            vec![json!(1), json!(1), json!(42)],
        );
        harness.projector.pump(&mut harness.manager).await;

        // Assert
        assert_eq!(harness.projector.competition(1).unwrap().nominees.len(), 1);
    }

    #[tokio::test]
    async fn test_winner_first_observation_wins() {
        // Arrange
        let mut harness = harness();
        seed_competition(&harness, 1, 0).await;
        harness
            .projector
            .sync(&mut harness.manager, Registry::Competitions)
            .await
            .unwrap();

        // Act
        let first = harness.projector.merge_winner(
            1,
            Winner {
                token_id: 42,
                local_id: 1,
            },
        );
        let conflicting = harness.projector.merge_winner(
            1,
            Winner {
                token_id: 43,
                local_id: 2,
            },
        );

        // Assert
        assert!(first);
        assert!(!conflicting);
        assert_eq!(
            harness.projector.competition(1).unwrap().winner,
            Some(Winner {
                token_id: 42,
                local_id: 1
            })
        );
    }

    #[tokio::test]
    async fn test_composite_event_before_registration_is_not_lost() {
        // Arrange: the nominee event arrives before the registration is
        // materialized (deferred by a store outage).
        let mut harness = harness();
        seed_competition(&harness, 1, 0).await;
        harness.ledger.emit(
            Registry::Competitions,
            "NomineeCompetitionsRegistered",
            vec![json!(1), json!(1), json!(42)],
        );
        harness.content.set_unavailable(true);

        // Act
        harness
            .projector
            .sync(&mut harness.manager, Registry::Competitions)
            .await
            .unwrap();
        assert!(harness.projector.competition(1).is_none());

        harness.content.set_unavailable(false);
        let competition = harness.projector.load_competition(1).await.unwrap().unwrap();

        // Assert: the nominee observed during the outage is present.
        assert_eq!(competition.nominees.len(), 1);
    }
}
