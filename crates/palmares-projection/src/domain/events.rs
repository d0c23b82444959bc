//! Decoded ledger events.
//!
//! One decoder per (registry, event name) pair turns the wire's positional
//! untyped arguments into tagged variants, failing closed with
//! `MalformedEvent` on any shape mismatch.

use palmares_core::identity::Address;
use palmares_core::ledger::{RawEvent, Registry};
use serde_json::Value;

use crate::domain::entities::{Category, PeopleKind};
use crate::error::ProjectionError;

/// Mint event on the Actors registry.
pub const EVENT_ACTOR_MINTED: &str = "ActorMinted";
/// Mint event on the Directors registry.
pub const EVENT_DIRECTOR_MINTED: &str = "DirectorMinted";
/// Mint event on the Movies registry.
pub const EVENT_MOVIE_MINTED: &str = "MovieMinted";
/// Mint event on the Juries registry.
pub const EVENT_JURY_MINTED: &str = "JuryMinted";
/// Competition registration event.
pub const EVENT_COMPETITION_REGISTERED: &str = "CompetitionSessionRegistered";
/// Nominee attachment event.
pub const EVENT_NOMINEE_REGISTERED: &str = "NomineeCompetitionsRegistered";
/// Jury assignment event.
pub const EVENT_JURY_ADDED: &str = "JuryAddedToCompetition";
/// Vote event.
pub const EVENT_VOTED: &str = "VotedOnCompetition";
/// Winner designation event.
pub const EVENT_WINNER_DESIGNATED: &str = "WinnerDesignated";

/// Returns the known event names of a registry, in projection order:
/// creation events precede the composite events that reference them.
#[must_use]
pub fn known_events(registry: Registry) -> &'static [&'static str] {
    match registry {
        Registry::Actors => &[EVENT_ACTOR_MINTED],
        Registry::Directors => &[EVENT_DIRECTOR_MINTED],
        Registry::Movies => &[EVENT_MOVIE_MINTED],
        Registry::Juries => &[EVENT_JURY_MINTED],
        Registry::Competitions => &[
            EVENT_COMPETITION_REGISTERED,
            EVENT_NOMINEE_REGISTERED,
            EVENT_JURY_ADDED,
            EVENT_VOTED,
            EVENT_WINNER_DESIGNATED,
        ],
        Registry::Awards => &[],
    }
}

/// A ledger event after shape validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEvent {
    /// A person token was minted on the Actors or Directors registry.
    PersonMinted {
        /// Which people registry minted the token.
        kind: PeopleKind,
        /// The new token id.
        token_id: u64,
        /// Pointer to the metadata document.
        token_uri: String,
    },
    /// A movie token was minted.
    MovieMinted {
        /// The new token id.
        token_id: u64,
        /// Pointer to the metadata document.
        token_uri: String,
    },
    /// A jury membership token was minted.
    JuryMinted {
        /// Wallet the membership was issued to.
        wallet: Address,
        /// The new token id.
        token_id: u64,
        /// Pointer to the metadata document.
        token_uri: String,
    },
    /// A competition was registered.
    CompetitionRegistered {
        /// The new competition id.
        competition_id: u64,
    },
    /// A nominee was attached to a competition.
    NomineeRegistered {
        /// The competition.
        competition_id: u64,
        /// Competition-scoped nominee id.
        nominee_id: u64,
        /// The nominated token.
        token_id: u64,
    },
    /// A jury member was assigned to a competition.
    JuryAssigned {
        /// The competition.
        competition_id: u64,
        /// The assigned jury member's token id.
        jury_id: u64,
    },
    /// A jury member voted.
    VoteCast {
        /// The competition.
        competition_id: u64,
        /// The voting jury member.
        jury_id: u64,
        /// The chosen nominee's competition-scoped id.
        nominee_id: u64,
    },
    /// A winner was designated.
    WinnerDesignated {
        /// The competition.
        competition_id: u64,
        /// The winning nominee's token id.
        nominee_token_id: u64,
        /// The winning nominee's competition-scoped id.
        nominee_id: u64,
        /// The competition's category, as reported by the ledger.
        category: Category,
    },
}

/// Decodes one raw event.
///
/// # Errors
///
/// Returns `MalformedEvent` when the (registry, name) pair is unknown or the
/// arguments do not match the known shape.
pub fn decode(raw: &RawEvent) -> Result<DecodedEvent, ProjectionError> {
    match (raw.registry, raw.name.as_str()) {
        (Registry::Actors, EVENT_ACTOR_MINTED) => Ok(DecodedEvent::PersonMinted {
            kind: PeopleKind::Actor,
            token_id: arg_u64(raw, 0)?,
            token_uri: arg_string(raw, 1)?,
        }),
        (Registry::Directors, EVENT_DIRECTOR_MINTED) => Ok(DecodedEvent::PersonMinted {
            kind: PeopleKind::Director,
            token_id: arg_u64(raw, 0)?,
            token_uri: arg_string(raw, 1)?,
        }),
        (Registry::Movies, EVENT_MOVIE_MINTED) => Ok(DecodedEvent::MovieMinted {
            token_id: arg_u64(raw, 0)?,
            token_uri: arg_string(raw, 1)?,
        }),
        (Registry::Juries, EVENT_JURY_MINTED) => Ok(DecodedEvent::JuryMinted {
            wallet: Address::new(arg_string(raw, 0)?),
            token_id: arg_u64(raw, 1)?,
            token_uri: arg_string(raw, 2)?,
        }),
        (Registry::Competitions, EVENT_COMPETITION_REGISTERED) => {
            Ok(DecodedEvent::CompetitionRegistered {
                competition_id: arg_u64(raw, 0)?,
            })
        }
        (Registry::Competitions, EVENT_NOMINEE_REGISTERED) => Ok(DecodedEvent::NomineeRegistered {
            competition_id: arg_u64(raw, 0)?,
            nominee_id: arg_u64(raw, 1)?,
            token_id: arg_u64(raw, 2)?,
        }),
        (Registry::Competitions, EVENT_JURY_ADDED) => Ok(DecodedEvent::JuryAssigned {
            competition_id: arg_u64(raw, 0)?,
            jury_id: arg_u64(raw, 1)?,
        }),
        (Registry::Competitions, EVENT_VOTED) => Ok(DecodedEvent::VoteCast {
            competition_id: arg_u64(raw, 0)?,
            jury_id: arg_u64(raw, 1)?,
            nominee_id: arg_u64(raw, 2)?,
        }),
        (Registry::Competitions, EVENT_WINNER_DESIGNATED) => {
            let code = arg_u64(raw, 3)?;
            let category = Category::from_code(code).ok_or_else(|| malformed(
                raw,
                format!("unknown category code {code}"),
            ))?;
            Ok(DecodedEvent::WinnerDesignated {
                competition_id: arg_u64(raw, 0)?,
                nominee_token_id: arg_u64(raw, 1)?,
                nominee_id: arg_u64(raw, 2)?,
                category,
            })
        }
        _ => Err(malformed(raw, "unknown (registry, event) pair".to_owned())),
    }
}

fn malformed(raw: &RawEvent, detail: String) -> ProjectionError {
    ProjectionError::MalformedEvent {
        registry: raw.registry,
        event_name: raw.name.clone(),
        detail,
    }
}

fn arg(raw: &RawEvent, index: usize) -> Result<&Value, ProjectionError> {
    raw.args
        .get(index)
        .ok_or_else(|| malformed(raw, format!("missing argument {index}")))
}

fn arg_u64(raw: &RawEvent, index: usize) -> Result<u64, ProjectionError> {
    let value = arg(raw, index)?;
    value
        .as_u64()
        .ok_or_else(|| malformed(raw, format!("argument {index} is not an unsigned id: {value}")))
}

fn arg_string(raw: &RawEvent, index: usize) -> Result<String, ProjectionError> {
    let value = arg(raw, index)?;
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| malformed(raw, format!("argument {index} is not a string: {value}")))
}
