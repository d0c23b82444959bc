//! Read-model entities reconstructed from ledger events.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use palmares_core::content::ContentId;
use palmares_core::identity::Address;
use palmares_core::ledger::Registry;
use serde::{Deserialize, Serialize};

/// The themed category of a competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Best-actor style competition; nominees are actor tokens.
    Actor,
    /// Best-director style competition; nominees are director tokens.
    Director,
    /// Best-movie style competition; nominees are movie tokens.
    Movie,
}

impl Category {
    /// Decodes the numeric category code used on the wire.
    #[must_use]
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::Actor),
            1 => Some(Self::Director),
            2 => Some(Self::Movie),
            _ => None,
        }
    }

    /// Returns the numeric category code used on the wire.
    #[must_use]
    pub fn code(self) -> u64 {
        match self {
            Self::Actor => 0,
            Self::Director => 1,
            Self::Movie => 2,
        }
    }

    /// Returns the registry that mints this category's nominee tokens.
    #[must_use]
    pub fn mint_registry(self) -> Registry {
        match self {
            Self::Actor => Registry::Actors,
            Self::Director => Registry::Directors,
            Self::Movie => Registry::Movies,
        }
    }
}

/// Which of the two people registries a person token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeopleKind {
    /// Minted on the Actors registry.
    Actor,
    /// Minted on the Directors registry.
    Director,
}

impl PeopleKind {
    /// Returns the minting registry.
    #[must_use]
    pub fn registry(self) -> Registry {
        match self {
            Self::Actor => Registry::Actors,
            Self::Director => Registry::Directors,
        }
    }
}

/// An actor or director, materialized from a mint event and its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Ledger-assigned token id within the minting registry.
    pub id: u64,
    /// First name.
    pub firstname: String,
    /// Last name.
    pub lastname: String,
    /// Portrait content identifier.
    pub picture: ContentId,
    /// Wallet address of the person.
    pub wallet: Address,
}

/// A movie, materialized from a mint event and its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    /// Ledger-assigned token id.
    pub id: u64,
    /// Movie title.
    pub title: String,
    /// Synopsis.
    pub description: String,
    /// Poster content identifier.
    pub picture: ContentId,
    /// Token id of the directing person on the Directors registry.
    pub director_id: u64,
}

/// A jury member, materialized from a mint event and its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JuryMember {
    /// Ledger-assigned token id on the Juries registry.
    pub id: u64,
    /// First name.
    pub firstname: String,
    /// Last name.
    pub lastname: String,
    /// Portrait content identifier.
    pub picture: ContentId,
    /// Wallet address controlling the membership token.
    pub wallet: Address,
}

/// A thin pointer from a competition into a Person or Movie token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NomineeRef {
    /// Competition-scoped nominee id, assigned by the ledger.
    pub local_id: u64,
    /// The nominated token on the category's mint registry.
    pub token_id: u64,
}

/// The designated winner of a competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    /// The winning nominee's token id.
    pub token_id: u64,
    /// The winning nominee's competition-scoped id.
    pub local_id: u64,
}

/// Derived lifecycle state of a competition.
///
/// A pure function of the observed events and the clock: two clients
/// watching the same competition always agree. The client-local `Draft`
/// state lives in the workflow crate, before anything is observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompetitionPhase {
    /// Registered on the ledger, nothing attached yet.
    Registered,
    /// At least one nominee attached, voting not started.
    NomineesOpen,
    /// At least one jury member assigned, voting not started.
    JuryOpen,
    /// Between start and end time; votes are accepted.
    VotingOpen,
    /// Past end time, no winner designated yet.
    VotingClosed,
    /// A winner has been designated.
    WinnerDesignated,
}

/// A competition as projected from the ledger.
///
/// The nominee and jury sets only grow; merges are idempotent so that
/// duplicate delivery (historical/live overlap, optimistic echo) is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    /// Ledger-assigned competition id.
    pub id: u64,
    /// Competition title.
    pub title: String,
    /// Name of the award handed to the winner.
    pub award_name: String,
    /// Trophy picture content identifier.
    pub picture: ContentId,
    /// Nominee category.
    pub category: Category,
    /// Opening of the voting window.
    pub start_time: DateTime<Utc>,
    /// Closing of the voting window.
    pub end_time: DateTime<Utc>,
    /// Nominees in registration order, deduplicated by local id.
    pub nominees: Vec<NomineeRef>,
    /// Assigned jury member ids.
    pub juries: BTreeSet<u64>,
    /// Vote presence: jury id to the nominee local id it voted for.
    pub votes: BTreeMap<u64, u64>,
    /// The designated winner, once observed.
    pub winner: Option<Winner>,
}

impl Competition {
    /// Returns whether the given jury member has voted.
    #[must_use]
    pub fn has_voted(&self, jury_id: u64) -> bool {
        self.votes.contains_key(&jury_id)
    }

    /// Derives the lifecycle phase at the given instant.
    #[must_use]
    pub fn phase(&self, now: DateTime<Utc>) -> CompetitionPhase {
        if self.winner.is_some() {
            CompetitionPhase::WinnerDesignated
        } else if now > self.end_time {
            CompetitionPhase::VotingClosed
        } else if now >= self.start_time {
            CompetitionPhase::VotingOpen
        } else if !self.juries.is_empty() {
            CompetitionPhase::JuryOpen
        } else if !self.nominees.is_empty() {
            CompetitionPhase::NomineesOpen
        } else {
            CompetitionPhase::Registered
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn competition() -> Competition {
        Competition {
            id: 1,
            title: "Best Actor 2026".to_owned(),
            award_name: "Golden Mask".to_owned(),
            picture: ContentId::new("cas://trophy"),
            category: Category::Actor,
            start_time: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 3, 8, 0, 0, 0).unwrap(),
            nominees: Vec::new(),
            juries: BTreeSet::new(),
            votes: BTreeMap::new(),
            winner: None,
        }
    }

    #[test]
    fn test_phase_progression() {
        // Arrange
        let mut competition = competition();
        let before_start = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let during = Utc.with_ymd_and_hms(2026, 3, 4, 0, 0, 0).unwrap();
        let after_end = Utc.with_ymd_and_hms(2026, 3, 9, 0, 0, 0).unwrap();

        // Assert, step by step
        assert_eq!(competition.phase(before_start), CompetitionPhase::Registered);

        competition.nominees.push(NomineeRef {
            local_id: 1,
            token_id: 42,
        });
        assert_eq!(
            competition.phase(before_start),
            CompetitionPhase::NomineesOpen
        );

        competition.juries.insert(7);
        assert_eq!(competition.phase(before_start), CompetitionPhase::JuryOpen);

        assert_eq!(competition.phase(during), CompetitionPhase::VotingOpen);
        assert_eq!(competition.phase(after_end), CompetitionPhase::VotingClosed);

        competition.winner = Some(Winner {
            token_id: 42,
            local_id: 1,
        });
        assert_eq!(
            competition.phase(after_end),
            CompetitionPhase::WinnerDesignated
        );
    }

    #[test]
    fn test_has_voted_reflects_vote_presence() {
        let mut competition = competition();
        assert!(!competition.has_voted(7));
        competition.votes.insert(7, 1);
        assert!(competition.has_voted(7));
    }

    #[test]
    fn test_category_codes_round_trip() {
        for category in [Category::Actor, Category::Director, Category::Movie] {
            assert_eq!(Category::from_code(category.code()), Some(category));
        }
        assert_eq!(Category::from_code(3), None);
    }
}
