//! Client-local drafts, validated before anything is published.
//!
//! A draft is the only pre-submission state; once the registration
//! transaction confirms, the entity lives in the projection and the draft is
//! discarded.

use chrono::{DateTime, Utc};
use palmares_core::identity::Address;
use palmares_projection::domain::entities::{Category, PeopleKind};

use crate::error::WorkflowError;

/// Draft of an actor or director token.
#[derive(Debug, Clone)]
pub struct PersonDraft {
    /// Which people registry to mint on.
    pub kind: PeopleKind,
    /// First name.
    pub firstname: String,
    /// Last name.
    pub lastname: String,
    /// Wallet address of the person.
    pub wallet: Address,
    /// Raw portrait bytes, published to the content store first.
    pub picture: Vec<u8>,
}

impl PersonDraft {
    /// Validates the draft.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDraft` naming the first failing field.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        require_text("firstname", &self.firstname)?;
        require_text("lastname", &self.lastname)?;
        require_bytes("picture", &self.picture)
    }
}

/// Draft of a movie token.
#[derive(Debug, Clone)]
pub struct MovieDraft {
    /// Movie title.
    pub title: String,
    /// Synopsis.
    pub description: String,
    /// Token id of the directing person on the Directors registry.
    pub director_id: u64,
    /// Raw poster bytes, published to the content store first.
    pub picture: Vec<u8>,
}

impl MovieDraft {
    /// Validates the draft.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDraft` naming the first failing field.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        require_text("title", &self.title)?;
        require_bytes("picture", &self.picture)
    }
}

/// Draft of a jury membership token.
#[derive(Debug, Clone)]
pub struct JuryDraft {
    /// First name.
    pub firstname: String,
    /// Last name.
    pub lastname: String,
    /// Wallet the membership token is issued to.
    pub wallet: Address,
    /// Raw portrait bytes, published to the content store first.
    pub picture: Vec<u8>,
}

impl JuryDraft {
    /// Validates the draft.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDraft` naming the first failing field.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        require_text("firstname", &self.firstname)?;
        require_text("lastname", &self.lastname)?;
        require_bytes("picture", &self.picture)
    }
}

/// Draft of a competition, before registration on the ledger.
#[derive(Debug, Clone)]
pub struct CompetitionDraft {
    /// Competition title.
    pub title: String,
    /// Name of the award handed to the winner.
    pub award_name: String,
    /// Nominee category.
    pub category: Category,
    /// Opening of the voting window.
    pub start_time: DateTime<Utc>,
    /// Closing of the voting window.
    pub end_time: DateTime<Utc>,
    /// Raw trophy picture bytes, published to the content store first.
    pub picture: Vec<u8>,
}

impl CompetitionDraft {
    /// Validates the draft.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDraft` naming the first failing field or an empty or
    /// inverted voting window.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        require_text("title", &self.title)?;
        require_text("award_name", &self.award_name)?;
        require_bytes("picture", &self.picture)?;
        if self.end_time <= self.start_time {
            return Err(WorkflowError::InvalidDraft(
                "end_time must be after start_time".to_owned(),
            ));
        }
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> Result<(), WorkflowError> {
    if value.trim().is_empty() {
        return Err(WorkflowError::InvalidDraft(format!("{field} is empty")));
    }
    Ok(())
}

fn require_bytes(field: &str, value: &[u8]) -> Result<(), WorkflowError> {
    if value.is_empty() {
        return Err(WorkflowError::InvalidDraft(format!("{field} is empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn competition_draft() -> CompetitionDraft {
        CompetitionDraft {
            title: "Best Actor 2026".to_owned(),
            award_name: "Golden Mask".to_owned(),
            category: Category::Actor,
            start_time: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 3, 8, 0, 0, 0).unwrap(),
            picture: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_valid_competition_draft_passes() {
        assert!(competition_draft().validate().is_ok());
    }

    #[test]
    fn test_competition_draft_rejects_inverted_window() {
        // Arrange
        let mut draft = competition_draft();
        draft.end_time = draft.start_time;

        // Act & Assert
        assert!(matches!(
            draft.validate(),
            Err(WorkflowError::InvalidDraft(_))
        ));
    }

    #[test]
    fn test_person_draft_rejects_blank_name() {
        // Arrange
        let draft = PersonDraft {
            kind: PeopleKind::Actor,
            firstname: "   ".to_owned(),
            lastname: "Deneuve".to_owned(),
            wallet: Address::new("0xactor"),
            picture: vec![1],
        };

        // Act & Assert
        assert!(matches!(
            draft.validate(),
            Err(WorkflowError::InvalidDraft(_))
        ));
    }
}
