//! Builders and parsers for the known document kinds.
//!
//! Parsing looks attributes up by trait name and fails closed; it never
//! reads by position.

use palmares_core::content::ContentId;
use palmares_core::identity::Address;
use serde_json::{Value, json};

use crate::document::{Attribute, AttributeDocument};
use crate::error::MetadataError;

const TRAIT_FIRSTNAME: &str = "Firstname";
const TRAIT_LASTNAME: &str = "Lastname";
const TRAIT_PICTURE: &str = "Picture";
const TRAIT_ADDRESS: &str = "Address";
const TRAIT_TITLE: &str = "Title";
const TRAIT_DESCRIPTION: &str = "Description";
const TRAIT_DIRECTOR: &str = "Director";
const TRAIT_NAME: &str = "Name";

/// Fields of a person or jury-member document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonFields {
    /// First name.
    pub firstname: String,
    /// Last name.
    pub lastname: String,
    /// Portrait content identifier.
    pub picture: ContentId,
    /// Wallet address of the person.
    pub wallet: Address,
}

/// Fields of a movie document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieFields {
    /// Movie title.
    pub title: String,
    /// Synopsis.
    pub description: String,
    /// Poster content identifier.
    pub picture: ContentId,
    /// Token id of the directing person.
    pub director_id: u64,
}

/// Fields of a competition document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitionFields {
    /// Name of the award handed to the winner.
    pub award_name: String,
    /// Trophy picture content identifier.
    pub picture: ContentId,
}

/// Builds the document for an actor or director.
#[must_use]
pub fn person_document(fields: &PersonFields) -> AttributeDocument {
    people_shaped_document("Palmarès person document", "Palmarès Person", fields)
}

/// Builds the document for a jury member.
#[must_use]
pub fn jury_document(fields: &PersonFields) -> AttributeDocument {
    people_shaped_document("Palmarès jury document", "Palmarès Jury", fields)
}

fn people_shaped_document(
    description: &str,
    name: &str,
    fields: &PersonFields,
) -> AttributeDocument {
    AttributeDocument {
        description: description.to_owned(),
        external_url: String::new(),
        image: fields.picture.as_str().to_owned(),
        name: name.to_owned(),
        attributes: vec![
            attribute(TRAIT_FIRSTNAME, json!(fields.firstname)),
            attribute(TRAIT_LASTNAME, json!(fields.lastname)),
            attribute(TRAIT_PICTURE, json!(fields.picture.as_str())),
            attribute(TRAIT_ADDRESS, json!(fields.wallet.as_str())),
        ],
    }
}

/// Builds the document for a movie.
#[must_use]
pub fn movie_document(fields: &MovieFields) -> AttributeDocument {
    AttributeDocument {
        description: "Palmarès movie document".to_owned(),
        external_url: String::new(),
        image: fields.picture.as_str().to_owned(),
        name: "Palmarès Movie".to_owned(),
        attributes: vec![
            attribute(TRAIT_TITLE, json!(fields.title)),
            attribute(TRAIT_DESCRIPTION, json!(fields.description)),
            attribute(TRAIT_PICTURE, json!(fields.picture.as_str())),
            attribute(TRAIT_DIRECTOR, json!(fields.director_id)),
        ],
    }
}

/// Builds the document for a competition and its award.
#[must_use]
pub fn competition_document(fields: &CompetitionFields) -> AttributeDocument {
    AttributeDocument {
        description: "Palmarès competition document".to_owned(),
        external_url: String::new(),
        image: fields.picture.as_str().to_owned(),
        name: "Palmarès Competition".to_owned(),
        attributes: vec![
            attribute(TRAIT_NAME, json!(fields.award_name)),
            attribute(TRAIT_PICTURE, json!(fields.picture.as_str())),
        ],
    }
}

/// Parses a person or jury-member document.
///
/// # Errors
///
/// Returns `MetadataError` when the bytes are malformed or a required
/// attribute is missing or mistyped.
pub fn parse_person(bytes: &[u8]) -> Result<PersonFields, MetadataError> {
    let document: AttributeDocument = serde_json::from_slice(bytes)?;
    Ok(PersonFields {
        firstname: string_attribute(&document, TRAIT_FIRSTNAME)?,
        lastname: string_attribute(&document, TRAIT_LASTNAME)?,
        picture: ContentId::new(string_attribute(&document, TRAIT_PICTURE)?),
        wallet: Address::new(string_attribute(&document, TRAIT_ADDRESS)?),
    })
}

/// Parses a movie document.
///
/// # Errors
///
/// Returns `MetadataError` when the bytes are malformed or a required
/// attribute is missing or mistyped.
pub fn parse_movie(bytes: &[u8]) -> Result<MovieFields, MetadataError> {
    let document: AttributeDocument = serde_json::from_slice(bytes)?;
    Ok(MovieFields {
        title: string_attribute(&document, TRAIT_TITLE)?,
        description: string_attribute(&document, TRAIT_DESCRIPTION)?,
        picture: ContentId::new(string_attribute(&document, TRAIT_PICTURE)?),
        director_id: id_attribute(&document, TRAIT_DIRECTOR)?,
    })
}

/// Parses a competition document.
///
/// # Errors
///
/// Returns `MetadataError` when the bytes are malformed or a required
/// attribute is missing or mistyped.
pub fn parse_competition(bytes: &[u8]) -> Result<CompetitionFields, MetadataError> {
    let document: AttributeDocument = serde_json::from_slice(bytes)?;
    Ok(CompetitionFields {
        award_name: string_attribute(&document, TRAIT_NAME)?,
        picture: ContentId::new(string_attribute(&document, TRAIT_PICTURE)?),
    })
}

fn attribute(trait_type: &str, value: Value) -> Attribute {
    Attribute {
        trait_type: trait_type.to_owned(),
        value,
    }
}

fn string_attribute(
    document: &AttributeDocument,
    trait_type: &'static str,
) -> Result<String, MetadataError> {
    match document.attribute(trait_type) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(MetadataError::InvalidValue {
            attribute: trait_type,
            detail: format!("expected string, got {other}"),
        }),
        None => Err(MetadataError::MissingAttribute(trait_type)),
    }
}

fn id_attribute(
    document: &AttributeDocument,
    trait_type: &'static str,
) -> Result<u64, MetadataError> {
    match document.attribute(trait_type) {
        Some(value) => value.as_u64().ok_or_else(|| MetadataError::InvalidValue {
            attribute: trait_type,
            detail: format!("expected unsigned token id, got {value}"),
        }),
        None => Err(MetadataError::MissingAttribute(trait_type)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person_fields() -> PersonFields {
        PersonFields {
            firstname: "Ada".to_owned(),
            lastname: "Lovelace".to_owned(),
            picture: ContentId::new("cas://portrait"),
            wallet: Address::new("0xA11CE"),
        }
    }

    #[test]
    fn test_person_document_round_trips() {
        // Arrange
        let fields = person_fields();

        // Act
        let bytes = person_document(&fields).to_bytes();
        let parsed = parse_person(&bytes).unwrap();

        // Assert
        assert_eq!(parsed, fields);
    }

    #[test]
    fn test_jury_document_parses_as_person() {
        // Arrange
        let fields = person_fields();

        // Act
        let bytes = jury_document(&fields).to_bytes();
        let parsed = parse_person(&bytes).unwrap();

        // Assert
        assert_eq!(parsed, fields);
    }

    #[test]
    fn test_movie_document_round_trips() {
        // Arrange
        let fields = MovieFields {
            title: "Metropolis".to_owned(),
            description: "A city divided".to_owned(),
            picture: ContentId::new("cas://poster"),
            director_id: 3,
        };

        // Act
        let bytes = movie_document(&fields).to_bytes();
        let parsed = parse_movie(&bytes).unwrap();

        // Assert
        assert_eq!(parsed, fields);
    }

    #[test]
    fn test_competition_document_round_trips() {
        // Arrange
        let fields = CompetitionFields {
            award_name: "Best Picture".to_owned(),
            picture: ContentId::new("cas://trophy"),
        };

        // Act
        let bytes = competition_document(&fields).to_bytes();
        let parsed = parse_competition(&bytes).unwrap();

        // Assert
        assert_eq!(parsed, fields);
    }

    #[test]
    fn test_parse_person_rejects_missing_attribute() {
        // Arrange: a competition document lacks people attributes.
        let bytes = competition_document(&CompetitionFields {
            award_name: "Best Actor".to_owned(),
            picture: ContentId::new("cas://trophy"),
        })
        .to_bytes();

        // Act
        let result = parse_person(&bytes);

        // Assert
        match result.unwrap_err() {
            MetadataError::MissingAttribute(name) => assert_eq!(name, "Firstname"),
            other => panic!("expected MissingAttribute, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_movie_rejects_mistyped_director() {
        // Arrange
        let mut document = movie_document(&MovieFields {
            title: "Metropolis".to_owned(),
            description: "A city divided".to_owned(),
            picture: ContentId::new("cas://poster"),
            director_id: 3,
        });
        for attribute in &mut document.attributes {
            if attribute.trait_type == "Director" {
                attribute.value = serde_json::json!("three");
            }
        }

        // Act
        let result = parse_movie(&document.to_bytes());

        // Assert
        match result.unwrap_err() {
            MetadataError::InvalidValue { attribute, .. } => assert_eq!(attribute, "Director"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_malformed_bytes() {
        let result = parse_competition(b"not json");
        assert!(matches!(result, Err(MetadataError::Malformed(_))));
    }
}
