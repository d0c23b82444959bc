//! The attribute-set document shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One named attribute in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// The attribute's trait name.
    pub trait_type: String,
    /// The attribute's value.
    pub value: Value,
}

/// A content-store document describing one minted entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDocument {
    /// Human-readable description of the document.
    pub description: String,
    /// External link, empty when none.
    pub external_url: String,
    /// Content identifier of the entity's main image.
    pub image: String,
    /// Collection name.
    pub name: String,
    /// Named attributes carrying the entity's fields.
    pub attributes: Vec<Attribute>,
}

impl AttributeDocument {
    /// Looks up an attribute value by trait name.
    #[must_use]
    pub fn attribute(&self, trait_type: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|attribute| attribute.trait_type == trait_type)
            .map(|attribute| &attribute.value)
    }

    /// Serializes the document to its stored byte form.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        // Serialization of derived Serialize types to JSON is infallible.
        serde_json::to_vec(self).expect("AttributeDocument serialization is infallible")
    }
}
