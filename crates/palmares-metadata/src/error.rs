//! Codec error types.

use thiserror::Error;

/// Errors raised while parsing an attribute document.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The bytes are not a well-formed attribute document.
    #[error("malformed attribute document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A required attribute is absent from the document.
    #[error("missing attribute: {0}")]
    MissingAttribute(&'static str),

    /// An attribute is present but its value has the wrong shape.
    #[error("invalid value for attribute {attribute}: {detail}")]
    InvalidValue {
        /// The offending attribute's trait name.
        attribute: &'static str,
        /// What was wrong with the value.
        detail: String,
    },
}
