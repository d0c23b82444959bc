//! Palmarès Core — shared ports and abstractions.
//!
//! This crate defines the external-collaborator ports (ledger, content
//! store, identity provider) and the fundamental types every other crate
//! depends on. It contains no projection or workflow logic.

pub mod clock;
pub mod content;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod reads;
