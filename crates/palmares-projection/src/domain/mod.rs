//! Domain types of the projection: read-model entities and decoded events.

pub mod entities;
pub mod events;
