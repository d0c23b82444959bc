//! Palmarès — ledger event projection.
//!
//! Reconstructs the query-able application view (people, movies, juries,
//! competitions, vote presence) from the ledger's historical and live event
//! streams, and owns the lifecycle of live subscriptions.

pub mod application;
pub mod domain;
pub mod error;
