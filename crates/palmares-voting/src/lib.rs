//! Palmarès — jury voting.
//!
//! Computes which competitions still await a jury member's vote and submits
//! votes, refusing obviously doomed ones locally and mapping ledger
//! rejections into typed errors.

pub mod coordinator;
pub mod error;

pub use coordinator::VotingCoordinator;
pub use error::VoteError;
