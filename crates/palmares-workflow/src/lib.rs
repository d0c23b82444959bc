//! Palmarès — write-side workflows.
//!
//! Multi-step orchestrations against the ledger and the content store:
//! minting registry tokens, driving a competition through its lifecycle and
//! designating its winner. Every workflow publishes content first, submits a
//! transaction, extracts the ledger-assigned id from the receipt, then
//! updates the projection optimistically.

pub mod application;
pub mod domain;
pub mod error;

pub use application::competition::{CompetitionWorkflow, CreateProgress};
pub use application::minting::{MintProgress, MintingWorkflow};
pub use error::WorkflowError;
