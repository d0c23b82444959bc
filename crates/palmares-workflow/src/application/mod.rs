//! Application services: the orchestration workflows.

pub mod competition;
pub mod minting;

mod support;
