//! Application services: the projector and subscription lifecycle.

pub mod projector;
pub mod subscriptions;
