//! Domain types of the workflows: pre-submission drafts.

pub mod draft;
