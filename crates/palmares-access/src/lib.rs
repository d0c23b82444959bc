//! Palmarès — access-rights resolution.
//!
//! Answers "what may the connected wallet do" by comparing it against the
//! owner of each registry and looking up jury membership. Resolution is
//! failure-isolated: a degraded query costs its own permission, nothing
//! else.

pub mod resolver;

pub use resolver::{AccessRights, AccessRightsResolver};
