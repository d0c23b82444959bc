//! Connected-identity types and the identity provider port.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::LedgerError;

/// A wallet address on the ledger.
///
/// Addresses are normalized to lowercase at construction so that equality is
/// case-insensitive regardless of the checksum casing a provider reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Wraps and normalizes a raw address string.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into().to_lowercase())
    }

    /// Returns the normalized address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Notifications emitted by the identity provider.
///
/// Either kind invalidates previously resolved access rights; callers react
/// by re-resolving and re-subscribing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountEvent {
    /// The connected wallet changed.
    AccountChanged(Address),
    /// The provider switched to a different network.
    NetworkChanged(u64),
}

/// Port to the external identity provider (wallet).
///
/// The signer capability is implicit: transactions submitted through the
/// ledger port are signed on behalf of the connected address.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the currently connected wallet address, if any.
    async fn connected_address(&self) -> Result<Option<Address>, LedgerError>;

    /// Registers a listener for account and network change notifications.
    fn account_events(&self) -> mpsc::UnboundedReceiver<AccountEvent>;
}
