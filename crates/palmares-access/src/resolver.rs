//! Concurrent, failure-isolated access-rights resolution.

use std::sync::Arc;

use palmares_core::error::LedgerError;
use palmares_core::identity::{Address, IdentityProvider};
use palmares_core::ledger::{LedgerClient, Registry};
use palmares_core::reads;
use tracing::warn;

/// What the resolved wallet is allowed to do.
///
/// Each permission reflects one ownership query; a query that failed
/// resolves to `false` for its permission only. Callers re-resolve on
/// account or network change, there is no caching here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessRights {
    /// May mint actor and director tokens (owner of either people registry).
    pub can_add_people: bool,
    /// May mint movie tokens.
    pub can_add_movie: bool,
    /// May register competitions and drive their lifecycle.
    pub can_add_competition: bool,
    /// May mint jury membership tokens.
    pub can_add_jury: bool,
    /// Holds a jury membership token.
    pub jury_id: Option<u64>,
}

impl AccessRights {
    /// Returns whether the wallet holds a jury membership token.
    #[must_use]
    pub fn is_jury(&self) -> bool {
        self.jury_id.is_some()
    }

    /// Rights of a wallet with no permissions at all.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

/// Resolves `AccessRights` for an address against the ledger.
pub struct AccessRightsResolver {
    ledger: Arc<dyn LedgerClient>,
}

impl AccessRightsResolver {
    /// Creates a resolver over the given ledger.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Resolves the rights of one address.
    ///
    /// The five ownership queries and the jury-membership lookup run
    /// concurrently. A failed query is logged and degrades only its own
    /// permission to `false`; resolution itself never fails.
    pub async fn resolve(&self, address: &Address) -> AccessRights {
        let (actors, directors, movies, competitions, juries, jury_id) = tokio::join!(
            self.owns(Registry::Actors, address),
            self.owns(Registry::Directors, address),
            self.owns(Registry::Movies, address),
            self.owns(Registry::Competitions, address),
            self.owns(Registry::Juries, address),
            self.jury_membership(address),
        );
        AccessRights {
            can_add_people: actors || directors,
            can_add_movie: movies,
            can_add_competition: competitions,
            can_add_jury: juries,
            jury_id,
        }
    }

    /// Resolves the rights of the currently connected wallet, if any.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` when the identity provider itself fails;
    /// individual rights queries never fail the resolution.
    pub async fn resolve_connected(
        &self,
        identity: &dyn IdentityProvider,
    ) -> Result<Option<(Address, AccessRights)>, LedgerError> {
        let Some(address) = identity.connected_address().await? else {
            return Ok(None);
        };
        let rights = self.resolve(&address).await;
        Ok(Some((address, rights)))
    }

    async fn owns(&self, registry: Registry, address: &Address) -> bool {
        match reads::registry_owner(self.ledger.as_ref(), registry).await {
            Ok(owner) => owner == *address,
            Err(error) => {
                warn!(%registry, %error, "ownership query degraded");
                false
            }
        }
    }

    async fn jury_membership(&self, address: &Address) -> Option<u64> {
        match reads::jury_id_of(self.ledger.as_ref(), address).await {
            Ok(jury_id) => jury_id,
            Err(error) => {
                warn!(%error, "jury membership query degraded");
                None
            }
        }
    }
}
