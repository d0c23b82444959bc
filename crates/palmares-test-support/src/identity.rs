//! Fake identity provider.

use std::sync::Mutex;

use async_trait::async_trait;
use palmares_core::error::LedgerError;
use palmares_core::identity::{AccountEvent, Address, IdentityProvider};
use tokio::sync::mpsc;

/// An identity provider with a scriptable connected address and manual
/// account-event emission.
#[derive(Debug, Default)]
pub struct FakeIdentityProvider {
    address: Mutex<Option<Address>>,
    listeners: Mutex<Vec<mpsc::UnboundedSender<AccountEvent>>>,
}

impl FakeIdentityProvider {
    /// Creates a provider with no connected wallet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider already connected to the given address.
    #[must_use]
    pub fn connected(address: Address) -> Self {
        let provider = Self::new();
        *provider.address.lock().unwrap() = Some(address);
        provider
    }

    /// Switches the connected wallet and notifies listeners.
    ///
    /// # Panics
    ///
    /// Panics if an internal mutex is poisoned.
    pub fn switch_account(&self, address: Address) {
        *self.address.lock().unwrap() = Some(address.clone());
        self.broadcast(AccountEvent::AccountChanged(address));
    }

    /// Notifies listeners of a network switch.
    pub fn switch_network(&self, chain_id: u64) {
        self.broadcast(AccountEvent::NetworkChanged(chain_id));
    }

    fn broadcast(&self, event: AccountEvent) {
        self.listeners
            .lock()
            .unwrap()
            .retain(|listener| listener.send(event.clone()).is_ok());
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn connected_address(&self) -> Result<Option<Address>, LedgerError> {
        Ok(self.address.lock().unwrap().clone())
    }

    fn account_events(&self) -> mpsc::UnboundedReceiver<AccountEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.listeners.lock().unwrap().push(sender);
        receiver
    }
}
