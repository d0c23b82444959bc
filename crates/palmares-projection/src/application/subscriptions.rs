//! Live subscription lifecycle.
//!
//! Replaces ad hoc process-wide listener state with an explicit manager
//! owned by the caller: attach and detach are idempotent, so teardown paths
//! that race do no harm, and a repeated attach never creates a second
//! delivery path for the same (registry, event) pair.

use std::collections::HashMap;
use std::sync::Arc;

use palmares_core::error::LedgerError;
use palmares_core::ledger::{LedgerClient, RawEvent, Registry, SubscriptionId};
use tokio::sync::mpsc;

struct ActiveSubscription {
    id: SubscriptionId,
    events: mpsc::UnboundedReceiver<RawEvent>,
}

/// Owns live subscriptions per (registry, event name) pair.
///
/// Events delivered while no one drains are buffered in order, which is what
/// lets the projector attach before replaying history without losing the
/// events that arrive in between.
pub struct SubscriptionManager {
    ledger: Arc<dyn LedgerClient>,
    active: HashMap<(Registry, String), ActiveSubscription>,
}

impl SubscriptionManager {
    /// Creates a manager over the given ledger client.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self {
            ledger,
            active: HashMap::new(),
        }
    }

    /// Opens a live subscription; a no-op when one is already attached.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` when the ledger refuses the subscription.
    pub async fn attach(&mut self, registry: Registry, event_name: &str) -> Result<(), LedgerError> {
        let key = (registry, event_name.to_owned());
        if self.active.contains_key(&key) {
            return Ok(());
        }
        let subscription = self.ledger.subscribe(registry, event_name).await?;
        self.active.insert(
            key,
            ActiveSubscription {
                id: subscription.id,
                events: subscription.events,
            },
        );
        Ok(())
    }

    /// Closes a live subscription; a no-op when none is attached.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` when the ledger fails to tear down the
    /// subscription; the local handle is released regardless.
    pub async fn detach(&mut self, registry: Registry, event_name: &str) -> Result<(), LedgerError> {
        let key = (registry, event_name.to_owned());
        match self.active.remove(&key) {
            Some(subscription) => self.ledger.unsubscribe(subscription.id).await,
            None => Ok(()),
        }
    }

    /// Closes every attached subscription.
    ///
    /// # Errors
    ///
    /// Returns the first teardown error after releasing all local handles.
    pub async fn detach_all(&mut self) -> Result<(), LedgerError> {
        let mut first_error = None;
        for (_, subscription) in self.active.drain() {
            if let Err(error) = self.ledger.unsubscribe(subscription.id).await {
                first_error.get_or_insert(error);
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Returns whether a subscription is attached for the pair.
    #[must_use]
    pub fn is_attached(&self, registry: Registry, event_name: &str) -> bool {
        self.active
            .contains_key(&(registry, event_name.to_owned()))
    }

    /// Drains every buffered live event, preserving per-subscription order.
    pub fn drain(&mut self) -> Vec<RawEvent> {
        let mut drained = Vec::new();
        for subscription in self.active.values_mut() {
            while let Ok(event) = subscription.events.try_recv() {
                drained.push(event);
            }
        }
        drained
    }
}
