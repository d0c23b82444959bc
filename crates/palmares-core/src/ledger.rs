//! Ledger port — registries, raw events, receipts and the client trait.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::LedgerError;

/// One logical registry within the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Registry {
    /// Actor tokens (a People-kind registry).
    Actors,
    /// Director tokens (a People-kind registry).
    Directors,
    /// Movie tokens.
    Movies,
    /// Jury membership tokens.
    Juries,
    /// Competitions and their votes.
    Competitions,
    /// Winner trophies.
    Awards,
}

impl Registry {
    /// Returns the registry name as used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Actors => "actors",
            Self::Directors => "directors",
            Self::Movies => "movies",
            Self::Juries => "juries",
            Self::Competitions => "competitions",
            Self::Awards => "awards",
        }
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event as emitted by a registry, before decoding.
///
/// Arguments are positional and untyped on the wire; decoding into tagged
/// variants is the projection layer's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// The registry that emitted the event.
    pub registry: Registry,
    /// The emitting contract's event name.
    pub name: String,
    /// Positional event arguments.
    pub args: Vec<Value>,
}

/// Positional argument filter for historical event queries.
///
/// `None` at a position matches any value, mirroring wildcard topics.
#[derive(Debug, Clone, Default)]
pub struct EventFilter(Vec<Option<Value>>);

impl EventFilter {
    /// A filter that matches every event.
    #[must_use]
    pub fn any() -> Self {
        Self(Vec::new())
    }

    /// Builds a filter from positional constraints.
    #[must_use]
    pub fn new(positions: Vec<Option<Value>>) -> Self {
        Self(positions)
    }

    /// Returns whether the given argument list satisfies the filter.
    #[must_use]
    pub fn matches(&self, args: &[Value]) -> bool {
        self.0
            .iter()
            .enumerate()
            .all(|(i, constraint)| match constraint {
                Some(expected) => args.get(i) == Some(expected),
                None => true,
            })
    }
}

/// Final status of an included transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    /// The transaction executed successfully.
    Succeeded,
    /// The transaction was included but reverted.
    Reverted {
        /// Revert reason reported by the ledger, when available.
        reason: Option<String>,
    },
}

/// Inclusion receipt for a submitted transaction.
#[derive(Debug, Clone)]
pub struct Receipt {
    /// Final execution status.
    pub status: TxStatus,
    /// Events emitted during execution.
    pub events: Vec<RawEvent>,
}

impl Receipt {
    /// Finds the first emitted event with the given name.
    #[must_use]
    pub fn find_event(&self, name: &str) -> Option<&RawEvent> {
        self.events.iter().find(|event| event.name == name)
    }
}

/// Handle to a submitted, not-yet-confirmed transaction.
#[async_trait]
pub trait TransactionHandle: Send {
    /// Waits for inclusion and returns the receipt.
    async fn wait(self: Box<Self>) -> Result<Receipt, LedgerError>;
}

/// Identifier of one live subscription at the ledger client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// A live event feed returned by [`LedgerClient::subscribe`].
#[derive(Debug)]
pub struct EventSubscription {
    /// Identifier used to unsubscribe.
    pub id: SubscriptionId,
    /// Channel on which new events are delivered in emission order.
    pub events: mpsc::UnboundedReceiver<RawEvent>,
}

/// Port to the external ledger.
///
/// One implementation serves all registries; every method names the registry
/// it addresses. Historical queries and live subscriptions may overlap, so
/// consumers must tolerate duplicate delivery.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Queries historical events by name and optional argument filter,
    /// ordered by emission, starting at `from_index`.
    async fn query_events(
        &self,
        registry: Registry,
        event_name: &str,
        filter: &EventFilter,
        from_index: u64,
    ) -> Result<Vec<RawEvent>, LedgerError>;

    /// Opens a live subscription for new events of the given name.
    async fn subscribe(
        &self,
        registry: Registry,
        event_name: &str,
    ) -> Result<EventSubscription, LedgerError>;

    /// Closes a live subscription. Unknown ids are a no-op.
    async fn unsubscribe(&self, id: SubscriptionId) -> Result<(), LedgerError>;

    /// Performs a read-only call against a registry.
    async fn call(
        &self,
        registry: Registry,
        method: &str,
        args: &[Value],
    ) -> Result<Value, LedgerError>;

    /// Submits a signed transaction and returns a confirmation handle.
    async fn submit(
        &self,
        registry: Registry,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Box<dyn TransactionHandle>, LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_filter_any_matches_everything() {
        let filter = EventFilter::any();
        assert!(filter.matches(&[json!(1), json!("x")]));
        assert!(filter.matches(&[]));
    }

    #[test]
    fn test_event_filter_constrains_only_set_positions() {
        // Arrange: wildcard first position, fixed second.
        let filter = EventFilter::new(vec![None, Some(json!(7))]);

        // Assert
        assert!(filter.matches(&[json!(3), json!(7)]));
        assert!(filter.matches(&[json!(9), json!(7), json!("extra")]));
        assert!(!filter.matches(&[json!(3), json!(8)]));
        assert!(!filter.matches(&[json!(3)]));
    }

    #[test]
    fn test_receipt_find_event_returns_first_match() {
        // Arrange
        let receipt = Receipt {
            status: TxStatus::Succeeded,
            events: vec![
                RawEvent {
                    registry: Registry::Competitions,
                    name: "Transfer".to_owned(),
                    args: vec![],
                },
                RawEvent {
                    registry: Registry::Competitions,
                    name: "CompetitionSessionRegistered".to_owned(),
                    args: vec![json!(4)],
                },
            ],
        };

        // Act
        let found = receipt.find_event("CompetitionSessionRegistered");

        // Assert
        assert_eq!(found.unwrap().args, vec![json!(4)]);
        assert!(receipt.find_event("WinnerDesignated").is_none());
    }
}
