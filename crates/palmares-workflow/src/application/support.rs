//! Shared publish-and-submit plumbing for the workflows.

use palmares_core::content::{ContentId, ContentStore};
use palmares_core::ledger::{LedgerClient, RawEvent, Receipt, Registry, TxStatus};
use serde_json::Value;

use crate::error::WorkflowError;

/// Publishes bytes unless the progress slot already holds the result of a
/// previous attempt. Keeps retries from re-publishing completed steps.
pub(crate) async fn publish_once(
    content: &dyn ContentStore,
    slot: &mut Option<ContentId>,
    bytes: Vec<u8>,
) -> Result<ContentId, WorkflowError> {
    if let Some(id) = slot {
        return Ok(id.clone());
    }
    let id = content.put(bytes).await?;
    *slot = Some(id.clone());
    Ok(id)
}

/// Submits a transaction and waits for inclusion, mapping a reverted
/// execution to `WorkflowError::Reverted`.
pub(crate) async fn submit_and_wait(
    ledger: &dyn LedgerClient,
    registry: Registry,
    method: &str,
    args: Vec<Value>,
) -> Result<Receipt, WorkflowError> {
    let handle = ledger.submit(registry, method, args).await?;
    let receipt = handle.wait().await?;
    if let TxStatus::Reverted { reason } = &receipt.status {
        return Err(WorkflowError::Reverted {
            registry,
            method: method.to_owned(),
            reason: reason.clone(),
        });
    }
    Ok(receipt)
}

/// Finds the event the workflow needs in a successful receipt.
pub(crate) fn required_event<'a>(
    receipt: &'a Receipt,
    method: &str,
    event_name: &'static str,
) -> Result<&'a RawEvent, WorkflowError> {
    receipt
        .find_event(event_name)
        .ok_or_else(|| WorkflowError::ExpectedEventMissing {
            method: method.to_owned(),
            event_name: event_name.to_owned(),
        })
}

/// Reads a ledger-assigned id out of a receipt event's positional arguments.
pub(crate) fn event_id(
    event: &RawEvent,
    index: usize,
    method: &str,
) -> Result<u64, WorkflowError> {
    event
        .args
        .get(index)
        .and_then(Value::as_u64)
        .ok_or_else(|| WorkflowError::ExpectedEventMissing {
            method: method.to_owned(),
            event_name: event.name.clone(),
        })
}
