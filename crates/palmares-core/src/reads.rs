//! Typed wrappers over the ledger's read-only calls.
//!
//! The ledger port exposes a generic `call`; these helpers decode the known
//! read methods into typed values so callers never touch raw JSON.

use serde_json::{Value, json};

use crate::error::LedgerError;
use crate::identity::Address;
use crate::ledger::{LedgerClient, Registry};

/// Reads the owner/administrator address of a registry.
///
/// # Errors
///
/// Returns `LedgerError` when the call fails or returns a non-string value.
pub async fn registry_owner(
    ledger: &dyn LedgerClient,
    registry: Registry,
) -> Result<Address, LedgerError> {
    let value = ledger.call(registry, "owner", &[]).await?;
    match value {
        Value::String(address) => Ok(Address::new(address)),
        other => Err(LedgerError::UnexpectedValue {
            method: "owner".to_owned(),
            detail: format!("expected address string, got {other}"),
        }),
    }
}

/// Reads the metadata pointer of a token on a mint registry.
///
/// # Errors
///
/// Returns `LedgerError` when the call fails or returns a non-string value.
pub async fn token_uri(
    ledger: &dyn LedgerClient,
    registry: Registry,
    token_id: u64,
) -> Result<String, LedgerError> {
    let value = ledger
        .call(registry, "tokenURI", &[json!(token_id)])
        .await?;
    match value {
        Value::String(uri) => Ok(uri),
        other => Err(LedgerError::UnexpectedValue {
            method: "tokenURI".to_owned(),
            detail: format!("expected uri string, got {other}"),
        }),
    }
}

/// Reads the jury token id held by an address, if any.
///
/// # Errors
///
/// Returns `LedgerError` when the call fails or returns a value that is
/// neither null nor a token id.
pub async fn jury_id_of(
    ledger: &dyn LedgerClient,
    address: &Address,
) -> Result<Option<u64>, LedgerError> {
    let value = ledger
        .call(Registry::Juries, "juryIdOf", &[json!(address.as_str())])
        .await?;
    match value {
        Value::Null => Ok(None),
        Value::Number(ref n) => n.as_u64().map(Some).ok_or(LedgerError::UnexpectedValue {
            method: "juryIdOf".to_owned(),
            detail: format!("expected unsigned token id, got {value}"),
        }),
        other => Err(LedgerError::UnexpectedValue {
            method: "juryIdOf".to_owned(),
            detail: format!("expected token id or null, got {other}"),
        }),
    }
}
