//! Shared test fakes for the Palmarès competition client.

mod clock;
mod content_store;
mod identity;
mod ledger;

pub use clock::FixedClock;
pub use content_store::MemoryContentStore;
pub use identity::FakeIdentityProvider;
pub use ledger::{FakeLedger, SubmitOutcome};

/// Initializes a tracing subscriber for a test, honoring `RUST_LOG`.
/// Safe to call from multiple tests; only the first call wins.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}
