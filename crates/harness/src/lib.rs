//! Deterministic block-production driver for integration tests.
//!
//! Plays the role of the out-of-scope block-application layer: it owns the
//! slot clock, asks the chain who is scheduled, applies transactions and
//! produces (or misses) blocks. Everything is driven by explicit calls — no
//! wall clock, no randomness — so two identically-driven chains end
//! bit-equal, which is exactly what the determinism tests assert.

mod runner;
mod sink;

pub use runner::{default_genesis, TestChain, GENESIS_ACCOUNT_BALANCE};
pub use sink::MemorySink;

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber for test logs. Safe to call repeatedly.
///
/// Filter via `RUST_LOG`, e.g. `RUST_LOG=spindle_staking=trace`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
