//! Chain state composition.
//!
//! This crate wires the staking state and the producer registry into one
//! deterministic state machine, driven by an external block-application
//! layer. It handles:
//!
//! - The closed set of operation kinds and their transaction envelope
//! - Structural validation (notify rules, duplicate rejection)
//! - Atomic validate-then-apply dispatch per transaction
//! - Block lifecycle: slot clock injection, production statistics,
//!   slot-driven round-boundary transitions
//! - The commit-on-block-close seam towards the storage collaborator
//!
//! The driver applies transactions atomically and in order; no operation
//! suspends mid-mutation and a failing operation has zero effect. Given an
//! identical transaction log, two instances of [`ChainState`] end bit-equal —
//! that property is what everything here is shaped around.

mod operation;
mod state;
mod store;

pub use operation::{Operation, Transaction};
pub use state::{ChainState, Genesis};
pub use store::{CommitSink, NullSink};
