//! Stake ledger, delegation graph and vote tally index.
//!
//! This crate implements the voting-weight side of the chain core as a pure,
//! synchronous state component. It handles:
//!
//! - Liquid / staked / unstaking balance pools with cooldown
//! - One-hop vote delegation (proxying)
//! - Incrementally-maintained per-producer vote tallies
//!
//! The three interlock on every mutation (a stake change must flow through
//! the delegation graph into the tallies), so they are composed into a single
//! [`StakingState`] that owns the choreography. All maps are `BTreeMap`s:
//! iteration order is part of the replay contract.

mod delegation;
mod ledger;
mod state;
mod tally;

pub use delegation::{DelegationGraph, DelegationRecord};
pub use ledger::{Account, StakeLedger};
pub use state::StakingState;
pub use tally::VoteTallyIndex;
