//! Producer registry, round scheduler and governance aggregation.
//!
//! This crate tracks block producer candidates and turns vote tallies into a
//! round schedule. It handles:
//!
//! - Candidate registration, re-keying and configuration preferences
//! - Production statistics (last slot produced, missed slots)
//! - Active-set selection at round boundaries, tie-broken by registration order
//! - Recomputing the effective governance configuration as the field-wise
//!   median over every registered producer's preference
//!
//! Selection and schedule derivation are pure functions of the registry and
//! the tally index; the composition layer decides when a round boundary has
//! been crossed.

mod registry;
mod schedule;

pub use registry::{Producer, ProducerRegistry};
pub use schedule::{next_round_properties, select_active_set};
