//! Foundation types for the spindle chain core.
//!
//! This crate provides the foundational types used throughout the
//! state-transition core:
//!
//! - **Identifiers**: AccountName, Slot, BlockNum, TxId
//! - **Currency**: Amount (fixed-point, integer-only)
//! - **Governance**: BlockchainConfiguration and its median fold
//! - **Chain state**: GlobalProperties, ChainConfig
//! - **Errors**: ChainError, classified into precondition and validation kinds
//!
//! # Design Philosophy
//!
//! This crate is self-contained with minimal dependencies. It does not depend
//! on any other workspace crates, making it the foundation layer. Everything
//! here is deterministic value data: no clocks, no floats, no iteration over
//! unordered containers.

mod amount;
mod config;
mod configuration;
mod error;
mod identifiers;
mod keys;
mod properties;

pub use amount::Amount;
pub use config::{
    ChainConfig, DEFAULT_BLOCKS_PER_ROUND, DEFAULT_PRODUCER_COUNT, DEFAULT_RECENT_TX_HORIZON,
    DEFAULT_UNSTAKE_COOLDOWN_SLOTS,
};
pub use configuration::BlockchainConfiguration;
pub use error::{ChainError, ErrorKind};
pub use identifiers::{AccountName, BlockNum, Slot, TxId};
pub use keys::PublicKey;
pub use properties::GlobalProperties;
