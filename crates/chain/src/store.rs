//! The commit-on-block-close seam.

use crate::ChainState;
use spindle_types::BlockNum;

/// Where closed blocks go.
///
/// The storage engine proper (a transactional key-value map keyed by entity
/// identity) lives outside the core; this trait is the hook it plugs into.
/// `commit_block` is called exactly once per closed block with a consistent
/// snapshot — external readers must never observe mid-transaction state, so
/// this is the only point at which state legitimately leaves the core.
pub trait CommitSink {
    /// Persist the state as of the just-closed block.
    fn commit_block(&mut self, block_num: BlockNum, state: &ChainState);
}

/// A sink that drops everything, for chains driven purely in memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl CommitSink for NullSink {
    fn commit_block(&mut self, _block_num: BlockNum, _state: &ChainState) {}
}
