//! An in-memory commit sink.

use spindle_chain::{ChainState, CommitSink};
use spindle_types::{BlockNum, GlobalProperties};

/// Records what the storage collaborator would have persisted.
///
/// Keeps the block number and the global properties snapshot of every closed
/// block, so tests can assert on the exact block a round transition landed in.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    commits: Vec<(BlockNum, GlobalProperties)>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every commit so far, oldest first.
    pub fn commits(&self) -> &[(BlockNum, GlobalProperties)] {
        &self.commits
    }

    /// The properties as of the most recent commit.
    pub fn last_properties(&self) -> Option<&GlobalProperties> {
        self.commits.last().map(|(_, properties)| properties)
    }
}

impl CommitSink for MemorySink {
    fn commit_block(&mut self, block_num: BlockNum, state: &ChainState) {
        self.commits.push((block_num, state.global_properties().clone()));
    }
}
