//! Consumer-side transcript: applies lifecycle events to an ordered block list.
//!
//! The parser emits full snapshots, so applying an event is a replace-by-id,
//! never a merge. A transcript holds one message's blocks in stream order
//! with an id→index map for O(1) updates while streaming.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::block::{Block, BlockEvent, EventKind};
use crate::ids::BlockId;

/// An ordered list of blocks kept current by applying [`BlockEvent`]s.
///
/// Serializes as its block list; rebuild one from stored blocks with
/// [`Transcript::from_blocks`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    blocks: Vec<Block>,
    #[serde(skip)]
    index: HashMap<BlockId, usize>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a transcript from already-completed blocks.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let index = blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id(), i))
            .collect();
        Self { blocks, index }
    }

    /// Apply one lifecycle event.
    ///
    /// `create` appends; `update` and `complete` replace the stored snapshot
    /// by id. Events for unknown ids are logged and skipped: a transcript
    /// attached mid-stream simply misses blocks created before it attached.
    pub fn apply(&mut self, event: &BlockEvent) {
        let id = event.block_id();
        match event.kind {
            EventKind::Create => {
                if let Some(&i) = self.index.get(&id) {
                    debug!(block = %id.short(), "duplicate create, replacing");
                    self.blocks[i] = event.block.clone();
                } else {
                    self.index.insert(id, self.blocks.len());
                    self.blocks.push(event.block.clone());
                }
            }
            EventKind::Update | EventKind::Complete => {
                match self.index.get(&id) {
                    Some(&i) => self.blocks[i] = event.block.clone(),
                    None => debug!(block = %id.short(), kind = ?event.kind, "event for unknown block, skipping"),
                }
            }
        }
    }

    /// The blocks, in stream order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Look up a block by id.
    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.index.get(&id).map(|&i| &self.blocks[i])
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the transcript has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Consume the transcript, yielding its blocks.
    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// Record an execution result on a completed data block.
    ///
    /// Returns false if the id is unknown or refers to a text block.
    pub fn set_result(&mut self, id: BlockId, value: serde_json::Value) -> bool {
        match self.index.get(&id).map(|&i| &mut self.blocks[i]) {
            Some(Block::Data { result, .. }) => {
                *result = Some(value);
                true
            }
            _ => false,
        }
    }

    /// Record an execution error on a completed data block.
    ///
    /// Returns false if the id is unknown or refers to a text block.
    pub fn set_error(&mut self, id: BlockId, message: impl Into<String>) -> bool {
        match self.index.get(&id).map(|&i| &mut self.blocks[i]) {
            Some(Block::Data { error, .. }) => {
                *error = Some(message.into());
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::AttrMap;

    #[test]
    fn test_create_then_update_replaces_snapshot() {
        let id = BlockId::new();
        let mut t = Transcript::new();
        t.apply(&BlockEvent::create(Block::text(id, "")));
        t.apply(&BlockEvent::update(Block::text(id, "hel")));
        t.apply(&BlockEvent::update(Block::text(id, "hello")));
        t.apply(&BlockEvent::complete(Block::text(id, "hello")));

        assert_eq!(t.len(), 1);
        assert_eq!(t.blocks()[0].content(), "hello");
    }

    #[test]
    fn test_blocks_keep_stream_order() {
        let a = BlockId::new();
        let b = BlockId::new();
        let mut t = Transcript::new();
        t.apply(&BlockEvent::create(Block::text(a, "A")));
        t.apply(&BlockEvent::complete(Block::text(a, "A")));
        t.apply(&BlockEvent::create(Block::data(b, "script", AttrMap::new(), "")));
        t.apply(&BlockEvent::complete(Block::data(b, "script", AttrMap::new(), "B")));

        assert_eq!(t.len(), 2);
        assert_eq!(t.blocks()[0].content(), "A");
        assert_eq!(t.blocks()[1].tag(), Some("script"));
        assert_eq!(t.get(b).unwrap().content(), "B");
    }

    #[test]
    fn test_update_for_unknown_id_is_skipped() {
        let mut t = Transcript::new();
        t.apply(&BlockEvent::update(Block::text(BlockId::new(), "orphan")));
        assert!(t.is_empty());
    }

    #[test]
    fn test_set_result_and_error() {
        let id = BlockId::new();
        let mut t = Transcript::new();
        t.apply(&BlockEvent::create(Block::data(id, "script", AttrMap::new(), "1+1")));

        assert!(t.set_result(id, serde_json::json!(2)));
        match t.get(id).unwrap() {
            Block::Data { result, .. } => assert_eq!(result.as_ref().unwrap(), &serde_json::json!(2)),
            _ => panic!("expected data block"),
        }

        assert!(t.set_error(id, "boom"));
        assert!(!t.set_result(BlockId::new(), serde_json::json!(null)));
    }

    #[test]
    fn test_set_result_on_text_block_fails() {
        let id = BlockId::new();
        let mut t = Transcript::new();
        t.apply(&BlockEvent::create(Block::text(id, "x")));
        assert!(!t.set_result(id, serde_json::json!(1)));
    }

    #[test]
    fn test_from_blocks_rebuilds_index() {
        let id = BlockId::new();
        let t = Transcript::from_blocks(vec![Block::text(id, "x")]);
        assert_eq!(t.get(id).unwrap().content(), "x");
    }
}
