//! Block and lifecycle-event types.
//!
//! A parsed model response is a sequence of blocks: free-form narrative text,
//! or tagged data segments delimited by `<name attr="val">` … `</name>`
//! pairs. The parser announces each block through lifecycle events:
//!
//! - `create`: the block exists (first text character, or a fully matched
//!   opening tag)
//! - `update`: more content arrived
//! - `complete`: the block is final; the parser forgets it
//!
//! Every event carries a full snapshot of the block at that moment, not a
//! diff, so a consumer can always replace its local copy by id without any
//! prior state.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::ids::BlockId;

/// Attribute mapping parsed from an opening tag. Preserves first-seen order.
pub type AttrMap = IndexMap<String, String>;

/// One unit of parsed output.
///
/// `result` and `error` on data blocks are populated later, by a consumer,
/// after the block is complete; the parser never writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    /// Free-form narrative text, no semantic tag.
    Text {
        /// Stable identity assigned at `create`.
        id: BlockId,
        /// Accumulated text. Only grows between `create` and `complete`.
        content: String,
    },
    /// Content delimited by a named open/close tag pair.
    Data {
        /// Stable identity assigned at `create`.
        id: BlockId,
        /// Tag name from the opening tag (e.g. "script", "file").
        tag: String,
        /// Attributes parsed from the opening tag. Never change after `create`.
        attributes: AttrMap,
        /// Accumulated content between the tags.
        content: String,
        /// Execution result, filled in by a consumer.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<serde_json::Value>,
        /// Execution error, filled in by a consumer.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl Block {
    /// Create a text block.
    pub fn text(id: BlockId, content: impl Into<String>) -> Self {
        Self::Text {
            id,
            content: content.into(),
        }
    }

    /// Create a data block with no result/error.
    pub fn data(id: BlockId, tag: impl Into<String>, attributes: AttrMap, content: impl Into<String>) -> Self {
        Self::Data {
            id,
            tag: tag.into(),
            attributes,
            content: content.into(),
            result: None,
            error: None,
        }
    }

    /// The block's stable identity.
    pub fn id(&self) -> BlockId {
        match self {
            Self::Text { id, .. } | Self::Data { id, .. } => *id,
        }
    }

    /// The block's accumulated content.
    pub fn content(&self) -> &str {
        match self {
            Self::Text { content, .. } | Self::Data { content, .. } => content,
        }
    }

    /// Tag name, if this is a data block.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Text { .. } => None,
            Self::Data { tag, .. } => Some(tag),
        }
    }

    /// Attributes, if this is a data block.
    pub fn attributes(&self) -> Option<&AttrMap> {
        match self {
            Self::Text { .. } => None,
            Self::Data { attributes, .. } => Some(attributes),
        }
    }

    /// Check if this is a text block.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }

    /// Check if this is a data block.
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data { .. })
    }
}

/// Lifecycle stage announced by a [`BlockEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum EventKind {
    /// The block now exists.
    Create,
    /// The block's content changed.
    Update,
    /// The block is final.
    Complete,
}

/// One lifecycle event for exactly one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockEvent {
    /// What happened.
    pub kind: EventKind,
    /// Full snapshot of the block at this moment.
    pub block: Block,
}

impl BlockEvent {
    /// A `create` event carrying the given snapshot.
    pub fn create(block: Block) -> Self {
        Self {
            kind: EventKind::Create,
            block,
        }
    }

    /// An `update` event carrying the given snapshot.
    pub fn update(block: Block) -> Self {
        Self {
            kind: EventKind::Update,
            block,
        }
    }

    /// A `complete` event carrying the given snapshot.
    pub fn complete(block: Block) -> Self {
        Self {
            kind: EventKind::Complete,
            block,
        }
    }

    /// Identity of the block this event refers to.
    pub fn block_id(&self) -> BlockId {
        self.block.id()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> AttrMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_block_accessors() {
        let id = BlockId::new();
        let text = Block::text(id, "hello");
        assert_eq!(text.id(), id);
        assert_eq!(text.content(), "hello");
        assert!(text.is_text());
        assert_eq!(text.tag(), None);

        let data = Block::data(id, "script", attrs(&[("description", "x")]), "code");
        assert!(data.is_data());
        assert_eq!(data.tag(), Some("script"));
        assert_eq!(data.attributes().unwrap()["description"], "x");
    }

    #[test]
    fn test_text_block_serde_shape() {
        let block = Block::text(BlockId::nil(), "hi");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["content"], "hi");
    }

    #[test]
    fn test_data_block_serde_omits_empty_result() {
        let block = Block::data(BlockId::nil(), "file", AttrMap::new(), "x");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "data");
        assert!(json.get("result").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_data_block_serde_roundtrip() {
        let block = Block::data(
            BlockId::new(),
            "script",
            attrs(&[("description", "update title")]),
            "document.title = \"x\";",
        );
        let json = serde_json::to_string(&block).unwrap();
        let parsed: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(block, parsed);
    }

    #[test]
    fn test_attribute_order_preserved() {
        let a = attrs(&[("foo", "bar"), ("baz", "qux"), ("id", "123")]);
        let keys: Vec<&str> = a.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["foo", "baz", "id"]);
    }

    #[test]
    fn test_event_kind_from_str() {
        assert_eq!(EventKind::from_str("create").unwrap(), EventKind::Create);
        assert_eq!(EventKind::from_str("Update").unwrap(), EventKind::Update);
        assert!(EventKind::from_str("destroy").is_err());
    }

    #[test]
    fn test_event_constructors() {
        let block = Block::text(BlockId::new(), "a");
        let ev = BlockEvent::create(block.clone());
        assert_eq!(ev.kind, EventKind::Create);
        assert_eq!(ev.block_id(), block.id());
    }
}
