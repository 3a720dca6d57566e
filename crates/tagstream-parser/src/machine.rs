//! The block state machine.
//!
//! `BlockParser` is the driver: it owns the residual buffer, the current
//! scan mode, and the identity of the one block currently being built, and
//! emits lifecycle events as information becomes available. Feeding is
//! synchronous and run-to-completion: each `feed` drains the buffer to a
//! stable withheld point and returns the events that fired, in order.
//!
//! Exactly one block is open at any instant. A text block is created lazily
//! on the first flushed character; a data block is created the moment its
//! opening tag fully matches. At end of stream any open block is completed
//! with whatever content accumulated: model output can be truncated, so an
//! unclosed tag is best-effort content, not an error.

use tracing::{debug, trace};

use tagstream_types::{AttrMap, Block, BlockEvent, BlockId};

use crate::attrs::parse_attributes;
use crate::buffer::ChunkBuffer;
use crate::scan::TagScanner;

/// Current scan mode.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ScanState {
    /// Accumulating narrative text, watching for an opening tag.
    Text,
    /// Inside a data block, watching for `</tag>`.
    Data { tag: String },
}

/// The block currently being built.
#[derive(Debug)]
enum Open {
    Text {
        id: BlockId,
        content: String,
    },
    Data {
        id: BlockId,
        tag: String,
        attributes: AttrMap,
        content: String,
    },
}

impl Open {
    fn snapshot(&self) -> Block {
        match self {
            Self::Text { id, content } => Block::text(*id, content.clone()),
            Self::Data {
                id,
                tag,
                attributes,
                content,
            } => Block::data(*id, tag.clone(), attributes.clone(), content.clone()),
        }
    }

    fn into_snapshot(self) -> Block {
        match self {
            Self::Text { id, content } => Block::text(id, content),
            Self::Data {
                id,
                tag,
                attributes,
                content,
            } => Block::data(id, tag, attributes, content),
        }
    }
}

/// Incremental parser turning chunked model output into block events.
///
/// Pure state machine with no async of its own: `feed` each fragment as it
/// arrives, then `finish` once the stream ends. For an async source, wrap it
/// in [`crate::BlockStream`] instead.
#[derive(Debug)]
pub struct BlockParser {
    scanner: TagScanner,
    buffer: ChunkBuffer,
    state: ScanState,
    open: Option<Open>,
    finished: bool,
}

impl Default for BlockParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockParser {
    /// Create a parser in the initial state: scanning text, no open block.
    pub fn new() -> Self {
        Self {
            scanner: TagScanner::new(),
            buffer: ChunkBuffer::new(),
            state: ScanState::Text,
            open: None,
            finished: false,
        }
    }

    /// Feed one input fragment, returning the events it triggered in order.
    pub fn feed(&mut self, fragment: &str) -> Vec<BlockEvent> {
        if self.finished {
            debug!("feed after finish ignored");
            return Vec::new();
        }
        self.buffer.append(fragment);
        let mut events = Vec::new();
        self.drain(false, &mut events);
        events
    }

    /// Signal end of stream and flush everything still open.
    ///
    /// Idempotent; later calls return no events.
    pub fn finish(&mut self) -> Vec<BlockEvent> {
        if self.finished {
            return Vec::new();
        }
        self.finished = true;
        let mut events = Vec::new();
        self.drain(true, &mut events);
        // an unclosed data block gets the same trailing-newline trim a
        // closed one would
        if let Some(Open::Data { content, .. }) = &mut self.open
            && content.ends_with('\n')
        {
            content.pop();
        }
        self.complete_open(&mut events);
        events
    }

    /// Run scan passes until no further progress is possible with the
    /// currently buffered input.
    fn drain(&mut self, at_eof: bool, events: &mut Vec<BlockEvent>) {
        loop {
            let close_tag = match &self.state {
                ScanState::Text => None,
                ScanState::Data { tag } => Some(tag.clone()),
            };
            match close_tag {
                None => {
                    if let Some(m) = self.scanner.match_open_tag(self.buffer.peek(), at_eof) {
                        let consumed = self.buffer.consume(m.matched_len);
                        let text_before = &consumed[..m.text_end];
                        if !text_before.is_empty() {
                            self.push_text(text_before, events);
                        }
                        // a zero-content close of an already-open text block
                        // still completes it; it is never silently dropped
                        self.complete_open(events);

                        let id = BlockId::new();
                        debug!(block = %id.short(), tag = %m.tag_name, "data block opened");
                        let open = Open::Data {
                            id,
                            tag: m.tag_name.clone(),
                            attributes: parse_attributes(&m.attributes_raw),
                            content: String::new(),
                        };
                        events.push(BlockEvent::create(open.snapshot()));
                        self.open = Some(open);
                        self.state = ScanState::Data { tag: m.tag_name };
                        continue;
                    }

                    let split = if at_eof {
                        self.buffer.len()
                    } else {
                        let withheld = self.scanner.find_partial_open(self.buffer.peek());
                        if let Some(at) = withheld {
                            trace!(at, "withholding possible tag prefix");
                        }
                        withheld.unwrap_or(self.buffer.len())
                    };
                    if split > 0 {
                        let flushed = self.buffer.consume(split);
                        self.push_text(&flushed, events);
                    }
                    break;
                }
                Some(tag) => {
                    if let Some(m) = self.scanner.match_close_tag(self.buffer.peek(), &tag, at_eof)
                    {
                        let consumed = self.buffer.consume(m.matched_len);
                        if let Some(Open::Data { content, .. }) = &mut self.open {
                            content.push_str(&consumed[..m.data_end]);
                            if content.ends_with('\n') {
                                content.pop();
                            }
                        }
                        if let Some(open) = &self.open {
                            events.push(BlockEvent::update(open.snapshot()));
                        }
                        self.complete_open(events);
                        self.state = ScanState::Text;
                        continue;
                    }

                    let split = if at_eof {
                        self.buffer.len()
                    } else {
                        let withheld = self.scanner.find_partial_close(self.buffer.peek(), &tag);
                        if let Some(at) = withheld {
                            trace!(at, tag = %tag, "withholding possible close prefix");
                        }
                        withheld.unwrap_or(self.buffer.len())
                    };
                    if split > 0 {
                        let flushed = self.buffer.consume(split);
                        if let Some(Open::Data { content, .. }) = &mut self.open {
                            content.push_str(&flushed);
                        }
                        if let Some(open) = &self.open {
                            events.push(BlockEvent::update(open.snapshot()));
                        }
                    }
                    break;
                }
            }
        }
    }

    /// Append flushed text, creating the text block lazily on first content.
    fn push_text(&mut self, text: &str, events: &mut Vec<BlockEvent>) {
        debug_assert!(!text.is_empty());
        if self.open.is_none() {
            let id = BlockId::new();
            debug!(block = %id.short(), "text block opened");
            let open = Open::Text {
                id,
                content: String::new(),
            };
            events.push(BlockEvent::create(open.snapshot()));
            self.open = Some(open);
        }
        if let Some(Open::Text { content, .. }) = &mut self.open {
            content.push_str(text);
        }
        if let Some(open) = &self.open {
            events.push(BlockEvent::update(open.snapshot()));
        }
    }

    /// Complete and forget the open block, if any.
    fn complete_open(&mut self, events: &mut Vec<BlockEvent>) {
        if let Some(open) = self.open.take() {
            let block = open.into_snapshot();
            debug!(block = %block.id().short(), "block complete");
            events.push(BlockEvent::complete(block));
        }
    }
}

/// Parse a complete string in one pass, returning the completed blocks.
pub fn parse_str(input: &str) -> Vec<Block> {
    let mut parser = BlockParser::new();
    let mut events = parser.feed(input);
    events.extend(parser.finish());
    events
        .into_iter()
        .filter(|e| e.kind == tagstream_types::EventKind::Complete)
        .map(|e| e.block)
        .collect()
}
