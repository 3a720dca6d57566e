//! Pull-based async adapter over the block state machine.
//!
//! `BlockStream` wraps an asynchronous source of text fragments and yields
//! [`BlockEvent`]s in strict temporal order. A new fragment is pulled only
//! once every event from the previous one has been delivered, so a slow
//! consumer naturally throttles consumption of input, and dropping the
//! stream stops all work; there is no background task.
//!
//! Errors from the source are passed through unmodified and terminate the
//! stream; the parser adds no wrapping of its own.

use std::collections::VecDeque;

use futures::{Stream, StreamExt};

use tagstream_types::{Block, BlockEvent, EventKind};

use crate::machine::BlockParser;

/// Streaming block events over an async fragment source.
#[derive(Debug)]
pub struct BlockStream<S> {
    inner: S,
    parser: BlockParser,
    pending: VecDeque<BlockEvent>,
    done: bool,
}

impl<S, E> BlockStream<S>
where
    S: Stream<Item = Result<String, E>> + Unpin,
{
    /// Wrap a fragment source.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            parser: BlockParser::new(),
            pending: VecDeque::new(),
            done: false,
        }
    }

    /// The next block event, or None once the source is exhausted and every
    /// open block has been finalized.
    ///
    /// A source error is yielded once, after any events already produced,
    /// and ends the stream without finalizing open blocks.
    pub async fn next_event(&mut self) -> Option<Result<BlockEvent, E>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            if self.done {
                return None;
            }
            match self.inner.next().await {
                Some(Ok(fragment)) => {
                    self.pending.extend(self.parser.feed(&fragment));
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    self.pending.extend(self.parser.finish());
                }
            }
        }
    }

    /// Drive the stream to completion, returning the completed blocks.
    pub async fn collect_blocks(mut self) -> Result<Vec<Block>, E> {
        let mut blocks = Vec::new();
        while let Some(event) = self.next_event().await {
            let event = event?;
            if event.kind == EventKind::Complete {
                blocks.push(event.block);
            }
        }
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;

    fn fragments(parts: &[&str]) -> impl Stream<Item = Result<String, std::io::Error>> + Unpin {
        stream::iter(
            parts
                .iter()
                .map(|s| Ok(s.to_string()))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn test_events_in_order() {
        let mut s = BlockStream::new(fragments(&["he", "llo"]));
        let mut kinds = Vec::new();
        while let Some(ev) = s.next_event().await {
            kinds.push(ev.unwrap().kind);
        }
        assert_eq!(
            kinds,
            vec![EventKind::Create, EventKind::Update, EventKind::Update, EventKind::Complete]
        );
    }

    #[tokio::test]
    async fn test_collect_blocks_mixed() {
        let s = BlockStream::new(fragments(&[
            "intro ",
            "<script descr",
            "iption=\"x\">co",
            "de</scri",
            "pt>outro",
        ]));
        let blocks = s.collect_blocks().await.unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].content(), "intro ");
        assert_eq!(blocks[1].tag(), Some("script"));
        assert_eq!(blocks[1].content(), "code");
        assert_eq!(blocks[2].content(), "outro");
    }

    #[tokio::test]
    async fn test_upstream_error_passes_through_and_stops() {
        let source = stream::iter(vec![
            Ok("some text".to_string()),
            Err(std::io::Error::other("connection reset")),
            Ok("never seen".to_string()),
        ]);
        let mut s = BlockStream::new(source);

        let mut saw_error = false;
        let mut events_after_error = 0;
        while let Some(item) = s.next_event().await {
            match item {
                Ok(_) if saw_error => events_after_error += 1,
                Ok(_) => {}
                Err(e) => {
                    assert_eq!(e.to_string(), "connection reset");
                    saw_error = true;
                }
            }
        }
        assert!(saw_error);
        assert_eq!(events_after_error, 0);
    }

    #[tokio::test]
    async fn test_events_before_error_still_delivered() {
        let source = stream::iter(vec![
            Ok("hello".to_string()),
            Err(std::io::Error::other("boom")),
        ]);
        let mut s = BlockStream::new(source);

        // create + update from "hello" arrive before the error
        assert!(s.next_event().await.unwrap().is_ok());
        assert!(s.next_event().await.unwrap().is_ok());
        assert!(s.next_event().await.unwrap().is_err());
        assert!(s.next_event().await.is_none());
    }
}
