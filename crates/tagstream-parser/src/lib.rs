//! Incremental block parser for streamed model output.
//!
//! Consumes an arbitrarily-chunked stream of characters (the token-by-token
//! output of a model completion) and produces typed blocks (narrative text,
//! or tagged data segments like `<script …>…</script>`) with lifecycle
//! events fired as information becomes available, not only at end of stream.
//!
//! ```text
//! async fragment source ──► BlockStream
//!                               └── BlockParser ── ChunkBuffer
//!                                       │              (residual input)
//!                                       ├── TagScanner (match / withhold)
//!                                       └── parse_attributes
//!                               ──► BlockEvent { create | update | complete }
//! ```
//!
//! The parser never blocks waiting for input it doesn't have, and produces
//! byte-identical results regardless of how the input is chunked, one
//! character at a time or the whole string at once. Malformed markup is not
//! an error: a `<` that never resolves into a tag is just text, and a tag
//! left unclosed at end of stream is completed with whatever content
//! accumulated.
//!
//! # Example
//!
//! ```
//! use tagstream_parser::parse_str;
//!
//! let blocks = parse_str("Run this:<script lang=\"js\">1 + 1</script>");
//! assert_eq!(blocks.len(), 2);
//! assert_eq!(blocks[0].content(), "Run this:");
//! assert_eq!(blocks[1].tag(), Some("script"));
//! assert_eq!(blocks[1].content(), "1 + 1");
//! ```
//!
//! For streaming, feed fragments through [`BlockParser::feed`] /
//! [`BlockParser::finish`], or wrap an async source in [`BlockStream`].

pub mod attrs;
pub mod buffer;
pub mod machine;
pub mod scan;
pub mod stream;

pub use attrs::parse_attributes;
pub use buffer::ChunkBuffer;
pub use machine::{BlockParser, parse_str};
pub use scan::{CloseTagMatch, OpenTagMatch, TagScanner};
pub use stream::BlockStream;

// Re-export the event types alongside their producer.
pub use tagstream_types::{AttrMap, Block, BlockEvent, BlockId, EventKind};
