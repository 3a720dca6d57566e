//! Shared block and event types for tagstream.
//!
//! This crate is the foundation: block identity, the block/event data model,
//! markup rendering, and the consumer-side transcript. It has **no internal
//! tagstream dependencies**: a pure leaf crate that other crates build on.
//!
//! # Data flow
//!
//! ```text
//! model output (chunked text)
//!     └── tagstream-parser ──► BlockEvent { create | update | complete }
//!                                   └── Transcript::apply ──► [Block]
//!                                                                 └── render_blocks ──► markup
//!                                                                     (next model request)
//! ```
//!
//! # Key Types
//!
//! | Type           | Purpose                                        |
//! |----------------|------------------------------------------------|
//! | [`BlockId`]    | Stable block identity (UUIDv7)                 |
//! | [`Block`]      | Text or tagged-data unit of parsed output      |
//! | [`BlockEvent`] | Lifecycle event carrying a full snapshot       |
//! | [`EventKind`]  | create / update / complete                     |
//! | [`AttrMap`]    | Ordered attribute mapping from an opening tag  |
//! | [`Transcript`] | Ordered block list kept current by events      |

pub mod block;
pub mod ids;
pub mod render;
pub mod transcript;

// Re-export primary types at crate root for convenience.
pub use block::{AttrMap, Block, BlockEvent, EventKind};
pub use ids::BlockId;
pub use render::{RenderError, is_valid_name, render_block, render_blocks};
pub use transcript::Transcript;
