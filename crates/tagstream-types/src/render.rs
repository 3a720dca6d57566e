//! Markup rendering: turns completed blocks back into tag markup.
//!
//! Prior-turn assistant blocks are re-serialized into the same markup the
//! model originally emitted so the conversation can be resubmitted verbatim.
//! A data block renders as `<tag k="v">` + newline + content + newline +
//! `</tag>`; the parser's newline rules make this round-trip exactly.
//!
//! The parser can never produce a block that fails to render, but blocks are
//! plain data anyone can construct, so the tag grammar is enforced here.

use thiserror::Error;

use crate::block::Block;

/// Errors from rendering hand-constructed blocks.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tag name does not match `[a-zA-Z][a-zA-Z0-9-]*`.
    #[error("invalid tag name: {0:?}")]
    InvalidTagName(String),

    /// Attribute key does not match `[a-zA-Z][a-zA-Z0-9-]*`.
    #[error("invalid attribute key {key:?} on tag {tag:?}")]
    InvalidAttributeKey { tag: String, key: String },

    /// Attribute values cannot contain a double quote.
    #[error("attribute {key:?} contains a double quote")]
    UnquotableValue { key: String },
}

/// Check a tag name or attribute key against `[a-zA-Z][a-zA-Z0-9-]*`.
pub fn is_valid_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Render one block to markup.
pub fn render_block(block: &Block) -> Result<String, RenderError> {
    match block {
        Block::Text { content, .. } => Ok(content.clone()),
        Block::Data {
            tag,
            attributes,
            content,
            ..
        } => {
            if !is_valid_name(tag) {
                return Err(RenderError::InvalidTagName(tag.clone()));
            }
            let mut out = String::with_capacity(content.len() + tag.len() * 2 + 16);
            out.push('<');
            out.push_str(tag);
            for (key, value) in attributes {
                if !is_valid_name(key) {
                    return Err(RenderError::InvalidAttributeKey {
                        tag: tag.clone(),
                        key: key.clone(),
                    });
                }
                if value.contains('"') {
                    return Err(RenderError::UnquotableValue { key: key.clone() });
                }
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(value);
                out.push('"');
            }
            out.push_str(">\n");
            out.push_str(content);
            out.push_str("\n</");
            out.push_str(tag);
            out.push('>');
            Ok(out)
        }
    }
}

/// Render a block sequence to a single markup string, blocks joined by `\n`.
pub fn render_blocks(blocks: &[Block]) -> Result<String, RenderError> {
    let rendered: Vec<String> = blocks.iter().map(render_block).collect::<Result<_, _>>()?;
    Ok(rendered.join("\n"))
}
