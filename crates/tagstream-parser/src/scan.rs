//! Tag scanning over the residual buffer.
//!
//! All operations here are side-effect-free views over `&str`; the state
//! machine owns every mutation. Two rules make the scanner correct under
//! arbitrary chunking:
//!
//! - **Withhold on ambiguity.** A buffer ending in `...<scri` must not be
//!   flushed as text; the next fragment might complete `<script ...>`. The
//!   partial-prefix operations report the earliest position whose suffix
//!   could still grow into a tag; everything before it is safe to flush,
//!   nothing at or after it is. A `<` whose suffix can no longer form a tag
//!   (e.g. `<1`, `<a >`) is dead and immediately safe to flush as text.
//!
//! - **One character of lookahead at `>`.** A complete tag sitting flush at
//!   the buffer end is withheld until another character (or end of stream)
//!   arrives, because the single `\n` that may follow a tag is consumed and
//!   excluded from content. Matching eagerly would let a chunk boundary
//!   right after `>` change where that newline lands.
//!
//! When attribute values contain `<`, several positions can be live open-tag
//! candidates at once (`<a x="<b>"` …). The committed match is the candidate
//! that completes earliest in the stream (the only choice a single-pass
//! scanner can make), and batch scanning applies the same earliest-end rule
//! so chunked and unchunked parses agree.

use regex::Regex;

/// A fully matched opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTagMatch {
    /// Byte offset where the tag starts; everything before it is text.
    pub text_end: usize,
    /// The tag name.
    pub tag_name: String,
    /// Raw attribute-list substring, for [`crate::attrs::parse_attributes`].
    pub attributes_raw: String,
    /// Total bytes to consume: text, tag, and the optional trailing newline.
    pub matched_len: usize,
}

/// A fully matched closing tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseTagMatch {
    /// Byte offset where the closing tag starts; everything before it is data.
    pub data_end: usize,
    /// Total bytes to consume: data, tag, and the optional trailing newline.
    pub matched_len: usize,
}

/// Compiled tag-grammar matcher.
pub struct TagScanner {
    /// Anchored complete opening tag: name + zero or more `\s+key="value"`
    /// pairs + `>`.
    open_anchor: Regex,
}

impl Default for TagScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TagScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagScanner").finish_non_exhaustive()
    }
}

impl TagScanner {
    /// Compile the tag grammar.
    pub fn new() -> Self {
        let open_anchor =
            Regex::new(r#"^<([a-zA-Z][a-zA-Z0-9-]*)((?:\s+[a-zA-Z][a-zA-Z0-9-]*="[^"]*")*)>"#)
                .expect("open tag pattern is valid");
        Self { open_anchor }
    }

    /// Find a complete opening tag.
    ///
    /// Among all candidate positions, the match that ends earliest wins. The
    /// match is withheld (None) when it ends flush with the buffer and more
    /// input may arrive; `find_partial_open` then keeps it buffered.
    pub fn match_open_tag(&self, buf: &str, at_eof: bool) -> Option<OpenTagMatch> {
        let mut best: Option<(usize, usize, regex::Captures<'_>)> = None;
        for (i, _) in buf.match_indices('<') {
            if let Some((_, best_end, _)) = &best
                && i >= *best_end
            {
                break;
            }
            if let Some(caps) = self.open_anchor.captures(&buf[i..]) {
                let end = i + caps[0].len();
                if best.as_ref().is_none_or(|&(_, e, _)| end < e) {
                    best = Some((i, end, caps));
                }
            }
        }
        let (start, mut end, caps) = best?;
        if end == buf.len() && !at_eof {
            return None;
        }
        if buf[end..].starts_with('\n') {
            end += 1;
        }
        Some(OpenTagMatch {
            text_end: start,
            tag_name: caps[1].to_string(),
            attributes_raw: caps[2].to_string(),
            matched_len: end,
        })
    }

    /// Find the literal `</tag_name>`, plus the optional trailing newline.
    ///
    /// Withheld under the same end-of-buffer lookahead rule as
    /// [`Self::match_open_tag`].
    pub fn match_close_tag(&self, buf: &str, tag_name: &str, at_eof: bool) -> Option<CloseTagMatch> {
        let lit = format!("</{tag_name}>");
        let idx = buf.find(&lit)?;
        let mut end = idx + lit.len();
        if end == buf.len() && !at_eof {
            return None;
        }
        if buf[end..].starts_with('\n') {
            end += 1;
        }
        Some(CloseTagMatch {
            data_end: idx,
            matched_len: end,
        })
    }

    /// Earliest position whose suffix could still grow into an opening tag.
    ///
    /// Everything before the returned index is safe to flush as text.
    pub fn find_partial_open(&self, buf: &str) -> Option<usize> {
        buf.match_indices('<')
            .map(|(i, _)| i)
            .find(|&i| is_open_tag_prefix(&buf[i..]))
    }

    /// Earliest position whose suffix could still grow into `</tag_name>`
    /// (the complete literal counts: it still awaits its newline lookahead).
    ///
    /// Everything before the returned index is safe to flush as data.
    pub fn find_partial_close(&self, buf: &str, tag_name: &str) -> Option<usize> {
        let lit = format!("</{tag_name}>");
        let max = lit.len().min(buf.len());
        (1..=max)
            .rev()
            .find(|&k| buf.ends_with(&lit[..k]))
            .map(|k| buf.len() - k)
    }
}

/// Check whether `s` (which starts with `<`) is a viable prefix of a complete
/// opening tag, i.e. more input could still turn it into one.
fn is_open_tag_prefix(s: &str) -> bool {
    debug_assert!(s.starts_with('<'));
    let mut chars = s.chars().skip(1).peekable();

    // tag name: [a-zA-Z][a-zA-Z0-9-]*
    match chars.peek() {
        None => return true, // bare '<'
        Some(c) if c.is_ascii_alphabetic() => {
            chars.next();
        }
        Some(_) => return false,
    }
    while matches!(chars.peek(), Some(c) if c.is_ascii_alphanumeric() || *c == '-') {
        chars.next();
    }

    // zero or more \s+key="value" pairs, then '>'
    loop {
        match chars.peek() {
            None => return true,
            // complete tag flush with the buffer end: withheld for lookahead
            Some('>') => return true,
            Some(c) if c.is_whitespace() => {}
            Some(_) => return false,
        }
        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }
        match chars.peek() {
            None => return true,
            Some(c) if c.is_ascii_alphabetic() => {
                chars.next();
            }
            Some(_) => return false,
        }
        while matches!(chars.peek(), Some(c) if c.is_ascii_alphanumeric() || *c == '-') {
            chars.next();
        }
        match chars.next() {
            None => return true,
            Some('=') => {}
            Some(_) => return false,
        }
        match chars.next() {
            None => return true,
            Some('"') => {}
            Some(_) => return false,
        }
        // value: anything but '"'
        loop {
            match chars.next() {
                None => return true,
                Some('"') => break,
                Some(_) => {}
            }
        }
    }
}
