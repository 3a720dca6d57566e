//! Residual input buffer between scan passes.
//!
//! Holds whatever part of the stream has arrived but not yet been classified
//! as text or tag markup. Fully consumed prefixes are never retained, so the
//! buffer grows only with the longest currently-unresolved partial match,
//! never with total stream length.

/// The unconsumed residual of the input stream.
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    buf: String,
}

impl ChunkBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a newly arrived fragment.
    pub fn append(&mut self, fragment: &str) {
        self.buf.push_str(fragment);
    }

    /// The current unconsumed content.
    pub fn peek(&self) -> &str {
        &self.buf
    }

    /// Remove and return the first `n` bytes.
    ///
    /// `n` must lie on a char boundary; all offsets produced by the scanner
    /// do.
    pub fn consume(&mut self, n: usize) -> String {
        debug_assert!(self.buf.is_char_boundary(n));
        self.buf.drain(..n).collect()
    }

    /// Unconsumed length in bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
