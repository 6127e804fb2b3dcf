//! Text processing for TTS: normalization and chunking.

pub mod chunker;
mod cleaner;

pub use chunker::{DEFAULT_CHAR_LIMIT, prepare_chunks};
pub use cleaner::normalize_text;

/// A chunk of text submitted as one synthesis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position of the chunk in the source (0-indexed)
    pub index: usize,
    /// The text content
    pub text: String,
}

impl TextChunk {
    /// Create a new text chunk.
    pub fn new(index: usize, text: String) -> Self {
        Self { index, text }
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        chunker::char_len(&self.text)
    }
}
