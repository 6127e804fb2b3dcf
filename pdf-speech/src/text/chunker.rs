//! Text chunking for TTS processing.
//!
//! Chunks are bounded by the engine's maximum input length. Boundaries fall after
//! a period whenever possible; a clause longer than the limit is hard-split by
//! length, which may break mid-word.

use super::TextChunk;

/// Default maximum chunk size in characters.
pub const DEFAULT_CHAR_LIMIT: usize = 4095;

/// A clause (or a piece of a hard-split clause) ready for accumulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// Trimmed text without the terminating period.
    pub text: String,
    /// Whether this piece ends its clause (and so takes the period back).
    pub closes_clause: bool,
}

impl Clause {
    /// Render the clause, re-suffixed with a period if it closes its clause and
    /// the period still fits within `limit`.
    fn render(&self, limit: usize) -> String {
        if self.closes_clause && char_len(&self.text) < limit {
            format!("{}.", self.text)
        } else {
            self.text.clone()
        }
    }
}

/// Split text into chunks of at most `limit` characters.
///
/// A `limit` of zero is treated as one.
///
/// # Returns
/// Chunks in source order; empty when the text has no content.
pub fn chunk_text(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for clause in split_clauses(text, limit) {
        let piece = clause.render(limit);
        let piece_len = char_len(&piece);

        if current.is_empty() {
            current = piece;
            current_len = piece_len;
        } else if current_len + 1 + piece_len <= limit {
            current.push(' ');
            current.push_str(&piece);
            current_len += 1 + piece_len;
        } else {
            chunks.push(std::mem::take(&mut current));
            current = piece;
            current_len = piece_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Split text into clauses on `.`, hard-splitting any clause longer than `limit`.
///
/// Empty and whitespace-only pieces are dropped. Only the last piece of each
/// clause is marked as closing it.
pub fn split_clauses(text: &str, limit: usize) -> Vec<Clause> {
    let limit = limit.max(1);
    let mut clauses = Vec::new();

    for raw in text.split('.') {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let pieces: Vec<String> = hard_split(raw, limit)
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        let last = pieces.len().saturating_sub(1);
        for (i, piece) in pieces.into_iter().enumerate() {
            clauses.push(Clause {
                text: piece,
                closes_clause: i == last,
            });
        }
    }

    clauses
}

/// Hard split text at exact character positions.
pub fn hard_split(text: &str, max_length: usize) -> Vec<String> {
    let max_length = max_length.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let chars: Vec<char> = text.chars().collect();

    while start < chars.len() {
        let end = std::cmp::min(start + max_length, chars.len());
        let chunk: String = chars[start..end].iter().collect();
        chunks.push(chunk);
        start = end;
    }

    chunks
}

/// Chunk a source text into indexed `TextChunk`s.
pub fn prepare_chunks(text: &str, limit: usize) -> Vec<TextChunk> {
    chunk_text(text, limit)
        .into_iter()
        .enumerate()
        .map(|(index, text)| TextChunk::new(index, text))
        .collect()
}

/// Length in characters (not bytes).
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
