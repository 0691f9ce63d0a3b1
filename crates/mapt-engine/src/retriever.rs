//! Lexical reference retriever — chunking plus token-overlap ranking.
//!
//! A lightweight, in-process stand-in for a vector store: reference text is
//! split into overlapping chunks and ranked against the query by shared
//! word count. Good enough to keep the full pipeline runnable end to end;
//! callers needing semantic recall can wire any other
//! [`ContextRetriever`](crate::provider::ContextRetriever) instead.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::debug;

use crate::provider::{ContextRetriever, RetrievalError};

/// Split text into overlapping character chunks.
///
/// `overlap` characters of each chunk are repeated at the start of the next
/// so sentences cut at a boundary still appear whole somewhere.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || chunk_size == 0 {
        return Vec::new();
    }
    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// Lowercased alphanumeric words of a text.
fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Token-overlap retriever over pre-chunked reference text.
#[derive(Debug)]
pub struct LexicalRetriever {
    chunks: Vec<String>,
    token_sets: Vec<HashSet<String>>,
}

impl LexicalRetriever {
    /// Build from already-chunked snippets.
    pub fn new(chunks: Vec<String>) -> Self {
        let token_sets = chunks.iter().map(|chunk| tokenize(chunk)).collect();
        Self { chunks, token_sets }
    }

    /// Chunk raw reference text and build the retriever in one step.
    pub fn from_text(text: &str, chunk_size: usize, overlap: usize) -> Self {
        Self::new(chunk_text(text, chunk_size, overlap))
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[async_trait]
impl ContextRetriever for LexicalRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>, RetrievalError> {
        let query_tokens = tokenize(query);
        let mut scored: Vec<(usize, usize)> = self
            .token_sets
            .iter()
            .enumerate()
            .map(|(index, tokens)| (index, tokens.intersection(&query_tokens).count()))
            .filter(|&(_, score)| score > 0)
            .collect();
        // Highest overlap first; document order breaks ties.
        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let snippets: Vec<String> = scored
            .into_iter()
            .take(k)
            .map(|(index, _)| self.chunks[index].clone())
            .collect();
        debug!(candidates = self.chunks.len(), returned = snippets.len(), "lexical retrieval");
        Ok(snippets)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
