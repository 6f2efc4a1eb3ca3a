//! Recursive character splitting with overlap.
//!
//! Text is split on the first separator (in priority order) that occurs in it,
//! each separator staying attached to the start of the piece that follows it.
//! Pieces shorter than `chunk_size` are merged greedily into chunks, and the
//! tail of each finished chunk (at most `chunk_overlap` characters, in whole
//! pieces) is carried into the next one. Pieces that are still too long are
//! split again with the remaining separators; the empty separator splits into
//! single characters.
//!
//! All lengths are counted in characters, not bytes.

use std::collections::VecDeque;

use docqa_vector_store::Document;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// Default maximum chunk length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default overlap between consecutive chunks in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

/// Configuration for the splitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitterConfig {
    /// Maximum chunk length.
    pub chunk_size: usize,

    /// Maximum overlap carried between chunks.
    pub chunk_overlap: usize,

    /// Separators in priority order. An empty string splits into characters.
    pub separators: Vec<String>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: vec![
                "\n\n".to_string(),
                "\n".to_string(),
                " ".to_string(),
                String::new(),
            ],
        }
    }
}

/// Splits documents into overlapping chunks.
#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    config: SplitterConfig,
}

impl RecursiveCharacterSplitter {
    /// Create a splitter with the default separators.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        Self::with_config(SplitterConfig {
            chunk_size,
            chunk_overlap,
            ..SplitterConfig::default()
        })
    }

    /// Create a splitter from a full configuration.
    pub fn with_config(config: SplitterConfig) -> Result<Self> {
        if config.chunk_size == 0 {
            return Err(IngestError::InvalidConfig(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if config.chunk_overlap > config.chunk_size {
            return Err(IngestError::InvalidConfig(format!(
                "chunk overlap ({}) is larger than chunk size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        Ok(Self { config })
    }

    /// The splitter configuration.
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Split text into trimmed, non-empty chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.config.separators)
    }

    /// Split every document, copying its metadata onto each chunk and
    /// numbering the chunks of each document from zero under `chunk`.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        let mut chunks = Vec::new();
        for document in documents {
            let pieces = self.split_text(&document.content);
            debug!(
                "Split {} into {} chunks",
                document.source().unwrap_or("document"),
                pieces.len()
            );
            for (index, piece) in pieces.into_iter().enumerate() {
                chunks.push(
                    Document::new(piece)
                        .with_metadata_map(document.metadata.clone())
                        .with_metadata("chunk", index),
                );
            }
        }
        chunks
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, remaining) = choose_separator(text, separators);
        let splits = split_keeping_separator(text, separator);

        let mut chunks = Vec::new();
        let mut small: Vec<&str> = Vec::new();

        for split in splits {
            if char_len(split) < self.config.chunk_size {
                small.push(split);
                continue;
            }

            if !small.is_empty() {
                chunks.extend(self.merge_splits(&small));
                small.clear();
            }

            if remaining.is_empty() {
                if let Some(piece) = trimmed(split) {
                    chunks.push(piece);
                }
            } else {
                chunks.extend(self.split_recursive(split, remaining));
            }
        }

        if !small.is_empty() {
            chunks.extend(self.merge_splits(&small));
        }

        chunks
    }

    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let chunk_size = self.config.chunk_size;
        let chunk_overlap = self.config.chunk_overlap;

        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for &split in splits {
            let len = char_len(split);

            if total + len > chunk_size {
                if total > chunk_size {
                    warn!("Created a chunk of {total} characters, longer than {chunk_size}");
                }

                if !current.is_empty() {
                    if let Some(chunk) = join(&current) {
                        chunks.push(chunk);
                    }

                    while total > chunk_overlap || (total + len > chunk_size && total > 0) {
                        match current.pop_front() {
                            Some(first) => total -= char_len(first),
                            None => break,
                        }
                    }
                }
            }

            current.push_back(split);
            total += len;
        }

        if let Some(chunk) = join(&current) {
            chunks.push(chunk);
        }

        chunks
    }
}

/// Pick the first separator present in `text`; the empty separator always
/// matches. Returns it with the separators that follow it.
fn choose_separator<'a>(text: &str, separators: &'a [String]) -> (&'a str, &'a [String]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return ("", &[]);
        }
        if text.contains(separator.as_str()) {
            return (separator.as_str(), &separators[i + 1..]);
        }
    }
    ("", &[])
}

/// Split `text` at every occurrence of `separator`, keeping the separator at
/// the start of the following piece. Empty pieces are dropped.
fn split_keeping_separator<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (index, _) in text.match_indices(separator) {
        pieces.push(&text[start..index]);
        start = index;
    }
    pieces.push(&text[start..]);

    pieces.retain(|piece| !piece.is_empty());
    pieces
}

fn join(pieces: &VecDeque<&str>) -> Option<String> {
    let joined: String = pieces.iter().copied().collect();
    trimmed(&joined)
}

fn trimmed(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn splitter(size: usize, overlap: usize) -> RecursiveCharacterSplitter {
        RecursiveCharacterSplitter::new(size, overlap).unwrap()
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = splitter(500, 100).split_text("  Hello world.  ");
        assert_eq!(chunks, vec!["Hello world."]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(splitter(500, 100).split_text("").is_empty());
        assert!(splitter(500, 100).split_text(" \n\n ").is_empty());
    }

    #[test]
    fn test_separator_stays_with_following_piece() {
        assert_eq!(
            split_keeping_separator("a\n\nb\n\nc", "\n\n"),
            vec!["a", "\n\nb", "\n\nc"]
        );
        assert_eq!(split_keeping_separator("\n\n\n", "\n\n"), vec!["\n\n\n"]);
    }

    #[test]
    fn test_paragraphs_become_chunks() {
        let a = "a".repeat(300);
        let b = "b".repeat(300);
        let c = "c".repeat(300);
        let text = format!("{a}\n\n{b}\n\n{c}");

        let chunks = splitter(500, 100).split_text(&text);
        assert_eq!(chunks, vec![a, b, c]);
    }

    #[test]
    fn test_words_overlap_between_chunks() {
        let chunks = splitter(10, 5).split_text("one two three four five");
        assert_eq!(chunks, vec!["one two", "two three", "four five"]);
    }

    #[test]
    fn test_zero_overlap() {
        let chunks = splitter(10, 0).split_text("one two three four five");
        assert_eq!(chunks, vec!["one two", "three", "four five"]);
    }

    #[test]
    fn test_long_word_falls_back_to_characters() {
        let chunks = splitter(4, 0).split_text("abcdefghij");
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_chunks_never_exceed_size() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.\n".repeat(40);
        for chunk in splitter(120, 30).split_text(&text) {
            assert!(char_len(&chunk) <= 120, "chunk too long: {chunk:?}");
        }
    }

    #[test]
    fn test_lengths_count_characters() {
        let text = "é".repeat(8);
        let chunks = splitter(4, 0).split_text(&text);
        assert_eq!(chunks, vec!["éééé", "éééé"]);
    }

    #[test]
    fn test_overlap_larger_than_size_is_rejected() {
        assert!(matches!(
            RecursiveCharacterSplitter::new(100, 200),
            Err(IngestError::InvalidConfig(_))
        ));
        assert!(RecursiveCharacterSplitter::new(0, 0).is_err());
    }

    #[test]
    fn test_split_documents_copies_metadata() {
        let document = Document::new("one two three four five")
            .with_metadata("source", "notes.txt")
            .with_metadata("format", "text");

        let chunks = splitter(10, 0).split_documents(&[document]);

        assert_eq!(chunks.len(), 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.source(), Some("notes.txt"));
            assert_eq!(chunk.metadata.get("format"), Some(&"text".into()));
            assert_eq!(chunk.metadata.get("chunk"), Some(&i.into()));
        }
    }
}
