//! Chunking engine.
//!
//! Splits plain-text documents into bounded-size, overlapping chunks ready
//! for embedding and retrieval. Four built-in strategies (fixed window,
//! recursive structure, token budget, semantic break) plus an injected
//! external splitter sit behind one dispatcher that degrades gracefully when
//! an optional capability (tokenizer, embedder) is missing.

mod dispatcher;
mod error;
mod fixed;
mod recursive;
mod semantic;
mod separators;
mod token;


pub use dispatcher::{
    ChunkBatch, ChunkConfig, ChunkMetadata, Chunker, ChunkerBuilder, Strategy, TextSplitter,
};
pub use error::ChunkError;
pub use fixed::chunk_fixed;
pub use recursive::chunk_recursive;
pub use semantic::split_sentences;
pub use separators::SEPARATOR_TIERS;

/// Default chunk size in characters
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default overlap between adjacent chunks in characters
pub const DEFAULT_OVERLAP: usize = 50;

/// Minimum fraction of a window that must remain after snapping a boundary
/// back to a word break
pub const MIN_CHUNK_RATIO: f64 = 0.7;

/// Default semantic breakpoint threshold (higher = smaller chunks)
pub const DEFAULT_SEMANTIC_THRESHOLD: f32 = 0.5;

/// Heuristic character-to-token ratio used to convert character budgets
pub const CHARS_PER_TOKEN: usize = 4;

/// Floor on tokens per chunk when converting a character budget
pub const MIN_CHUNK_TOKENS: usize = 50;

/// Floor on overlap tokens when converting a character budget
pub const MIN_OVERLAP_TOKENS: usize = 10;
