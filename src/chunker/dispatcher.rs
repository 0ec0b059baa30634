//! Strategy selection, capability probing, and batch assembly.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::ChunkError;
use super::{fixed, recursive, semantic, token};
use super::{DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP, DEFAULT_SEMANTIC_THRESHOLD};
use crate::embedder::Embedder;
use crate::loader::Document;
use crate::tokenizer::Tokenizer;

/// Chunking strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Fixed,
    Recursive,
    Token,
    Semantic,
    /// Delegates to an injected external splitter capability.
    External,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Fixed => "fixed",
            Strategy::Recursive => "recursive",
            Strategy::Token => "token",
            Strategy::Semantic => "semantic",
            Strategy::External => "external",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ChunkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(Strategy::Fixed),
            "recursive" => Ok(Strategy::Recursive),
            "token" => Ok(Strategy::Token),
            "semantic" => Ok(Strategy::Semantic),
            "external" => Ok(Strategy::External),
            other => Err(ChunkError::UnknownStrategy(other.to_string())),
        }
    }
}

/// External splitter capability for the `external` strategy. The splitting
/// algorithm behind it is the capability's own business.
pub trait TextSplitter: Send + Sync {
    fn split(&self, text: &str, chunk_size: usize, overlap: usize) -> anyhow::Result<Vec<String>>;
}

/// Configuration for one chunking run.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    pub strategy: Strategy,
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between adjacent chunks in characters; must stay below
    /// `chunk_size` and is clamped to a quarter of it otherwise.
    pub overlap: usize,
    /// Semantic breakpoint threshold in [0, 1].
    pub semantic_threshold: f32,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Recursive,
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
            semantic_threshold: DEFAULT_SEMANTIC_THRESHOLD,
        }
    }
}

/// Per-chunk metadata for attribution in the vector store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Source document name.
    pub source: String,
    /// 0-based index within the source document.
    pub chunk_index: usize,
    /// Total chunks emitted for the source document.
    pub total_chunks: usize,
    /// Strategy tag actually used (after any capability fallback).
    pub chunk_method: String,
}

/// Three parallel sequences ready for a vector-store
/// `add(ids, texts, metadatas)` call.
#[derive(Debug, Clone, Default)]
pub struct ChunkBatch {
    pub texts: Vec<String>,
    pub metadatas: Vec<ChunkMetadata>,
    pub ids: Vec<String>,
}

impl ChunkBatch {
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Mutable builder wiring optional capabilities into a [`Chunker`].
pub struct ChunkerBuilder {
    config: ChunkConfig,
    tokenizer: Option<Arc<dyn Tokenizer>>,
    embedder: Option<Arc<dyn Embedder>>,
    splitter: Option<Arc<dyn TextSplitter>>,
}

impl ChunkerBuilder {
    fn new(config: ChunkConfig) -> Self {
        Self {
            config,
            tokenizer: None,
            embedder: None,
            splitter: None,
        }
    }

    pub fn tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn splitter(mut self, splitter: Arc<dyn TextSplitter>) -> Self {
        self.splitter = Some(splitter);
        self
    }

    /// Validate the configuration and resolve the effective strategy once,
    /// probing capability availability up front instead of branching on
    /// failures per call.
    pub fn build(self) -> Result<Chunker, ChunkError> {
        let mut config = self.config;

        if config.chunk_size == 0 {
            return Err(ChunkError::InvalidChunkSize);
        }
        if !(0.0..=1.0).contains(&config.semantic_threshold) {
            return Err(ChunkError::InvalidThreshold(config.semantic_threshold));
        }
        if config.overlap >= config.chunk_size {
            let clamped = config.chunk_size / 4;
            warn!(
                overlap = config.overlap,
                chunk_size = config.chunk_size,
                clamped,
                "overlap must stay below chunk_size; clamping"
            );
            config.overlap = clamped;
        }

        let effective = resolve_strategy(
            config.strategy,
            self.tokenizer.is_some(),
            self.embedder.is_some(),
            self.splitter.is_some(),
        );

        Ok(Chunker {
            config,
            effective,
            tokenizer: self.tokenizer,
            embedder: self.embedder,
            splitter: self.splitter,
        })
    }
}

fn resolve_strategy(
    requested: Strategy,
    has_tokenizer: bool,
    has_embedder: bool,
    has_splitter: bool,
) -> Strategy {
    let available = match requested {
        Strategy::Token => has_tokenizer,
        Strategy::Semantic => has_embedder,
        Strategy::External => has_splitter,
        Strategy::Fixed | Strategy::Recursive => true,
    };
    if available {
        requested
    } else {
        warn!(
            strategy = requested.as_str(),
            "required capability unavailable; falling back to recursive chunking"
        );
        Strategy::Recursive
    }
}

/// Strategy dispatcher. Construction validates the configuration; after
/// that, chunking never fails -- capability errors degrade to the recursive
/// strategy and empty input yields zero chunks.
pub struct Chunker {
    config: ChunkConfig,
    effective: Strategy,
    tokenizer: Option<Arc<dyn Tokenizer>>,
    embedder: Option<Arc<dyn Embedder>>,
    splitter: Option<Arc<dyn TextSplitter>>,
}

impl Chunker {
    pub fn builder(config: ChunkConfig) -> ChunkerBuilder {
        ChunkerBuilder::new(config)
    }

    /// Build with no optional capabilities.
    pub fn new(config: ChunkConfig) -> Result<Self, ChunkError> {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// The strategy that will actually run, after capability probing.
    pub fn effective_strategy(&self) -> Strategy {
        self.effective
    }

    /// Chunk one text into an ordered sequence of trimmed, non-empty chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        self.chunk_with_method(text).0
    }

    /// Chunk a batch of documents into parallel (texts, metadatas, ids)
    /// sequences. Ids increment across the whole batch, never resetting per
    /// document; per-document index and total come from that document's own
    /// chunks.
    pub fn chunk_batch(&self, documents: &[Document]) -> ChunkBatch {
        let mut batch = ChunkBatch::default();
        let mut next_id = 0usize;

        for doc in documents {
            let (chunks, method) = self.chunk_with_method(&doc.content);
            let total = chunks.len();
            for (index, text) in chunks.into_iter().enumerate() {
                batch.texts.push(text);
                batch.metadatas.push(ChunkMetadata {
                    source: doc.name.clone(),
                    chunk_index: index,
                    total_chunks: total,
                    chunk_method: method.as_str().to_string(),
                });
                batch.ids.push(format!("doc_{next_id}"));
                next_id += 1;
            }
        }

        batch
    }

    /// Runs the effective strategy and reports which one actually produced
    /// the output, accounting for runtime capability failures.
    fn chunk_with_method(&self, text: &str) -> (Vec<String>, Strategy) {
        let size = self.config.chunk_size;
        let overlap = self.config.overlap;

        if text.trim().is_empty() {
            return (Vec::new(), self.effective);
        }

        match self.effective {
            Strategy::Fixed => (fixed::chunk_fixed(text, size, overlap), Strategy::Fixed),
            Strategy::Recursive => (
                recursive::chunk_recursive(text, size, overlap),
                Strategy::Recursive,
            ),
            Strategy::Token => {
                let Some(tokenizer) = self.tokenizer.as_deref() else {
                    return self.fall_back(text, "tokenizer missing");
                };
                let (max_tokens, overlap_tokens) = token::token_budget(size, overlap);
                match token::chunk_tokens(text, max_tokens, overlap_tokens, tokenizer) {
                    Ok(chunks) => (chunks, Strategy::Token),
                    Err(err) => self.fall_back(text, &err.to_string()),
                }
            }
            Strategy::Semantic => {
                let Some(embedder) = self.embedder.as_deref() else {
                    return self.fall_back(text, "embedder missing");
                };
                match semantic::chunk_semantic(
                    text,
                    size,
                    self.config.semantic_threshold,
                    embedder,
                ) {
                    Ok(chunks) => (chunks, Strategy::Semantic),
                    Err(err) => self.fall_back(text, &err.to_string()),
                }
            }
            Strategy::External => {
                let Some(splitter) = self.splitter.as_deref() else {
                    return self.fall_back(text, "external splitter missing");
                };
                match splitter.split(text, size, overlap) {
                    Ok(chunks) => (
                        chunks
                            .into_iter()
                            .map(|c| c.trim().to_string())
                            .filter(|c| !c.is_empty())
                            .collect(),
                        Strategy::External,
                    ),
                    Err(err) => self.fall_back(text, &err.to_string()),
                }
            }
        }
    }

    fn fall_back(&self, text: &str, cause: &str) -> (Vec<String>, Strategy) {
        warn!(
            strategy = self.effective.as_str(),
            cause, "capability failed; falling back to recursive chunking"
        );
        (
            recursive::chunk_recursive(text, self.config.chunk_size, self.config.overlap),
            Strategy::Recursive,
        )
    }
}
