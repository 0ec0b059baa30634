// Public API exports
pub mod chunker;
pub mod embedder;
pub mod loader;
pub mod similarity;
pub mod store;
pub mod tokenizer;

// Re-export main types for convenience
pub use chunker::{
    ChunkBatch, ChunkConfig, ChunkError, ChunkMetadata, Chunker, ChunkerBuilder, Strategy,
    TextSplitter, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP, DEFAULT_SEMANTIC_THRESHOLD,
};

pub use embedder::{EmbedError, Embedder, EmbeddingModelInfo, HttpEmbedder};

pub use loader::{load_documents, Document};

pub use similarity::{cosine_distance, cosine_similarity};

pub use store::{QueryMatch, VectorStore};

pub use tokenizer::{Tokenizer, TokenizerError, WordTokenizer};
