use thiserror::Error;

/// Fatal configuration errors. These abort before any chunking begins;
/// capability failures (missing tokenizer, embedder errors) never surface
/// here -- they degrade to the recursive strategy instead.
#[derive(Error, Debug)]
pub enum ChunkError {
    #[error("unknown chunking strategy '{0}' (options: fixed, recursive, token, semantic, external)")]
    UnknownStrategy(String),

    #[error("chunk_size must be positive")]
    InvalidChunkSize,

    #[error("semantic threshold must be in 0.0..=1.0, got {0}")]
    InvalidThreshold(f32),
}
