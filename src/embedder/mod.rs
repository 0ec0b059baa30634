//! Embedding capability boundary.

mod client;
mod model;
mod types;


pub use client::HttpEmbedder;
pub use model::EmbeddingModelInfo;
pub use types::{EmbeddingRequest, EmbeddingResponse};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("embedding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding API error: {0}")]
    Api(String),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Injected embedding capability: one fixed-length vector per input text,
/// in input order, deterministic for identical input.
pub trait Embedder: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Output dimensionality, constant for a given instance.
    fn dimensions(&self) -> usize;
}
