// model.rs - metadata about the embedding model behind the endpoint
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingModelInfo {
    pub name: String,
    pub dim: usize,
    pub max_batch: usize,
}

impl EmbeddingModelInfo {
    pub fn new(name: impl Into<String>, dim: usize, max_batch: usize) -> Self {
        Self {
            name: name.into(),
            dim,
            max_batch,
        }
    }

    pub fn mini_lm_l6() -> Self {
        Self::new("all-MiniLM-L6-v2", 384, 64)
    }
}

impl Default for EmbeddingModelInfo {
    fn default() -> Self {
        Self::mini_lm_l6()
    }
}
