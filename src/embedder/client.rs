// client.rs - blocking HTTP embedder
use std::time::Duration;

use reqwest::blocking::Client;

use super::types::{EmbeddingRequest, EmbeddingResponse};
use super::{EmbedError, Embedder, EmbeddingModelInfo};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Talks to an embedding server exposing `POST {endpoint}/embed` with a
/// `{"texts": [...]}` body. Calls are bounded by a timeout; a timeout is a
/// capability failure like any other and triggers the dispatcher fallback
/// upstream.
pub struct HttpEmbedder {
    http: Client,
    endpoint: String,
    model: EmbeddingModelInfo,
}

impl HttpEmbedder {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, EmbedError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EmbedError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            model: EmbeddingModelInfo::default(),
        })
    }

    pub fn with_model(mut self, model: EmbeddingModelInfo) -> Self {
        self.model = model;
        self
    }

    pub fn model(&self) -> &EmbeddingModelInfo {
        &self.model
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let req = EmbeddingRequest {
            texts: texts.to_vec(),
        };
        let res: EmbeddingResponse = self
            .http
            .post(format!("{}/embed", self.endpoint))
            .json(&req)
            .send()?
            .error_for_status()?
            .json()?;

        if res.embeddings.len() != texts.len() {
            return Err(EmbedError::Api(format!(
                "server returned {} embeddings for {} texts",
                res.embeddings.len(),
                texts.len()
            )));
        }
        for vector in &res.embeddings {
            if vector.len() != self.model.dim {
                return Err(EmbedError::DimensionMismatch {
                    expected: self.model.dim,
                    actual: vector.len(),
                });
            }
        }
        Ok(res.embeddings)
    }
}

impl Embedder for HttpEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let mut all = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.model.max_batch.max(1)) {
            all.extend(self.embed_batch(batch)?);
        }
        Ok(all)
    }

    fn dimensions(&self) -> usize {
        self.model.dim
    }
}
