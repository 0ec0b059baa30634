//! SQLite-backed vector store for embedded chunks.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::chunker::{ChunkBatch, ChunkMetadata};
use crate::embedder::Embedder;
use crate::similarity::cosine_distance;

/// Chunks are embedded in slices of this size before insertion.
const BATCH_SIZE: usize = 100;

/// One nearest-neighbor query result.
#[derive(Debug, Clone)]
pub struct QueryMatch {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
    /// Cosine distance to the query (lower is closer).
    pub distance: f32,
}

pub struct VectorStore {
    conn: Connection,
    embedder: Arc<dyn Embedder>,
}

impl VectorStore {
    /// Create a store backed by an in-memory database.
    pub fn new_in_memory(embedder: Arc<dyn Embedder>) -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to create in-memory database")?;
        let store = Self { conn, embedder };
        store.init_schema()?;
        Ok(store)
    }

    /// Open (or create) a database file.
    pub fn open(path: &str, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let conn =
            Connection::open(path).context(format!("Failed to open database at {}", path))?;
        let store = Self { conn, embedder };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS chunks (
                    id TEXT PRIMARY KEY,
                    source TEXT NOT NULL,
                    text TEXT NOT NULL,
                    chunk_index INTEGER NOT NULL,
                    total_chunks INTEGER NOT NULL,
                    chunk_method TEXT NOT NULL,
                    content_hash TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS embeddings (
                    chunk_id TEXT PRIMARY KEY,
                    vector BLOB NOT NULL,
                    FOREIGN KEY (chunk_id) REFERENCES chunks(id)
                );

                CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source);
                "#,
            )
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Embed and insert a chunk batch. Re-adding the same ids replaces the
    /// stored rows, so rebuilding a collection is idempotent. Returns the
    /// number of chunks written.
    pub fn add(&mut self, batch: &ChunkBatch) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        for start in (0..batch.len()).step_by(BATCH_SIZE) {
            let end = (start + BATCH_SIZE).min(batch.len());
            let texts = &batch.texts[start..end];

            let vectors = self
                .embedder
                .embed(texts)
                .context("Failed to embed chunk batch")?;

            let tx = self.conn.transaction().context("Failed to open transaction")?;
            for (offset, vector) in vectors.iter().enumerate() {
                let i = start + offset;
                let id = &batch.ids[i];
                let meta = &batch.metadatas[i];
                let text = &batch.texts[i];

                let hash = hex::encode(Sha256::digest(text.as_bytes()));
                let vector_bytes: Vec<u8> =
                    vector.iter().flat_map(|f| f.to_le_bytes()).collect();

                tx.execute(
                    "INSERT OR REPLACE INTO chunks (id, source, text, chunk_index, total_chunks, chunk_method, content_hash, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        id,
                        meta.source,
                        text,
                        meta.chunk_index,
                        meta.total_chunks,
                        meta.chunk_method,
                        hash,
                        Utc::now().to_rfc3339(),
                    ],
                )
                .context(format!("Failed to insert chunk: {}", id))?;

                tx.execute(
                    "INSERT OR REPLACE INTO embeddings (chunk_id, vector) VALUES (?1, ?2)",
                    params![id, vector_bytes],
                )
                .context(format!("Failed to insert embedding for chunk: {}", id))?;
            }
            tx.commit().context("Failed to commit chunk batch")?;

            info!(inserted = end - start, total = batch.len(), "stored chunk batch");
        }

        Ok(batch.len())
    }

    /// Number of stored chunks.
    pub fn count(&self) -> Result<usize> {
        let count: usize = self
            .conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
            .context("Failed to count chunks")?;
        Ok(count)
    }

    /// Embed the query text and return the `n` nearest chunks by cosine
    /// distance, closest first.
    pub fn query(&self, text: &str, n: usize) -> Result<Vec<QueryMatch>> {
        let query_vec = self
            .embedder
            .embed(&[text.to_string()])
            .context("Failed to embed query")?
            .into_iter()
            .next()
            .context("Embedder returned no vector for query")?;

        let mut stmt = self
            .conn
            .prepare(
                "SELECT c.id, c.source, c.text, c.chunk_index, c.total_chunks, c.chunk_method, e.vector
                 FROM chunks c JOIN embeddings e ON e.chunk_id = c.id",
            )
            .context("Failed to prepare statement")?;

        let mut matches = stmt
            .query_map([], |row| {
                let vector_bytes: Vec<u8> = row.get(6)?;
                let vector: Vec<f32> = vector_bytes
                    .chunks_exact(4)
                    .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                    .collect();
                Ok((
                    QueryMatch {
                        id: row.get(0)?,
                        text: row.get(2)?,
                        metadata: ChunkMetadata {
                            source: row.get(1)?,
                            chunk_index: row.get(3)?,
                            total_chunks: row.get(4)?,
                            chunk_method: row.get(5)?,
                        },
                        distance: 0.0,
                    },
                    vector,
                ))
            })
            .context("Failed to query chunks")?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to collect chunks")?
            .into_iter()
            .map(|(mut m, vector)| {
                m.distance = cosine_distance(&query_vec, &vector);
                m
            })
            .collect::<Vec<_>>();

        matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        matches.truncate(n);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::ChunkMetadata;
    use crate::embedder::EmbedError;

    /// Maps each text to a fixed 3-dim vector keyed on its first letter, so
    /// nearest-neighbor ordering is predictable.
    struct LetterEmbedder;

    impl Embedder for LetterEmbedder {
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Ok(texts
                .iter()
                .map(|t| match t.chars().next() {
                    Some('a') => vec![1.0, 0.0, 0.0],
                    Some('b') => vec![0.0, 1.0, 0.0],
                    _ => vec![0.0, 0.0, 1.0],
                })
                .collect())
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    fn batch(entries: &[(&str, &str)]) -> ChunkBatch {
        let mut b = ChunkBatch::default();
        for (i, (id, text)) in entries.iter().enumerate() {
            b.ids.push(id.to_string());
            b.texts.push(text.to_string());
            b.metadatas.push(ChunkMetadata {
                source: "test.txt".into(),
                chunk_index: i,
                total_chunks: entries.len(),
                chunk_method: "fixed".into(),
            });
        }
        b
    }

    #[test]
    fn test_add_and_count() {
        let mut store = VectorStore::new_in_memory(Arc::new(LetterEmbedder)).unwrap();
        let inserted = store
            .add(&batch(&[("doc_0", "apple"), ("doc_1", "banana")]))
            .unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_re_adding_same_ids_is_idempotent() {
        let mut store = VectorStore::new_in_memory(Arc::new(LetterEmbedder)).unwrap();
        let b = batch(&[("doc_0", "apple"), ("doc_1", "banana")]);
        store.add(&b).unwrap();
        store.add(&b).unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_query_orders_by_distance() {
        let mut store = VectorStore::new_in_memory(Arc::new(LetterEmbedder)).unwrap();
        store
            .add(&batch(&[
                ("doc_0", "apple"),
                ("doc_1", "banana"),
                ("doc_2", "cherry"),
            ]))
            .unwrap();

        let matches = store.query("apricot", 2).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "doc_0");
        assert!(matches[0].distance < 1e-6);
        assert!(matches[0].distance <= matches[1].distance);
    }

    #[test]
    fn test_query_preserves_metadata() {
        let mut store = VectorStore::new_in_memory(Arc::new(LetterEmbedder)).unwrap();
        store.add(&batch(&[("doc_0", "apple")])).unwrap();

        let matches = store.query("anything", 5).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].metadata.source, "test.txt");
        assert_eq!(matches[0].metadata.chunk_method, "fixed");
        assert_eq!(matches[0].text, "apple");
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut store = VectorStore::new_in_memory(Arc::new(LetterEmbedder)).unwrap();
        assert_eq!(store.add(&ChunkBatch::default()).unwrap(), 0);
        assert_eq!(store.count().unwrap(), 0);
    }
}
