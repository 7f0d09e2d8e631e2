use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// The matches for a single query, as parallel arrays ordered by ascending
/// distance (best match first).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub documents: Vec<String>,
    pub metadatas: Vec<Value>,
    pub distances: Vec<f32>,
}

/// Nearest-neighbor search over the car collection.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return the `n_results` closest documents to `text`.
    async fn query(&self, text: &str, n_results: usize) -> Result<QueryResult>;
}
