use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::OnceCell;

use super::base::{QueryResult, VectorStore};
use super::embedding::OpenAiEmbedder;
use crate::models::car::Car;

const CHROMA_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_COLLECTION: &str = "car-collection";

#[derive(Debug, Clone)]
pub struct ChromaConfig {
    pub host: String,
    pub collection: String,
}

impl ChromaConfig {
    pub fn new(host: String) -> Self {
        Self {
            host,
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

/// HTTP client for a Chroma server holding the car collection.
///
/// The named collection is resolved to its id on first use and cached for
/// the life of the process.
pub struct ChromaStore {
    client: Client,
    config: ChromaConfig,
    embedder: OpenAiEmbedder,
    collection_id: OnceCell<String>,
}

impl ChromaStore {
    pub fn new(config: ChromaConfig, embedder: OpenAiEmbedder) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(CHROMA_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            config,
            embedder,
            collection_id: OnceCell::new(),
        })
    }

    fn url(&self, suffix: &str) -> String {
        format!(
            "{}/api/v1/{}",
            self.config.host.trim_end_matches('/'),
            suffix
        )
    }

    async fn collection_id(&self) -> Result<&str> {
        let id = self
            .collection_id
            .get_or_try_init(|| async {
                let url = self.url(&format!("collections/{}", self.config.collection));
                let response = self.client.get(&url).send().await?;
                if response.status() != StatusCode::OK {
                    return Err(anyhow!(
                        "Collection lookup failed for '{}': {}",
                        self.config.collection,
                        response.status()
                    ));
                }
                let body: Value = response.json().await?;
                body.get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| anyhow!("Collection response missing id"))
            })
            .await?;
        Ok(id)
    }

    /// Create the collection if it does not exist yet, returning its id.
    pub async fn get_or_create_collection(&self) -> Result<String> {
        let response = self
            .client
            .post(self.url("collections"))
            .json(&json!({
                "name": self.config.collection,
                "get_or_create": true,
            }))
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(anyhow!(
                "Collection create failed for '{}': {}",
                self.config.collection,
                response.status()
            ));
        }

        let body: Value = response.json().await?;
        body.get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Collection response missing id"))
    }

    /// Batch-ingest car records: one document, metadata mapping, and
    /// positional string id per car. Returns the number of records added.
    pub async fn add(&self, cars: &[Car]) -> Result<usize> {
        if cars.is_empty() {
            return Ok(0);
        }

        let collection_id = self.get_or_create_collection().await?;
        let documents: Vec<String> = cars.iter().map(Car::document).collect();
        let metadatas: Vec<Value> = cars.iter().map(Car::metadata).collect();
        let ids: Vec<String> = (0..cars.len()).map(|index| index.to_string()).collect();
        let embeddings = self.embedder.embed(&documents).await?;

        let response = self
            .client
            .post(self.url(&format!("collections/{}/add", collection_id)))
            .json(&json!({
                "ids": ids,
                "embeddings": embeddings,
                "documents": documents,
                "metadatas": metadatas,
            }))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(cars.len()),
            status => Err(anyhow!("Add to collection failed: {}", status)),
        }
    }
}

#[async_trait]
impl VectorStore for ChromaStore {
    async fn query(&self, text: &str, n_results: usize) -> Result<QueryResult> {
        let collection_id = self.collection_id().await?;
        let embeddings = self.embedder.embed(&[text.to_string()]).await?;

        let response = self
            .client
            .post(self.url(&format!("collections/{}/query", collection_id)))
            .json(&json!({
                "query_embeddings": embeddings,
                "n_results": n_results,
                "include": ["documents", "metadatas", "distances"],
            }))
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(anyhow!("Query failed: {}", response.status()));
        }

        let body: Value = response.json().await?;
        Ok(flatten_query_response(&body))
    }
}

// Chroma returns one row of parallel arrays per input query; we only ever
// send one query, so take the first row of each.
fn flatten_query_response(body: &Value) -> QueryResult {
    fn first_row(body: &Value, key: &str) -> Vec<Value> {
        body.get(key)
            .and_then(Value::as_array)
            .and_then(|rows| rows.first())
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }

    QueryResult {
        documents: first_row(body, "documents")
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        metadatas: first_row(body, "metadatas"),
        distances: first_row(body, "distances")
            .into_iter()
            .filter_map(|v| v.as_f64().map(|d| d as f32))
            .collect(),
    }
}
