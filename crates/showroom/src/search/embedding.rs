use anyhow::{anyhow, Result};
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

const EMBEDDING_TIMEOUT_SECS: u64 = 30;

/// Client for the OpenAI embeddings endpoint.
///
/// The vector service stores raw vectors; query and ingestion text is
/// embedded here before it ever reaches the collection, mirroring how the
/// collection was built.
pub struct OpenAiEmbedder {
    client: Client,
    host: String,
    api_key: String,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(host: String, api_key: String, model: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(EMBEDDING_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            host,
            api_key,
            model,
        })
    }

    /// Embed a batch of texts, one vector per input, in input order.
    pub async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/embeddings", self.host.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "input": inputs,
            }))
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(anyhow!("Embedding request failed: {}", response.status()));
        }

        let body: Value = response.json().await?;
        let mut data: Vec<Value> = body
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("Embedding response missing data array"))?
            .clone();

        // the API is allowed to return entries out of order
        data.sort_by_key(|entry| entry.get("index").and_then(Value::as_u64).unwrap_or(0));

        let mut vectors = Vec::with_capacity(data.len());
        for entry in &data {
            let embedding = entry
                .get("embedding")
                .and_then(Value::as_array)
                .ok_or_else(|| anyhow!("Embedding response entry missing embedding"))?;
            vectors.push(
                embedding
                    .iter()
                    .map(|v| v.as_f64().unwrap_or(0.0) as f32)
                    .collect(),
            );
        }

        if vectors.len() != inputs.len() {
            return Err(anyhow!(
                "Embedding response returned {} vectors for {} inputs",
                vectors.len(),
                inputs.len()
            ));
        }

        Ok(vectors)
    }
}
