//! One-time batch ingestion of car records into the vector collection.
//!
//! Reads a JSON array of cars (path from the first argument, default
//! `data/cars.json`), creates the collection if needed, embeds every
//! document, and adds them with positional string ids. Not a runtime
//! dependency of the chat path.
//!
//! Usage: `seed [path/to/cars.json]`, configured through the same
//! environment variables as showroomd (OPENAI host/key, search host and
//! collection).

use anyhow::{Context, Result};
use showroom::models::car::Car;
use showroom::search::chroma::{ChromaConfig, ChromaStore, DEFAULT_COLLECTION};
use showroom::search::embedding::OpenAiEmbedder;
use tracing::info;

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/cars.json".to_string());

    let api_key = std::env::var("SHOWROOM_PROVIDER__API_KEY")
        .context("SHOWROOM_PROVIDER__API_KEY must be set")?;
    let openai_host = env_or("SHOWROOM_PROVIDER__HOST", "https://api.openai.com");
    let search_host = env_or("SHOWROOM_SEARCH__HOST", "http://localhost:8000");
    let collection = env_or("SHOWROOM_SEARCH__COLLECTION", DEFAULT_COLLECTION);
    let embedding_model = env_or("SHOWROOM_SEARCH__EMBEDDING_MODEL", "text-embedding-3-small");

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read car data from {path}"))?;
    let cars: Vec<Car> =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {path}"))?;
    info!(count = cars.len(), path = %path, "loaded car records");

    let embedder = OpenAiEmbedder::new(openai_host, api_key, embedding_model)?;
    let store = ChromaStore::new(
        ChromaConfig {
            host: search_host,
            collection,
        },
        embedder,
    )?;

    let added = store.add(&cars).await?;
    info!(added, "data loaded successfully");

    Ok(())
}
