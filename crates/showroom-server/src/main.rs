use std::sync::Arc;

use anyhow::Result;
use showroom::agent::Agent;
use showroom::providers::factory;
use showroom::search::chroma::ChromaStore;
use showroom::search::embedding::OpenAiEmbedder;
use showroom::tools::ToolRegistry;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use showroom_server::configuration::Settings;
use showroom_server::routes;
use showroom_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let settings = Settings::new()?;

    // The embedding client shares the LLM provider's credentials; queries
    // must be embedded the same way the collection was built.
    let (openai_host, api_key) = settings.provider.credentials();
    let embedder = OpenAiEmbedder::new(
        openai_host,
        api_key,
        settings.search.embedding_model.clone(),
    )?;
    let store = ChromaStore::new(settings.search.clone().into_config(), embedder)?;

    let provider = factory::get_provider(settings.provider.clone().into_config())?;
    let agent = Agent::new(provider, ToolRegistry::new(Arc::new(store)));
    let state = AppState::new(agent);

    // Create router with CORS support
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(settings.server.socket_addr()).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
