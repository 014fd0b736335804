use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use geometry::GeneratorRegistry;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

mod ai;
mod build;
mod config;
mod routes;
mod simulation;
mod storage;

use ai::ClaudeAdvisor;
use config::ServerConfig;
use storage::ModelStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub registry: Arc<GeneratorRegistry>,
    pub store: Arc<ModelStore>,
    pub advisor: Option<Arc<ClaudeAdvisor>>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            registry: Arc::new(GeneratorRegistry::default()),
            store: Arc::new(ModelStore::new(config.max_models)),
            advisor: ClaudeAdvisor::from_config(&config).map(Arc::new),
            config: Arc::new(config),
        }
    }
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/generate", post(routes::generate))
        .route("/api/compile", post(routes::compile))
        .route(
            "/api/models/{id}",
            get(routes::get_model).delete(routes::delete_model),
        )
        .route("/api/export/{format}", post(routes::export))
        .route("/api/simulate/structural", post(routes::simulate_structural))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("server=info,geometry=info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = ServerConfig::from_env()?;
    let addr = config.bind_addr();
    let state = AppState::new(config);

    if state.advisor.is_none() {
        tracing::warn!("ANTHROPIC_API_KEY not set, compilation will use zero attachment offsets");
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
