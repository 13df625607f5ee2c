mod config;
mod handlers;
mod languages;
mod routes;
mod session;
mod state;
mod translate;
mod websocket;

use anyhow::Result;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("translategemma_ui=debug,tower_http=debug")),
        )
        .init();

    let config = Config::load()?;
    info!(
        "Loaded configuration: ollama_url={}, default_model={}, assets_dir={}",
        config.ollama_url, config.default_model, config.assets_dir
    );

    let addr = config.bind_addr()?;
    let app_state = AppState::new(config)?;

    if !app_state.ollama.is_available().await {
        tracing::warn!(
            "Ollama is not reachable at {}; translations will fail until it is",
            app_state.ollama.base_url()
        );
    }

    // Build application
    let app = Router::new()
        .merge(routes::create_routes(app_state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
