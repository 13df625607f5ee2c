use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{debug, warn};

use crate::languages;
use crate::state::AppState;
use crate::translate::{
    TranslateError, TranslationRequest, TranslationResult, Translator, ValidationError,
};

const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";

pub fn create_routes(state: AppState) -> Router<AppState> {
    let assets_root = state.config.assets_path();

    let assets = Router::new()
        .nest_service("/assets", ServeDir::new(assets_root.join("assets")))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(IMMUTABLE_CACHE),
        ));

    Router::new()
        // Session socket
        .route("/ws", get(websocket_handler))

        // REST API routes
        .route("/api/health", get(health_check))
        .route("/api/languages", get(list_languages))
        .route("/api/translate", post(translate))

        // Static file serving
        .merge(assets)
        .fallback_service(ServeDir::new(assets_root).append_index_html_on_directories(true))
}

async fn websocket_handler(
    ws: axum::extract::ws::WebSocketUpgrade,
    State(state): State<AppState>,
) -> axum::response::Response {
    crate::websocket::websocket_handler(ws, State(state)).await
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let ollama_healthy = state.ollama.is_available().await;
    Json(json!({
        "status": "ok",
        "ollama": ollama_healthy,
        "sessions": state.sessions.len(),
    }))
}

#[derive(Debug, Default, Deserialize)]
struct LanguageQuery {
    #[serde(default)]
    q: String,
    exclude: Option<String>,
}

async fn list_languages(Query(query): Query<LanguageQuery>) -> Json<Value> {
    let matches = languages::search(&query.q, query.exclude.as_deref());
    Json(json!(matches))
}

async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TranslationResult>, (StatusCode, Json<Value>)> {
    let bad_request = |e: ValidationError| (StatusCode::BAD_REQUEST, Json(json!({"error": e.to_string()})));

    let Json(payload) = payload.map_err(|rejection| {
        debug!("Rejected translate body: {}", rejection);
        bad_request(ValidationError::InvalidInput)
    })?;
    let request = TranslationRequest::parse(&payload).map_err(bad_request)?;

    state.translator.translate(request).await.map(Json).map_err(|e| {
        let status = match &e {
            TranslateError::Validation(_) => StatusCode::BAD_REQUEST,
            _ if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            TranslateError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        warn!("Translate request failed with {}: {}", status, e);
        (status, Json(json!({"error": e.to_string()})))
    })
}
