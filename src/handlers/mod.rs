pub mod checkout;
pub mod webhooks;

use axum::{
    Json, Router,
    http::{Method, header},
    routing::get,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// All routes, without middleware layers.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(checkout::router())
        .merge(webhooks::router())
}

/// Browser checkout calls these endpoints cross-origin.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// The full application: routes, CORS, request tracing and state.
pub fn app(state: AppState) -> Router {
    router()
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
