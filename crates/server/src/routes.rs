use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

pub mod auth;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the application router: health check and the admin auth endpoint
pub fn build_router(cors: CorsLayer, state: auth::ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/admin-auth", post(auth::admin_auth))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // request bodies carry passwords; headers and bodies stay out of spans
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
