/// HTTP routing
use crate::{api, error::ServerError, middleware, state::AppState};
use axum::{middleware as axum_middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub fn create_router(app_state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(api::health::health))
        .route("/healthz", get(api::health::health));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/tracks/:id/stream", get(api::stream::stream_track))
        .route("/tracks/:id/download", get(api::stream::download_track))
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&app_state.auth_service),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/healthz", get(api::health::health))
        .nest("/api", public_routes.merge(protected_routes))
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(app_state)
}

async fn not_found() -> ServerError {
    ServerError::NotFound("No such route".to_string())
}
