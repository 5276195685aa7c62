//! Router configuration

use super::handlers;
use super::state::AppState;
use crate::config::ServerConfig;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .route("/compile", post(handlers::api_compile))
        .route("/examples", get(handlers::list_examples))
        .route("/examples/:filename", get(handlers::get_example));

    let mut router = Router::new()
        .route("/", get(handlers::index))
        .route("/compile", post(handlers::compile_page))
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(state)
}
