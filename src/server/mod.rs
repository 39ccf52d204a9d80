pub mod errors;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod proxy;
pub mod stream;

use std::sync::Arc;

use axum::middleware as axum_middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::backend::Backend;
use crate::credentials::Credentials;

use self::handlers::AppState;

/// Build the axum router with public and credentialed route split.
pub fn build_router(
    backend: Arc<dyn Backend>,
    http_client: reqwest::Client,
    default_credentials: Option<Credentials>,
    models_cache_max_age: u64,
) -> Router {
    let state = Arc::new(AppState {
        backend: backend.clone(),
        http_client,
        default_credentials,
        models_cache_max_age,
    });

    let caps = backend.capabilities();

    // Public routes (no credentials)
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/templates", get(handlers::templates));

    // Routes that call, or describe a call to, the provider
    let mut protected_routes = Router::new().route("/api/export", post(handlers::export));

    if caps.models {
        protected_routes = protected_routes.route("/api/models", get(handlers::models));
    }

    if caps.chat_completions {
        protected_routes = protected_routes
            .route("/api/chat", post(handlers::chat))
            .route("/api/generate", post(handlers::generate));
    }

    if caps.vision {
        protected_routes = protected_routes.route("/api/vision", post(handlers::vision));
    }

    let protected_routes = protected_routes.layer(axum_middleware::from_fn(
        middleware::credentials_middleware,
    ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum_middleware::from_fn(logging::logging_middleware))
        .with_state(state)
}
