// HTTP surface: admin module CRUD behind the API key guard, public subscription downloads

pub mod auth_middleware;
pub mod modules;
pub mod subscribe;

pub use auth_middleware::require_api_key;
pub use modules::create_module_router;
pub use subscribe::create_subscribe_router;

use crate::service::ModuleService;
use axum::http::{header, HeaderName, Method};
use axum::Router;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

/// State shared by every route.
#[derive(Clone)]
pub struct AppState {
    pub service: ModuleService,
    /// Shared secret expected in `X-API-Key`
    pub api_key: String,
}

/// JSON error envelope, `{"error": "..."}`
#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub error: String,
}

/// Full application router with CORS and request tracing.
pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .merge(create_module_router(Arc::clone(&state)))
        .merge(create_subscribe_router(state))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(crate::auth::API_KEY_HEADER),
            HeaderName::from_static(crate::auth::TIMESTAMP_HEADER),
        ])
        .expose_headers([header::CONTENT_LENGTH, header::CONTENT_DISPOSITION])
        .max_age(CORS_MAX_AGE)
}

/// Path ids that are not base-10 integers can never match a stored module.
pub(crate) fn parse_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}
