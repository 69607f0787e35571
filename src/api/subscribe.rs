use super::{parse_id, AppState};
use crate::service::ServiceError;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

const NOT_FOUND_BODY: &str = "Module not found";

/// Public download route, no authentication.
pub fn create_subscribe_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/subscribe/modules/:id", get(subscribe_module))
        .with_state(state)
}

/// GET /subscribe/modules/:id - raw module content as a file attachment.
///
/// Speaks plain bytes only; errors are plain text, not the JSON envelope.
async fn subscribe_module(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let Some(id) = parse_id(&id) else {
        return (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response();
    };

    match state.service.subscribe(id).await {
        Ok(subscription) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                (header::CONTENT_DISPOSITION, subscription.content_disposition()),
            ],
            subscription.content,
        )
            .into_response(),
        Err(ServiceError::NotFound) => (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
