use super::{AppState, ErrorResponse};
use crate::auth::{extract_credentials, verify_request, AuthError};
use crate::time;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;


/// Gate admin routes on `X-API-Key` + `X-Timestamp`.
///
/// Runs before the handler's extractors, so a rejected request never has its
/// body read and never reaches the repository.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let credentials = extract_credentials(request.headers());

    match verify_request(&credentials, &state.api_key, time::now_encoded()) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
