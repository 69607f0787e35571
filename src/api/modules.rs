use super::{parse_id, require_api_key, AppState, ErrorResponse};
use crate::module::ModuleView;
use crate::service::{parse_payload, ServiceError};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use std::sync::Arc;

/// Admin module routes, all behind the API key guard.
///
/// - `GET    /api/modules`      list
/// - `POST   /api/modules`      create
/// - `GET    /api/modules/:id`  fetch one
/// - `PUT    /api/modules/:id`  partial update
/// - `DELETE /api/modules/:id`  delete (idempotent)
pub fn create_module_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/modules", get(list_modules).post(create_module))
        .route(
            "/api/modules/:id",
            get(get_module).put(update_module).delete(delete_module),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_api_key,
        ))
        .with_state(state)
}

/// GET /api/modules
async fn list_modules(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ModuleView>>, ServiceError> {
    let modules = state.service.list().await?;
    Ok(Json(modules))
}

/// GET /api/modules/:id
async fn get_module(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ModuleView>, ServiceError> {
    let id = parse_id(&id).ok_or(ServiceError::NotFound)?;
    let module = state.service.get(id).await?;
    Ok(Json(module))
}

/// POST /api/modules - body fields `id`, `create_time`, `update_time` are ignored
async fn create_module(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<ModuleView>), ServiceError> {
    let payload = parse_payload(&body)?;
    let module = state.service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(module)))
}

/// PUT /api/modules/:id - only fields present in the body change; a missing
/// id is 404 before the body is looked at
async fn update_module(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ModuleView>, ServiceError> {
    let id = parse_id(&id).ok_or(ServiceError::NotFound)?;
    let module = state.service.update_from_body(id, &body).await?;
    Ok(Json(module))
}

/// DELETE /api/modules/:id
async fn delete_module(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    // Nothing can be stored under a non-numeric id
    if let Some(id) = parse_id(&id) {
        state.service.delete(id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
