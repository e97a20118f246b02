//! Handlers for the `/request-types` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use pmx_core::error::CoreError;
use pmx_core::types::DbId;
use pmx_db::models::request_type::{RequestTypeInput, RequestTypeWithStats};
use pmx_db::repositories::RequestTypeRepo;

use crate::error::{is_any_unique_violation, AppError, AppResult};
use crate::middleware::auth::AdminToken;
use crate::state::AppState;

/// GET /api/request-types
pub async fn list(
    _auth: AdminToken,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<RequestTypeWithStats>>> {
    let request_types = RequestTypeRepo::list(&state.pool).await?;
    Ok(Json(request_types))
}

/// POST /api/request-types
pub async fn create(
    _auth: AdminToken,
    State(state): State<AppState>,
    Json(input): Json<RequestTypeInput>,
) -> AppResult<(StatusCode, Json<RequestTypeWithStats>)> {
    let input = normalize(input)?;
    let request_type = RequestTypeRepo::create(&state.pool, &input)
        .await
        .map_err(duplicate_name)?;
    Ok((StatusCode::CREATED, Json(request_type)))
}

/// GET /api/request-types/{id}
pub async fn get_by_id(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<RequestTypeWithStats>> {
    let request_type = RequestTypeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Request type",
            id,
        })?;
    Ok(Json(request_type))
}

/// PUT /api/request-types/{id}
pub async fn update(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RequestTypeInput>,
) -> AppResult<Json<RequestTypeWithStats>> {
    let input = normalize(input)?;
    let request_type = RequestTypeRepo::update(&state.pool, id, &input)
        .await
        .map_err(duplicate_name)?
        .ok_or(CoreError::NotFound {
            entity: "Request type",
            id,
        })?;
    Ok(Json(request_type))
}

/// DELETE /api/request-types/{id}
///
/// Blocked while task templates still reference the request type.
pub async fn delete(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Value>> {
    if RequestTypeRepo::task_count(&state.pool, id).await? > 0 {
        return Err(CoreError::Conflict(
            "Cannot delete request type that is used by task templates".into(),
        )
        .into());
    }
    if !RequestTypeRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "Request type",
            id,
        }
        .into());
    }
    Ok(Json(json!({ "message": "Request type deleted successfully" })))
}

fn normalize(input: RequestTypeInput) -> Result<RequestTypeInput, AppError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    Ok(RequestTypeInput { name })
}

fn duplicate_name(err: sqlx::Error) -> AppError {
    if is_any_unique_violation(&err) {
        CoreError::Conflict("Request type with this name already exists".into()).into()
    } else {
        err.into()
    }
}
