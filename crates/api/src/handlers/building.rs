//! Handlers for the `/buildings` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use pmx_core::error::CoreError;
use pmx_core::types::DbId;
use pmx_db::models::building::{BuildingInput, BuildingWithStats};
use pmx_db::repositories::BuildingRepo;

use crate::error::{is_any_unique_violation, AppError, AppResult};
use crate::middleware::auth::AdminToken;
use crate::state::AppState;

/// GET /api/buildings
pub async fn list(
    _auth: AdminToken,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BuildingWithStats>>> {
    let buildings = BuildingRepo::list(&state.pool).await?;
    Ok(Json(buildings))
}

/// POST /api/buildings
pub async fn create(
    _auth: AdminToken,
    State(state): State<AppState>,
    Json(input): Json<BuildingInput>,
) -> AppResult<(StatusCode, Json<BuildingWithStats>)> {
    let input = normalize(input)?;
    let building = BuildingRepo::create(&state.pool, &input)
        .await
        .map_err(duplicate_name)?;
    Ok((StatusCode::CREATED, Json(building)))
}

/// GET /api/buildings/{id}
pub async fn get_by_id(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<BuildingWithStats>> {
    let building = BuildingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Building",
            id,
        })?;
    Ok(Json(building))
}

/// PUT /api/buildings/{id}
pub async fn update(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<BuildingInput>,
) -> AppResult<Json<BuildingWithStats>> {
    let input = normalize(input)?;
    let building = BuildingRepo::update(&state.pool, id, &input)
        .await
        .map_err(duplicate_name)?
        .ok_or(CoreError::NotFound {
            entity: "Building",
            id,
        })?;
    Ok(Json(building))
}

/// DELETE /api/buildings/{id}
///
/// Blocked while the building still owns equipment.
pub async fn delete(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Value>> {
    if BuildingRepo::equipment_count(&state.pool, id).await? > 0 {
        return Err(CoreError::Conflict(
            "Cannot delete building with existing equipment".into(),
        )
        .into());
    }
    if !BuildingRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "Building",
            id,
        }
        .into());
    }
    Ok(Json(json!({ "message": "Building deleted successfully" })))
}

fn normalize(input: BuildingInput) -> Result<BuildingInput, AppError> {
    let name = input.name.trim().to_string();
    let fmx_building_name = input.fmx_building_name.trim().to_string();
    if name.is_empty() || fmx_building_name.is_empty() {
        return Err(AppError::BadRequest(
            "Name and FMX Building Name are required".into(),
        ));
    }
    Ok(BuildingInput {
        name,
        fmx_building_name,
    })
}

fn duplicate_name(err: sqlx::Error) -> AppError {
    if is_any_unique_violation(&err) {
        CoreError::Conflict("Building with this name or FMX name already exists".into()).into()
    } else {
        err.into()
    }
}
