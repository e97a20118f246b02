//! Handlers for the `/equipment` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use pmx_core::error::CoreError;
use pmx_core::types::DbId;
use pmx_db::models::equipment::{EquipmentInput, EquipmentWithBuilding};
use pmx_db::repositories::{BuildingRepo, EquipmentRepo};

use crate::error::{is_any_unique_violation, AppError, AppResult};
use crate::middleware::auth::AdminToken;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub building_id: Option<DbId>,
}

/// GET /api/equipment?buildingId=N
pub async fn list(
    _auth: AdminToken,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<EquipmentWithBuilding>>> {
    let equipment = EquipmentRepo::list(&state.pool, query.building_id).await?;
    Ok(Json(equipment))
}

/// POST /api/equipment
pub async fn create(
    _auth: AdminToken,
    State(state): State<AppState>,
    Json(input): Json<EquipmentInput>,
) -> AppResult<(StatusCode, Json<EquipmentWithBuilding>)> {
    let input = normalize(input)?;
    if !BuildingRepo::exists(&state.pool, input.building_id).await? {
        return Err(AppError::BadRequest("Building not found".into()));
    }
    let equipment = EquipmentRepo::create(&state.pool, &input)
        .await
        .map_err(duplicate_fmx_name)?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// GET /api/equipment/{id}
pub async fn get_by_id(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<EquipmentWithBuilding>> {
    let equipment = EquipmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Equipment",
            id,
        })?;
    Ok(Json(equipment))
}

/// PUT /api/equipment/{id}
pub async fn update(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<EquipmentInput>,
) -> AppResult<Json<EquipmentWithBuilding>> {
    let input = normalize(input)?;
    if !BuildingRepo::exists(&state.pool, input.building_id).await? {
        return Err(AppError::BadRequest("Building not found".into()));
    }
    let equipment = EquipmentRepo::update(&state.pool, id, &input)
        .await
        .map_err(duplicate_fmx_name)?
        .ok_or(CoreError::NotFound {
            entity: "Equipment",
            id,
        })?;
    Ok(Json(equipment))
}

/// DELETE /api/equipment/{id}
///
/// Blocked while assignments still reference the equipment.
pub async fn delete(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Value>> {
    if EquipmentRepo::assignment_count(&state.pool, id).await? > 0 {
        return Err(CoreError::Conflict(
            "Cannot delete equipment with existing assignments".into(),
        )
        .into());
    }
    if !EquipmentRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "Equipment",
            id,
        }
        .into());
    }
    Ok(Json(json!({ "message": "Equipment deleted successfully" })))
}

fn normalize(input: EquipmentInput) -> Result<EquipmentInput, AppError> {
    let name = input.name.trim().to_string();
    let equipment_type = input.equipment_type.trim().to_string();
    let fmx_equipment_name = input.fmx_equipment_name.trim().to_string();
    if name.is_empty() || equipment_type.is_empty() || fmx_equipment_name.is_empty() {
        return Err(AppError::BadRequest(
            "Building ID, name, type, and FMX Equipment Name are required".into(),
        ));
    }
    Ok(EquipmentInput {
        building_id: input.building_id,
        name,
        equipment_type,
        fmx_equipment_name,
    })
}

fn duplicate_fmx_name(err: sqlx::Error) -> AppError {
    if is_any_unique_violation(&err) {
        CoreError::Conflict("Equipment with this FMX name already exists".into()).into()
    } else {
        err.into()
    }
}
