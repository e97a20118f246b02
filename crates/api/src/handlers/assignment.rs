//! Handlers for the `/assignments` resource.
//!
//! Assignments are created in bulk (one PM template against many equipment
//! items) and deleted individually; there is no update endpoint.

use std::collections::BTreeSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use pmx_core::error::CoreError;
use pmx_core::types::DbId;
use pmx_db::models::assignment::{
    AssignmentInput, AssignmentWithRefs, AssignmentsCreated, AvailableEquipment,
};
use pmx_db::repositories::{AssignmentRepo, EquipmentRepo, PmTemplateRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AdminToken;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub pm_template_id: Option<DbId>,
}

/// GET /api/assignments?pmTemplateId=N
pub async fn list(
    _auth: AdminToken,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<AssignmentWithRefs>>> {
    let assignments = AssignmentRepo::list(&state.pool, query.pm_template_id).await?;
    Ok(Json(assignments))
}

/// POST /api/assignments
///
/// Creates one assignment per equipment id. Rejected wholesale if any
/// equipment is unknown or already carries the template, so the request
/// either fully succeeds or changes nothing.
pub async fn create(
    _auth: AdminToken,
    State(state): State<AppState>,
    Json(input): Json<AssignmentInput>,
) -> AppResult<(StatusCode, Json<AssignmentsCreated>)> {
    if input.equipment_ids.is_empty() {
        return Err(AppError::BadRequest(
            "PM Template ID and equipment IDs are required".into(),
        ));
    }
    if !PmTemplateRepo::exists(&state.pool, input.pm_template_id).await? {
        return Err(CoreError::NotFound {
            entity: "PM Template",
            id: input.pm_template_id,
        }
        .into());
    }

    let equipment = EquipmentRepo::find_by_ids(&state.pool, &input.equipment_ids).await?;
    if equipment.len() != input.equipment_ids.len() {
        return Err(AppError::BadRequest(
            "One or more equipment items not found".into(),
        ));
    }

    let already_assigned = AssignmentRepo::assigned_equipment_ids(
        &state.pool,
        input.pm_template_id,
        &input.equipment_ids,
    )
    .await?;
    if !already_assigned.is_empty() {
        let names: Vec<String> = equipment
            .iter()
            .filter(|e| already_assigned.contains(&e.equipment.id))
            .map(|e| format!("{} ({})", e.equipment.name, e.building.name))
            .collect();
        return Err(AppError::BadRequest(format!(
            "PM Template is already assigned to: {}",
            names.join(", ")
        )));
    }

    let pairs: Vec<(DbId, DbId)> = equipment
        .iter()
        .map(|e| (e.equipment.id, e.equipment.building_id))
        .collect();
    let created =
        AssignmentRepo::create_many(&state.pool, input.pm_template_id, &pairs, &input).await?;
    Ok((StatusCode::CREATED, Json(AssignmentsCreated { created })))
}

/// DELETE /api/assignments/{id}
pub async fn delete(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Value>> {
    let assignment = AssignmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Assignment",
            id,
        })?;
    AssignmentRepo::delete(&state.pool, id).await?;
    Ok(Json(json!({
        "message": format!(
            "Removed assignment of \"{}\" from {} ({})",
            assignment.pm_template.name,
            assignment.equipment.name,
            assignment.building.name
        )
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableQuery {
    pub building_id: Option<DbId>,
    pub pm_template_id: Option<DbId>,
}

/// GET /api/assignments/available-equipment?buildingId=N&pmTemplateId=M
///
/// Equipment in the building not yet assigned to the template, plus the
/// distinct type list for client-side filtering.
pub async fn available_equipment(
    _auth: AdminToken,
    State(state): State<AppState>,
    Query(query): Query<AvailableQuery>,
) -> AppResult<Json<AvailableEquipment>> {
    let building_id = query
        .building_id
        .ok_or_else(|| AppError::BadRequest("Building ID is required".into()))?;

    let (equipment, excluded_count) =
        AssignmentRepo::available_equipment(&state.pool, building_id, query.pm_template_id).await?;

    let equipment_types: Vec<String> = equipment
        .iter()
        .map(|e| e.equipment.equipment_type.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    Ok(Json(AvailableEquipment {
        equipment,
        equipment_types,
        excluded_count,
    }))
}
