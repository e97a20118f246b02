//! Handlers for the `/export` endpoints.
//!
//! `POST /export/validate` runs the pre-flight checks and reports counts;
//! `POST /export` builds the workbook and streams it back as an attachment.

use std::collections::HashSet;

use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use pmx_core::export::{
    build_workbook, export_file_name, validate_export, ExportAssignment, ValidationError,
};
use pmx_core::types::DbId;
use pmx_db::repositories::{ExportFilter, ExportRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AdminToken;
use crate::state::AppState;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Equipment selection for an export run. `includeAllEquipment` wins over
/// an equipment id list, which wins over a building id list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub building_ids: Option<Vec<DbId>>,
    pub equipment_ids: Option<Vec<DbId>>,
    #[serde(default)]
    pub include_all_equipment: bool,
}

impl ExportRequest {
    fn resolve_filter(self) -> Result<ExportFilter, AppError> {
        if self.include_all_equipment {
            return Ok(ExportFilter::All);
        }
        if let Some(ids) = self.equipment_ids.filter(|ids| !ids.is_empty()) {
            return Ok(ExportFilter::Equipment(ids));
        }
        if let Some(ids) = self.building_ids.filter(|ids| !ids.is_empty()) {
            return Ok(ExportFilter::Buildings(ids));
        }
        Err(AppError::BadRequest(
            "No buildings or equipment specified for export".into(),
        ))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub assignment_count: usize,
    pub task_count: usize,
    pub instruction_count: usize,
    pub equipment_count: usize,
    pub building_count: usize,
}

/// POST /api/export/validate
pub async fn validate(
    _auth: AdminToken,
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> AppResult<Json<ValidateResponse>> {
    let filter = request.resolve_filter()?;
    let assignments = ExportRepo::load_assignments(&state.pool, &filter).await?;
    let result = validate_export(&assignments)?;

    Ok(Json(ValidateResponse {
        is_valid: result.is_valid,
        errors: result.errors,
        assignment_count: assignments.len(),
        task_count: distinct_task_count(&assignments),
        instruction_count: distinct_instruction_count(&assignments),
        equipment_count: distinct(&assignments, |a| a.equipment.id),
        building_count: distinct(&assignments, |a| a.equipment.building.id),
    }))
}

/// POST /api/export
///
/// Responds with the generated spreadsheet, dated with today's date in the
/// attachment file name. Validation failures surface as a 400 carrying the
/// aggregated error message.
pub async fn export(
    _auth: AdminToken,
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> AppResult<impl IntoResponse> {
    let filter = request.resolve_filter()?;
    let assignments = ExportRepo::load_assignments(&state.pool, &filter).await?;
    let bytes = build_workbook(&assignments)?;

    let file_name = export_file_name(Utc::now().date_naive());
    Ok((
        [
            (CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    ))
}

fn distinct<F>(assignments: &[ExportAssignment], key: F) -> usize
where
    F: Fn(&ExportAssignment) -> DbId,
{
    assignments
        .iter()
        .map(&key)
        .collect::<HashSet<_>>()
        .len()
}

fn distinct_task_count(assignments: &[ExportAssignment]) -> usize {
    assignments
        .iter()
        .flat_map(|a| a.tasks.iter().map(|t| t.id))
        .collect::<HashSet<_>>()
        .len()
}

fn distinct_instruction_count(assignments: &[ExportAssignment]) -> usize {
    assignments
        .iter()
        .flat_map(|a| {
            a.tasks
                .iter()
                .filter_map(|t| t.instruction.as_ref().map(|i| i.id))
        })
        .collect::<HashSet<_>>()
        .len()
}
