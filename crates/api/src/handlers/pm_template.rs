//! Handlers for the `/pm-templates` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use pmx_core::error::CoreError;
use pmx_core::types::DbId;
use pmx_db::models::pm_template::{PmTemplateDetail, PmTemplateInput, PmTemplateWithStats};
use pmx_db::repositories::{PmTemplateRepo, TaskTemplateRepo};

use crate::error::{is_any_unique_violation, AppError, AppResult};
use crate::middleware::auth::AdminToken;
use crate::state::AppState;

/// GET /api/pm-templates
pub async fn list(
    _auth: AdminToken,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PmTemplateWithStats>>> {
    let templates = PmTemplateRepo::list(&state.pool).await?;
    Ok(Json(templates))
}

/// POST /api/pm-templates
pub async fn create(
    _auth: AdminToken,
    State(state): State<AppState>,
    Json(input): Json<PmTemplateInput>,
) -> AppResult<(StatusCode, Json<PmTemplateDetail>)> {
    let input = validate(&state, input, None).await?;
    let template = PmTemplateRepo::create(&state.pool, &input)
        .await
        .map_err(duplicate_name)?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// GET /api/pm-templates/{id}
pub async fn get_by_id(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<PmTemplateDetail>> {
    let template = PmTemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "PM Template",
            id,
        })?;
    Ok(Json(template))
}

/// PUT /api/pm-templates/{id}
pub async fn update(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<PmTemplateInput>,
) -> AppResult<Json<PmTemplateDetail>> {
    let input = validate(&state, input, Some(id)).await?;
    let template = PmTemplateRepo::update(&state.pool, id, &input)
        .await
        .map_err(duplicate_name)?
        .ok_or(CoreError::NotFound {
            entity: "PM Template",
            id,
        })?;
    Ok(Json(template))
}

/// DELETE /api/pm-templates/{id}
///
/// Blocked while the template is assigned to any equipment.
pub async fn delete(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Value>> {
    if PmTemplateRepo::assignment_count(&state.pool, id).await? > 0 {
        return Err(AppError::BadRequest(
            "Cannot delete PM template that is assigned to equipment. Remove all assignments first."
                .into(),
        ));
    }
    if !PmTemplateRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "PM Template",
            id,
        }
        .into());
    }
    Ok(Json(json!({ "message": "PM Template deleted successfully" })))
}

/// Trim the name, check it for duplicates up front, and verify every linked
/// task template exists before the transactional write.
async fn validate(
    state: &AppState,
    input: PmTemplateInput,
    exclude_id: Option<DbId>,
) -> Result<PmTemplateInput, AppError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    if PmTemplateRepo::exists_by_name(&state.pool, &name, exclude_id).await? {
        return Err(AppError::BadRequest(
            "A PM template with this name already exists".into(),
        ));
    }
    if !input.task_template_ids.is_empty() {
        let existing =
            TaskTemplateRepo::count_existing(&state.pool, &input.task_template_ids).await?;
        if existing != input.task_template_ids.len() as i64 {
            return Err(AppError::BadRequest(
                "One or more task templates not found".into(),
            ));
        }
    }
    Ok(PmTemplateInput {
        name,
        description: input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        task_template_ids: input.task_template_ids,
    })
}

/// The name check above races with concurrent writers; a unique violation
/// slipping through maps to the same client-facing message.
fn duplicate_name(err: sqlx::Error) -> AppError {
    if is_any_unique_violation(&err) {
        AppError::BadRequest("A PM template with this name already exists".into())
    } else {
        err.into()
    }
}
