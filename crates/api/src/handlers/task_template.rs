//! Handlers for the `/task-templates` resource.
//!
//! Writes resolve the recurrence field bag into a validated rule before
//! anything touches the database, then persist the canonical field set so
//! stale frequency columns from an earlier repeat mode are cleared.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use pmx_core::error::CoreError;
use pmx_core::recurrence::{NextDueMode, Repeat, RecurrenceRule};
use pmx_core::types::DbId;
use pmx_db::models::task_template::{TaskTemplateInput, TaskTemplateWithRefs, TaskTemplateWrite};
use pmx_db::repositories::{InstructionRepo, RequestTypeRepo, TaskTemplateRepo};

use crate::error::{is_any_unique_violation, AppError, AppResult};
use crate::middleware::auth::AdminToken;
use crate::state::AppState;

/// GET /api/task-templates
pub async fn list(
    _auth: AdminToken,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<TaskTemplateWithRefs>>> {
    let templates = TaskTemplateRepo::list(&state.pool).await?;
    Ok(Json(templates))
}

/// POST /api/task-templates
pub async fn create(
    _auth: AdminToken,
    State(state): State<AppState>,
    Json(input): Json<TaskTemplateInput>,
) -> AppResult<(StatusCode, Json<TaskTemplateWithRefs>)> {
    let write = resolve_write(&state, input).await?;
    let template = TaskTemplateRepo::create(&state.pool, &write)
        .await
        .map_err(duplicate_name)?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// GET /api/task-templates/{id}
pub async fn get_by_id(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TaskTemplateWithRefs>> {
    let template = TaskTemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Task template",
            id,
        })?;
    Ok(Json(template))
}

/// PUT /api/task-templates/{id}
pub async fn update(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<TaskTemplateInput>,
) -> AppResult<Json<TaskTemplateWithRefs>> {
    let write = resolve_write(&state, input).await?;
    let template = TaskTemplateRepo::update(&state.pool, id, &write)
        .await
        .map_err(duplicate_name)?
        .ok_or(CoreError::NotFound {
            entity: "Task template",
            id,
        })?;
    Ok(Json(template))
}

/// DELETE /api/task-templates/{id}
///
/// Blocked while PM templates still link to the task.
pub async fn delete(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Value>> {
    if TaskTemplateRepo::pm_template_task_count(&state.pool, id).await? > 0 {
        return Err(CoreError::Conflict(
            "Cannot delete task template that is used by PM templates".into(),
        )
        .into());
    }
    if !TaskTemplateRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "Task template",
            id,
        }
        .into());
    }
    Ok(Json(json!({ "message": "Task template deleted successfully" })))
}

/// Validate the wire input into a canonical write payload: references must
/// exist and the recurrence bag must resolve under the selected repeat mode.
async fn resolve_write(
    state: &AppState,
    input: TaskTemplateInput,
) -> Result<TaskTemplateWrite, AppError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest(
            "Name, instruction, request type, first due date, and repeat frequency are required"
                .into(),
        ));
    }

    let repeat: Repeat = input.repeat_enum.parse()?;
    let rule = RecurrenceRule::resolve(repeat, &input.recurrence)?;
    let next_due_mode = match input.next_due_mode.as_deref() {
        Some(mode) => mode.parse::<NextDueMode>()?,
        None => NextDueMode::default(),
    };

    if !InstructionRepo::exists(&state.pool, input.instruction_id).await? {
        return Err(AppError::BadRequest("Instruction not found".into()));
    }
    if !RequestTypeRepo::exists(&state.pool, input.request_type_id).await? {
        return Err(AppError::BadRequest("Request type not found".into()));
    }

    Ok(TaskTemplateWrite {
        name,
        instruction_id: input.instruction_id,
        request_type_id: input.request_type_id,
        location: input.location,
        first_due_date: input.first_due_date,
        repeat,
        recurrence: rule.to_fields(),
        exclude_from: input.exclude_from,
        exclude_thru: input.exclude_thru,
        next_due_mode,
        inventory_names: input.inventory_names,
        inventory_quantities: input.inventory_quantities,
        est_time_hours: input.est_time_hours,
        notes: input.notes,
    })
}

fn duplicate_name(err: sqlx::Error) -> AppError {
    if is_any_unique_violation(&err) {
        CoreError::Conflict("Task template with this name already exists".into()).into()
    } else {
        err.into()
    }
}
