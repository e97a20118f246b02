//! Handlers for the `/instructions` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use pmx_core::error::CoreError;
use pmx_core::types::DbId;
use pmx_db::models::instruction::{
    InstructionSetInput, InstructionSetWithSteps, InstructionStepInput,
};
use pmx_db::repositories::InstructionRepo;

use crate::error::{is_any_unique_violation, AppError, AppResult};
use crate::middleware::auth::AdminToken;
use crate::state::AppState;

/// GET /api/instructions
pub async fn list(
    _auth: AdminToken,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<InstructionSetWithSteps>>> {
    let instructions = InstructionRepo::list(&state.pool).await?;
    Ok(Json(instructions))
}

/// POST /api/instructions
pub async fn create(
    _auth: AdminToken,
    State(state): State<AppState>,
    Json(input): Json<InstructionSetInput>,
) -> AppResult<(StatusCode, Json<InstructionSetWithSteps>)> {
    let input = normalize(input)?;
    let instruction = InstructionRepo::create(&state.pool, &input)
        .await
        .map_err(duplicate_name)?;
    Ok((StatusCode::CREATED, Json(instruction)))
}

/// GET /api/instructions/{id}
pub async fn get_by_id(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<InstructionSetWithSteps>> {
    let instruction = InstructionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Instruction",
            id,
        })?;
    Ok(Json(instruction))
}

/// PUT /api/instructions/{id}
pub async fn update(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<InstructionSetInput>,
) -> AppResult<Json<InstructionSetWithSteps>> {
    let input = normalize(input)?;
    let instruction = InstructionRepo::update(&state.pool, id, &input)
        .await
        .map_err(duplicate_name)?
        .ok_or(CoreError::NotFound {
            entity: "Instruction",
            id,
        })?;
    Ok(Json(instruction))
}

/// DELETE /api/instructions/{id}
///
/// Blocked while task templates still reference the set.
pub async fn delete(
    _auth: AdminToken,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Value>> {
    if InstructionRepo::task_count(&state.pool, id).await? > 0 {
        return Err(CoreError::Conflict(
            "Cannot delete instruction that is used by task templates".into(),
        )
        .into());
    }
    if !InstructionRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "Instruction",
            id,
        }
        .into());
    }
    Ok(Json(json!({ "message": "Instruction deleted successfully" })))
}

/// Trim the name and every step, rejecting empty names, empty step lists,
/// and blank steps. Step text keeps its submitted order.
fn normalize(input: InstructionSetInput) -> Result<InstructionSetInput, AppError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    if input.steps.is_empty() {
        return Err(AppError::BadRequest("At least one step is required".into()));
    }
    let mut steps = Vec::with_capacity(input.steps.len());
    for (index, step) in input.steps.into_iter().enumerate() {
        let text = step.text.trim().to_string();
        if text.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Step {} cannot be empty",
                index + 1
            )));
        }
        steps.push(InstructionStepInput { text });
    }
    Ok(InstructionSetInput {
        name,
        description: input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        steps,
    })
}

fn duplicate_name(err: sqlx::Error) -> AppError {
    if is_any_unique_violation(&err) {
        CoreError::Conflict("Instruction with this name already exists".into()).into()
    } else {
        err.into()
    }
}
