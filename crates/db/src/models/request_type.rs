//! Request type entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use pmx_core::types::{DbId, Timestamp};

/// A row from the `request_types` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestType {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request type with the number of task templates referencing it.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTypeWithStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub request_type: RequestType,
    pub task_count: i64,
}

/// Input DTO for creating or overwriting a request type.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestTypeInput {
    pub name: String,
}
