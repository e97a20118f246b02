//! PM template model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use pmx_core::types::{DbId, Timestamp};

use crate::models::task_template::TaskTemplateWithRefs;

/// A row from the `pm_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PmTemplate {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// PM template with task and assignment counts, as returned by list views.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PmTemplateWithStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub template: PmTemplate,
    pub task_count: i64,
    pub assignment_count: i64,
}

/// Detail view embedding the linked task templates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PmTemplateDetail {
    #[serde(flatten)]
    pub template: PmTemplate,
    pub tasks: Vec<TaskTemplateWithRefs>,
    pub task_count: i64,
    pub assignment_count: i64,
}

/// Reference embedded in assignment views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PmTemplateRef {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
}

/// Input DTO for creating or overwriting a PM template. The task link list
/// replaces the existing links wholesale.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PmTemplateInput {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub task_template_ids: Vec<DbId>,
}
