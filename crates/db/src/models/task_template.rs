//! Task template model and DTOs.
//!
//! The frequency columns are the flattened storage form of the recurrence
//! tagged union. Handlers resolve the wire input through
//! [`pmx_core::recurrence::RecurrenceRule`] and persist the canonical field
//! set via [`TaskTemplateWrite`]; rows read back expose the same flat shape.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use pmx_core::recurrence::{NextDueMode, RecurrenceFields, Repeat};
use pmx_core::types::{DbId, Timestamp};

use crate::models::EntityRef;

/// A row from the `task_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplate {
    pub id: DbId,
    pub name: String,
    pub instruction_id: DbId,
    pub request_type_id: DbId,
    pub location: Option<String>,
    pub first_due_date: NaiveDate,
    pub repeat_enum: String,
    pub daily_every_x_days: Option<i32>,
    pub weekly_sun: Option<bool>,
    pub weekly_mon: Option<bool>,
    pub weekly_tues: Option<bool>,
    pub weekly_wed: Option<bool>,
    pub weekly_thur: Option<bool>,
    pub weekly_fri: Option<bool>,
    pub weekly_sat: Option<bool>,
    pub weekly_every_x_weeks: Option<i32>,
    pub monthly_mode: Option<String>,
    pub monthly_every_x_months: Option<i32>,
    pub yearly_every_x_years: Option<i32>,
    pub exclude_from: Option<NaiveDate>,
    pub exclude_thru: Option<NaiveDate>,
    pub next_due_mode: String,
    pub inventory_names: Option<String>,
    pub inventory_quantities: Option<String>,
    pub est_time_hours: Option<f64>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TaskTemplate {
    /// The stored frequency columns as the in-memory field bag.
    pub fn recurrence_fields(&self) -> RecurrenceFields {
        RecurrenceFields {
            daily_every_x_days: self.daily_every_x_days,
            weekly_sun: self.weekly_sun,
            weekly_mon: self.weekly_mon,
            weekly_tues: self.weekly_tues,
            weekly_wed: self.weekly_wed,
            weekly_thur: self.weekly_thur,
            weekly_fri: self.weekly_fri,
            weekly_sat: self.weekly_sat,
            weekly_every_x_weeks: self.weekly_every_x_weeks,
            monthly_mode: self.monthly_mode.clone(),
            monthly_every_x_months: self.monthly_every_x_months,
            yearly_every_x_years: self.yearly_every_x_years,
        }
    }
}

/// Task template with its instruction and request type references and the
/// number of PM templates using it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplateWithRefs {
    #[serde(flatten)]
    pub task: TaskTemplate,
    pub instruction: EntityRef,
    pub request_type: EntityRef,
    pub pm_template_task_count: i64,
}

/// Flat join row backing [`TaskTemplateWithRefs`].
#[derive(Debug, Clone, FromRow)]
pub struct TaskTemplateRow {
    #[sqlx(flatten)]
    pub task: TaskTemplate,
    pub instruction_name: String,
    pub request_type_name: String,
    pub pm_template_task_count: i64,
}

impl From<TaskTemplateRow> for TaskTemplateWithRefs {
    fn from(row: TaskTemplateRow) -> Self {
        TaskTemplateWithRefs {
            instruction: EntityRef {
                id: row.task.instruction_id,
                name: row.instruction_name,
            },
            request_type: EntityRef {
                id: row.task.request_type_id,
                name: row.request_type_name,
            },
            pm_template_task_count: row.pm_template_task_count,
            task: row.task,
        }
    }
}

/// Wire input for creating or overwriting a task template. The frequency
/// fields arrive as an unvalidated bag; handlers resolve them against
/// `repeat_enum` before anything is persisted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplateInput {
    pub name: String,
    pub instruction_id: DbId,
    pub request_type_id: DbId,
    pub location: Option<String>,
    pub first_due_date: NaiveDate,
    pub repeat_enum: String,
    #[serde(flatten)]
    pub recurrence: RecurrenceFields,
    pub exclude_from: Option<NaiveDate>,
    pub exclude_thru: Option<NaiveDate>,
    pub next_due_mode: Option<String>,
    pub inventory_names: Option<String>,
    pub inventory_quantities: Option<String>,
    pub est_time_hours: Option<f64>,
    pub notes: Option<String>,
}

/// Canonical write payload: recurrence already resolved, so every frequency
/// column outside the active variant is `None`.
#[derive(Debug, Clone)]
pub struct TaskTemplateWrite {
    pub name: String,
    pub instruction_id: DbId,
    pub request_type_id: DbId,
    pub location: Option<String>,
    pub first_due_date: NaiveDate,
    pub repeat: Repeat,
    pub recurrence: RecurrenceFields,
    pub exclude_from: Option<NaiveDate>,
    pub exclude_thru: Option<NaiveDate>,
    pub next_due_mode: NextDueMode,
    pub inventory_names: Option<String>,
    pub inventory_quantities: Option<String>,
    pub est_time_hours: Option<f64>,
    pub notes: Option<String>,
}
