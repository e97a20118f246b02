//! Loads the resolved assignment graph consumed by the export pipeline.
//!
//! The graph is assembled from three set-based queries (assignments with
//! equipment and building, linked task templates with refs, instruction
//! steps) instead of per-row lookups, then stitched together in memory into
//! the plain value types the validator and workbook builder operate on.

use std::collections::HashMap;

use sqlx::{FromRow, PgPool};

use pmx_core::export::{
    ExportAssignment, ExportBuilding, ExportEquipment, ExportInstruction, ExportRequestType,
    ExportTask,
};
use pmx_core::types::DbId;

use crate::models::task_template::TaskTemplate;

/// Equipment selection for an export run. Exactly one filter applies;
/// the API layer resolves the request body to a variant before calling in.
#[derive(Debug, Clone)]
pub enum ExportFilter {
    /// Every assignment in the system.
    All,
    /// Assignments whose equipment is in one of the given buildings.
    Buildings(Vec<DbId>),
    /// Assignments for the given equipment items.
    Equipment(Vec<DbId>),
}

#[derive(FromRow)]
struct AssignmentGraphRow {
    id: DbId,
    pm_template_id: DbId,
    assigned_users: Option<String>,
    outsourced: bool,
    remind_before_days_primary: Option<i32>,
    remind_before_days_secondary: Option<i32>,
    remind_after_days: Option<i32>,
    equipment_id: DbId,
    equipment_name: String,
    fmx_equipment_name: String,
    building_id: DbId,
    building_name: String,
    fmx_building_name: String,
}

#[derive(FromRow)]
struct TaskGraphRow {
    link_template_id: DbId,
    #[sqlx(flatten)]
    task: TaskTemplate,
    instruction_name: String,
    instruction_description: Option<String>,
    request_type_name: String,
}

const ASSIGNMENT_COLUMNS: &str = "a.id, a.pm_template_id, a.assigned_users, a.outsourced, \
    a.remind_before_days_primary, a.remind_before_days_secondary, a.remind_after_days, \
    e.id AS equipment_id, e.name AS equipment_name, e.fmx_equipment_name, \
    b.id AS building_id, b.name AS building_name, b.fmx_building_name";

const ASSIGNMENT_FROM: &str = "pm_template_assignments a \
    JOIN equipment e ON e.id = a.equipment_id \
    JOIN buildings b ON b.id = e.building_id";

/// Read-only loader for the export graph.
pub struct ExportRepo;

impl ExportRepo {
    /// Load every assignment matching the filter with its full join graph.
    pub async fn load_assignments(
        pool: &PgPool,
        filter: &ExportFilter,
    ) -> Result<Vec<ExportAssignment>, sqlx::Error> {
        let rows: Vec<AssignmentGraphRow> = match filter {
            ExportFilter::All => {
                let query =
                    format!("SELECT {ASSIGNMENT_COLUMNS} FROM {ASSIGNMENT_FROM} ORDER BY a.id");
                sqlx::query_as(&query).fetch_all(pool).await?
            }
            ExportFilter::Buildings(ids) => {
                let query = format!(
                    "SELECT {ASSIGNMENT_COLUMNS} FROM {ASSIGNMENT_FROM}
                     WHERE e.building_id = ANY($1) ORDER BY a.id"
                );
                sqlx::query_as(&query).bind(ids).fetch_all(pool).await?
            }
            ExportFilter::Equipment(ids) => {
                let query = format!(
                    "SELECT {ASSIGNMENT_COLUMNS} FROM {ASSIGNMENT_FROM}
                     WHERE e.id = ANY($1) ORDER BY a.id"
                );
                sqlx::query_as(&query).bind(ids).fetch_all(pool).await?
            }
        };
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let template_ids: Vec<DbId> = rows.iter().map(|r| r.pm_template_id).collect();
        let tasks_by_template = Self::load_tasks(pool, &template_ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| ExportAssignment {
                id: row.id,
                equipment: ExportEquipment {
                    id: row.equipment_id,
                    name: row.equipment_name,
                    fmx_equipment_name: row.fmx_equipment_name,
                    building: ExportBuilding {
                        id: row.building_id,
                        name: row.building_name,
                        fmx_building_name: row.fmx_building_name,
                    },
                },
                tasks: tasks_by_template
                    .get(&row.pm_template_id)
                    .cloned()
                    .unwrap_or_default(),
                assigned_users: row.assigned_users,
                outsourced: row.outsourced,
                remind_before_days_primary: row.remind_before_days_primary,
                remind_before_days_secondary: row.remind_before_days_secondary,
                remind_after_days: row.remind_after_days,
            })
            .collect())
    }

    /// Load the tasks reachable from the given PM templates, keyed by
    /// template id, with instruction steps resolved.
    async fn load_tasks(
        pool: &PgPool,
        template_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<ExportTask>>, sqlx::Error> {
        let task_rows: Vec<TaskGraphRow> = sqlx::query_as(
            "SELECT link.pm_template_id AS link_template_id,
                    t.id, t.name, t.instruction_id, t.request_type_id, t.location,
                    t.first_due_date, t.repeat_enum, t.daily_every_x_days,
                    t.weekly_sun, t.weekly_mon, t.weekly_tues, t.weekly_wed,
                    t.weekly_thur, t.weekly_fri, t.weekly_sat, t.weekly_every_x_weeks,
                    t.monthly_mode, t.monthly_every_x_months, t.yearly_every_x_years,
                    t.exclude_from, t.exclude_thru, t.next_due_mode,
                    t.inventory_names, t.inventory_quantities, t.est_time_hours, t.notes,
                    t.created_at, t.updated_at,
                    i.name AS instruction_name, i.description AS instruction_description,
                    r.name AS request_type_name
             FROM pm_template_tasks link
             JOIN task_templates t ON t.id = link.task_template_id
             JOIN instruction_sets i ON i.id = t.instruction_id
             JOIN request_types r ON r.id = t.request_type_id
             WHERE link.pm_template_id = ANY($1)
             ORDER BY link.pm_template_id, t.name",
        )
        .bind(template_ids)
        .fetch_all(pool)
        .await?;

        let instruction_ids: Vec<DbId> =
            task_rows.iter().map(|r| r.task.instruction_id).collect();
        let step_rows: Vec<(DbId, String)> = sqlx::query_as(
            "SELECT instruction_set_id, text FROM instruction_steps
             WHERE instruction_set_id = ANY($1)
             ORDER BY instruction_set_id, order_index",
        )
        .bind(&instruction_ids)
        .fetch_all(pool)
        .await?;

        let mut steps_by_instruction: HashMap<DbId, Vec<String>> = HashMap::new();
        for (instruction_id, text) in step_rows {
            steps_by_instruction
                .entry(instruction_id)
                .or_default()
                .push(text);
        }

        let mut by_template: HashMap<DbId, Vec<ExportTask>> = HashMap::new();
        for row in task_rows {
            let task = &row.task;
            let export_task = ExportTask {
                id: task.id,
                name: task.name.clone(),
                location: task.location.clone(),
                first_due_date: Some(task.first_due_date),
                repeat: Some(task.repeat_enum.clone()),
                recurrence: task.recurrence_fields(),
                exclude_from: task.exclude_from,
                exclude_thru: task.exclude_thru,
                next_due_mode: task.next_due_mode.clone(),
                inventory_names: task.inventory_names.clone(),
                inventory_quantities: task.inventory_quantities.clone(),
                est_time_hours: task.est_time_hours,
                notes: task.notes.clone(),
                request_type: Some(ExportRequestType {
                    id: task.request_type_id,
                    name: row.request_type_name,
                }),
                instruction: Some(ExportInstruction {
                    id: task.instruction_id,
                    name: row.instruction_name,
                    description: row.instruction_description,
                    steps: steps_by_instruction
                        .get(&task.instruction_id)
                        .cloned()
                        .unwrap_or_default(),
                }),
            };
            by_template
                .entry(row.link_template_id)
                .or_default()
                .push(export_task);
        }
        Ok(by_template)
    }
}
