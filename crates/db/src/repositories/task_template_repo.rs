//! Repository for the `task_templates` table.
//!
//! Writes take the canonical [`TaskTemplateWrite`] payload: every frequency
//! column is bound on every write, so columns outside the active repeat
//! variant are always cleared back to NULL.

use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};

use pmx_core::types::DbId;

use crate::models::task_template::{TaskTemplateRow, TaskTemplateWithRefs, TaskTemplateWrite};

const COLUMNS: &str = "t.id, t.name, t.instruction_id, t.request_type_id, t.location, \
    t.first_due_date, t.repeat_enum, t.daily_every_x_days, \
    t.weekly_sun, t.weekly_mon, t.weekly_tues, t.weekly_wed, t.weekly_thur, \
    t.weekly_fri, t.weekly_sat, t.weekly_every_x_weeks, \
    t.monthly_mode, t.monthly_every_x_months, t.yearly_every_x_years, \
    t.exclude_from, t.exclude_thru, t.next_due_mode, \
    t.inventory_names, t.inventory_quantities, t.est_time_hours, t.notes, \
    t.created_at, t.updated_at, \
    i.name AS instruction_name, r.name AS request_type_name, \
    (SELECT COUNT(*) FROM pm_template_tasks pt WHERE pt.task_template_id = t.id) \
        AS pm_template_task_count";

const FROM: &str = "task_templates t \
    JOIN instruction_sets i ON i.id = t.instruction_id \
    JOIN request_types r ON r.id = t.request_type_id";

/// Provides CRUD operations for task templates.
pub struct TaskTemplateRepo;

impl TaskTemplateRepo {
    /// List all task templates with refs and usage counts, ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<TaskTemplateWithRefs>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} ORDER BY t.name");
        let rows = sqlx::query_as::<_, TaskTemplateRow>(&query)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Find a task template by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TaskTemplateWithRefs>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE t.id = $1");
        let row = sqlx::query_as::<_, TaskTemplateRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// List the task templates linked to a PM template, ordered by name.
    pub async fn list_by_pm_template(
        pool: &PgPool,
        pm_template_id: DbId,
    ) -> Result<Vec<TaskTemplateWithRefs>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM}
             JOIN pm_template_tasks link ON link.task_template_id = t.id
             WHERE link.pm_template_id = $1
             ORDER BY t.name"
        );
        let rows = sqlx::query_as::<_, TaskTemplateRow>(&query)
            .bind(pm_template_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// How many of the given ids exist. Used to reject links to unknown
    /// task templates in one round trip.
    pub async fn count_existing(pool: &PgPool, ids: &[DbId]) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM task_templates WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(pool)
            .await
    }

    /// Insert a new task template from a canonical write payload.
    pub async fn create(
        pool: &PgPool,
        input: &TaskTemplateWrite,
    ) -> Result<TaskTemplateWithRefs, sqlx::Error> {
        let query = "INSERT INTO task_templates
                (name, instruction_id, request_type_id, location, first_due_date,
                 repeat_enum, daily_every_x_days,
                 weekly_sun, weekly_mon, weekly_tues, weekly_wed, weekly_thur,
                 weekly_fri, weekly_sat, weekly_every_x_weeks,
                 monthly_mode, monthly_every_x_months, yearly_every_x_years,
                 exclude_from, exclude_thru, next_due_mode,
                 inventory_names, inventory_quantities, est_time_hours, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                     $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25)
             RETURNING id";
        let (id,): (DbId,) = bind_write(sqlx::query_as(query), input)
            .fetch_one(pool)
            .await?;
        Self::find_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Overwrite a task template, rewriting the full frequency column set.
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &TaskTemplateWrite,
    ) -> Result<Option<TaskTemplateWithRefs>, sqlx::Error> {
        let query = "UPDATE task_templates SET
                name = $1, instruction_id = $2, request_type_id = $3, location = $4,
                first_due_date = $5, repeat_enum = $6, daily_every_x_days = $7,
                weekly_sun = $8, weekly_mon = $9, weekly_tues = $10, weekly_wed = $11,
                weekly_thur = $12, weekly_fri = $13, weekly_sat = $14,
                weekly_every_x_weeks = $15, monthly_mode = $16,
                monthly_every_x_months = $17, yearly_every_x_years = $18,
                exclude_from = $19, exclude_thru = $20, next_due_mode = $21,
                inventory_names = $22, inventory_quantities = $23,
                est_time_hours = $24, notes = $25, updated_at = NOW()
             WHERE id = $26
             RETURNING id";
        let row: Option<(DbId,)> = bind_write(sqlx::query_as(query), input)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        match row {
            Some(_) => Self::find_by_id(pool, id).await,
            None => Ok(None),
        }
    }

    /// Number of PM template links referencing the task. Used to block
    /// deletes.
    pub async fn pm_template_task_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM pm_template_tasks WHERE task_template_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete a task template by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Bind the 25 write columns in declaration order.
fn bind_write<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    input: &'q TaskTemplateWrite,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    query
        .bind(&input.name)
        .bind(input.instruction_id)
        .bind(input.request_type_id)
        .bind(&input.location)
        .bind(input.first_due_date)
        .bind(input.repeat.as_str())
        .bind(input.recurrence.daily_every_x_days)
        .bind(input.recurrence.weekly_sun)
        .bind(input.recurrence.weekly_mon)
        .bind(input.recurrence.weekly_tues)
        .bind(input.recurrence.weekly_wed)
        .bind(input.recurrence.weekly_thur)
        .bind(input.recurrence.weekly_fri)
        .bind(input.recurrence.weekly_sat)
        .bind(input.recurrence.weekly_every_x_weeks)
        .bind(&input.recurrence.monthly_mode)
        .bind(input.recurrence.monthly_every_x_months)
        .bind(input.recurrence.yearly_every_x_years)
        .bind(input.exclude_from)
        .bind(input.exclude_thru)
        .bind(input.next_due_mode.as_str())
        .bind(&input.inventory_names)
        .bind(&input.inventory_quantities)
        .bind(input.est_time_hours)
        .bind(&input.notes)
}
