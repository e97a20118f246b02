//! Repository for PM templates and their task links.
//!
//! Task links follow the same wholesale-replacement rule as instruction
//! steps: updates delete the full link set and recreate it in one
//! transaction.

use sqlx::PgPool;

use pmx_core::types::DbId;

use crate::models::pm_template::{PmTemplateDetail, PmTemplateInput, PmTemplateWithStats};
use crate::repositories::TaskTemplateRepo;

const COLUMNS: &str = "p.id, p.name, p.description, p.created_at, p.updated_at, \
    (SELECT COUNT(*) FROM pm_template_tasks pt WHERE pt.pm_template_id = p.id) AS task_count, \
    (SELECT COUNT(*) FROM pm_template_assignments a WHERE a.pm_template_id = p.id) \
        AS assignment_count";

/// Provides CRUD operations for PM templates.
pub struct PmTemplateRepo;

impl PmTemplateRepo {
    /// List all PM templates with task and assignment counts, ordered by
    /// name.
    pub async fn list(pool: &PgPool) -> Result<Vec<PmTemplateWithStats>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pm_templates p ORDER BY p.name");
        sqlx::query_as::<_, PmTemplateWithStats>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find a PM template by its internal ID, embedding the linked task
    /// templates.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PmTemplateDetail>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pm_templates p WHERE p.id = $1");
        let Some(row) = sqlx::query_as::<_, PmTemplateWithStats>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let tasks = TaskTemplateRepo::list_by_pm_template(pool, id).await?;
        Ok(Some(PmTemplateDetail {
            template: row.template,
            tasks,
            task_count: row.task_count,
            assignment_count: row.assignment_count,
        }))
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pm_templates WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Whether another template already uses the name. `exclude_id` skips
    /// the row being updated.
    pub async fn exists_by_name(
        pool: &PgPool,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM pm_templates
              WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Insert a PM template and its task links in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &PmTemplateInput,
    ) -> Result<PmTemplateDetail, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO pm_templates (name, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&mut *tx)
        .await?;

        for task_template_id in &input.task_template_ids {
            sqlx::query(
                "INSERT INTO pm_template_tasks (pm_template_id, task_template_id)
                 VALUES ($1, $2)",
            )
            .bind(id)
            .bind(task_template_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Self::find_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Overwrite a PM template: the row is updated and the task link set is
    /// deleted and recreated atomically. Returns `None` if no row with the
    /// given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &PmTemplateInput,
    ) -> Result<Option<PmTemplateDetail>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE pm_templates SET name = $2, description = $3, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        sqlx::query("DELETE FROM pm_template_tasks WHERE pm_template_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for task_template_id in &input.task_template_ids {
            sqlx::query(
                "INSERT INTO pm_template_tasks (pm_template_id, task_template_id)
                 VALUES ($1, $2)",
            )
            .bind(id)
            .bind(task_template_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Self::find_by_id(pool, id).await
    }

    /// Number of assignments referencing the template. Used to block deletes.
    pub async fn assignment_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM pm_template_assignments WHERE pm_template_id = $1",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    /// Delete a PM template by ID; task links cascade. Returns `true` if a
    /// row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pm_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
