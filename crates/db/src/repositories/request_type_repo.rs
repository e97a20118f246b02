//! Repository for the `request_types` table.

use sqlx::PgPool;

use pmx_core::types::DbId;

use crate::models::request_type::{RequestTypeInput, RequestTypeWithStats};

const COLUMNS: &str = "r.id, r.name, r.created_at, r.updated_at, \
    (SELECT COUNT(*) FROM task_templates t WHERE t.request_type_id = r.id) AS task_count";

/// Provides CRUD operations for request types.
pub struct RequestTypeRepo;

impl RequestTypeRepo {
    /// List all request types with their task counts, ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<RequestTypeWithStats>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM request_types r ORDER BY r.name");
        sqlx::query_as::<_, RequestTypeWithStats>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find a request type by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RequestTypeWithStats>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM request_types r WHERE r.id = $1");
        sqlx::query_as::<_, RequestTypeWithStats>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM request_types WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Insert a new request type.
    pub async fn create(
        pool: &PgPool,
        input: &RequestTypeInput,
    ) -> Result<RequestTypeWithStats, sqlx::Error> {
        let (id,): (DbId,) =
            sqlx::query_as("INSERT INTO request_types (name) VALUES ($1) RETURNING id")
                .bind(&input.name)
                .fetch_one(pool)
                .await?;
        Self::find_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Overwrite a request type. Returns `None` if no row with the given
    /// `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &RequestTypeInput,
    ) -> Result<Option<RequestTypeWithStats>, sqlx::Error> {
        let result =
            sqlx::query("UPDATE request_types SET name = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(&input.name)
                .execute(pool)
                .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    /// Number of task templates referencing the type. Used to block deletes.
    pub async fn task_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM task_templates WHERE request_type_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete a request type by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM request_types WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
