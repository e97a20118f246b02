//! Repository for the `buildings` table.

use sqlx::PgPool;

use pmx_core::types::DbId;

use crate::models::building::{BuildingInput, BuildingWithStats};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "b.id, b.name, b.fmx_building_name, b.created_at, b.updated_at, \
    (SELECT COUNT(*) FROM equipment e WHERE e.building_id = b.id) AS equipment_count";

/// Provides CRUD operations for buildings.
pub struct BuildingRepo;

impl BuildingRepo {
    /// List all buildings with their equipment counts, ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<BuildingWithStats>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM buildings b ORDER BY b.name");
        sqlx::query_as::<_, BuildingWithStats>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find a building by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<BuildingWithStats>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM buildings b WHERE b.id = $1");
        sqlx::query_as::<_, BuildingWithStats>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM buildings WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Insert a new building, returning the stats view of the created row.
    pub async fn create(
        pool: &PgPool,
        input: &BuildingInput,
    ) -> Result<BuildingWithStats, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO buildings (name, fmx_building_name) VALUES ($1, $2) RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.fmx_building_name)
        .fetch_one(pool)
        .await?;
        Self::find_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Overwrite a building. Returns `None` if no row with the given `id`
    /// exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &BuildingInput,
    ) -> Result<Option<BuildingWithStats>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE buildings SET name = $2, fmx_building_name = $3, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.fmx_building_name)
        .execute(pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    /// Number of equipment rows owned by the building. Used to block deletes.
    pub async fn equipment_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM equipment WHERE building_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete a building by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM buildings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
