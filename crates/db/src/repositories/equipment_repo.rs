//! Repository for the `equipment` table.

use sqlx::PgPool;

use pmx_core::types::DbId;

use crate::models::equipment::{EquipmentInput, EquipmentRow, EquipmentWithBuilding};

/// Column list shared across queries. `type` is aliased because it is a
/// keyword-ish column name the row struct cannot carry directly.
const COLUMNS: &str = "e.id, e.building_id, e.name, e.type AS equipment_type, \
    e.fmx_equipment_name, e.created_at, e.updated_at, \
    b.name AS building_name, b.fmx_building_name AS building_fmx_name, \
    (SELECT COUNT(*) FROM pm_template_assignments a WHERE a.equipment_id = e.id) AS assignment_count";

const FROM: &str = "equipment e JOIN buildings b ON b.id = e.building_id";

/// Provides CRUD operations for equipment.
pub struct EquipmentRepo;

impl EquipmentRepo {
    /// List equipment with building references and assignment counts,
    /// optionally filtered to a single building. Ordered by building name
    /// then equipment name.
    pub async fn list(
        pool: &PgPool,
        building_id: Option<DbId>,
    ) -> Result<Vec<EquipmentWithBuilding>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM}
             WHERE $1::BIGINT IS NULL OR e.building_id = $1
             ORDER BY b.name, e.name"
        );
        let rows = sqlx::query_as::<_, EquipmentRow>(&query)
            .bind(building_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Find an equipment item by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EquipmentWithBuilding>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE e.id = $1");
        let row = sqlx::query_as::<_, EquipmentRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Load equipment rows for an explicit id set. Used by bulk assignment
    /// creation to verify existence and pick up denormalized building ids.
    pub async fn find_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<EquipmentWithBuilding>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE e.id = ANY($1) ORDER BY e.name");
        let rows = sqlx::query_as::<_, EquipmentRow>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert a new equipment item, returning the embedded view.
    pub async fn create(
        pool: &PgPool,
        input: &EquipmentInput,
    ) -> Result<EquipmentWithBuilding, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO equipment (building_id, name, type, fmx_equipment_name)
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(input.building_id)
        .bind(&input.name)
        .bind(&input.equipment_type)
        .bind(&input.fmx_equipment_name)
        .fetch_one(pool)
        .await?;
        Self::find_by_id(pool, id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Overwrite an equipment item. Returns `None` if no row with the given
    /// `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &EquipmentInput,
    ) -> Result<Option<EquipmentWithBuilding>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE equipment
             SET building_id = $2, name = $3, type = $4, fmx_equipment_name = $5,
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(input.building_id)
        .bind(&input.name)
        .bind(&input.equipment_type)
        .bind(&input.fmx_equipment_name)
        .execute(pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    /// Number of assignments referencing the equipment. Used to block deletes.
    pub async fn assignment_count(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM pm_template_assignments WHERE equipment_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete an equipment item by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
