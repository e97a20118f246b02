//! Repository for the `pm_template_assignments` table.

use sqlx::PgPool;

use pmx_core::types::DbId;

use crate::models::assignment::{AssignmentInput, AssignmentRow, AssignmentWithRefs};
use crate::models::equipment::{EquipmentRow, EquipmentWithBuilding};

const COLUMNS: &str = "a.id, a.pm_template_id, a.equipment_id, a.building_id, \
    a.assigned_users, a.outsourced, a.remind_before_days_primary, \
    a.remind_before_days_secondary, a.remind_after_days, a.created_at, a.updated_at, \
    p.name AS pm_template_name, p.description AS pm_template_description, \
    e.name AS equipment_name, e.type AS equipment_type, e.fmx_equipment_name, \
    b.name AS building_name, b.fmx_building_name AS building_fmx_name";

const FROM: &str = "pm_template_assignments a \
    JOIN pm_templates p ON p.id = a.pm_template_id \
    JOIN equipment e ON e.id = a.equipment_id \
    JOIN buildings b ON b.id = a.building_id";

/// Provides operations for PM template assignments. Assignments are created
/// in bulk and only ever deleted individually; there is no update.
pub struct AssignmentRepo;

impl AssignmentRepo {
    /// List assignments with full references, optionally filtered to one PM
    /// template. Ordered by template, building, then equipment name.
    pub async fn list(
        pool: &PgPool,
        pm_template_id: Option<DbId>,
    ) -> Result<Vec<AssignmentWithRefs>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM}
             WHERE $1::BIGINT IS NULL OR a.pm_template_id = $1
             ORDER BY p.name, b.name, e.name"
        );
        let rows = sqlx::query_as::<_, AssignmentRow>(&query)
            .bind(pm_template_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Find an assignment by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AssignmentWithRefs>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE a.id = $1");
        let row = sqlx::query_as::<_, AssignmentRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Equipment ids among `equipment_ids` that are already assigned to the
    /// template. Used to reject duplicate assignments before inserting.
    pub async fn assigned_equipment_ids(
        pool: &PgPool,
        pm_template_id: DbId,
        equipment_ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT equipment_id FROM pm_template_assignments
             WHERE pm_template_id = $1 AND equipment_id = ANY($2)",
        )
        .bind(pm_template_id)
        .bind(equipment_ids)
        .fetch_all(pool)
        .await
    }

    /// Insert one assignment per (equipment, building) pair in a single
    /// set-based statement. The building id is the denormalized value read
    /// from the equipment row by the caller.
    pub async fn create_many(
        pool: &PgPool,
        pm_template_id: DbId,
        equipment: &[(DbId, DbId)],
        input: &AssignmentInput,
    ) -> Result<u64, sqlx::Error> {
        let equipment_ids: Vec<DbId> = equipment.iter().map(|(eq, _)| *eq).collect();
        let building_ids: Vec<DbId> = equipment.iter().map(|(_, b)| *b).collect();

        let result = sqlx::query(
            "INSERT INTO pm_template_assignments
                (pm_template_id, equipment_id, building_id, assigned_users, outsourced,
                 remind_before_days_primary, remind_before_days_secondary, remind_after_days)
             SELECT $1, eq, bld, $4, $5, $6, $7, $8
             FROM UNNEST($2::BIGINT[], $3::BIGINT[]) AS pairs(eq, bld)",
        )
        .bind(pm_template_id)
        .bind(&equipment_ids)
        .bind(&building_ids)
        .bind(&input.assigned_users)
        .bind(input.outsourced)
        .bind(input.remind_before_days_primary)
        .bind(input.remind_before_days_secondary)
        .bind(input.remind_after_days)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pm_template_assignments WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete an assignment by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pm_template_assignments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Equipment in a building not yet assigned to the given PM template,
    /// ordered by type then name, together with the number of excluded
    /// (already assigned) items.
    pub async fn available_equipment(
        pool: &PgPool,
        building_id: DbId,
        pm_template_id: Option<DbId>,
    ) -> Result<(Vec<EquipmentWithBuilding>, i64), sqlx::Error> {
        let query = "SELECT e.id, e.building_id, e.name, e.type AS equipment_type, \
                e.fmx_equipment_name, e.created_at, e.updated_at, \
                b.name AS building_name, b.fmx_building_name AS building_fmx_name, \
                (SELECT COUNT(*) FROM pm_template_assignments a WHERE a.equipment_id = e.id) \
                    AS assignment_count \
             FROM equipment e JOIN buildings b ON b.id = e.building_id \
             WHERE e.building_id = $1 \
               AND ($2::BIGINT IS NULL OR e.id NOT IN ( \
                    SELECT equipment_id FROM pm_template_assignments \
                    WHERE pm_template_id = $2 AND building_id = $1)) \
             ORDER BY e.type, e.name";
        let rows = sqlx::query_as::<_, EquipmentRow>(query)
            .bind(building_id)
            .bind(pm_template_id)
            .fetch_all(pool)
            .await?;

        let excluded_count: i64 = match pm_template_id {
            Some(template_id) => {
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM pm_template_assignments
                     WHERE pm_template_id = $1 AND building_id = $2",
                )
                .bind(template_id)
                .bind(building_id)
                .fetch_one(pool)
                .await?
            }
            None => 0,
        };

        Ok((rows.into_iter().map(Into::into).collect(), excluded_count))
    }
}
