//! Equipment entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use pmx_core::types::{DbId, Timestamp};

use crate::models::building::BuildingRef;

/// A row from the `equipment` table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    pub id: DbId,
    pub building_id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub fmx_equipment_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Equipment with its building reference and assignment count, as returned
/// by list and detail views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentWithBuilding {
    #[serde(flatten)]
    pub equipment: Equipment,
    pub building: BuildingRef,
    pub assignment_count: i64,
}

/// Flat join row backing [`EquipmentWithBuilding`]. The `type` column is
/// aliased to `equipment_type` in queries.
#[derive(Debug, Clone, FromRow)]
pub struct EquipmentRow {
    pub id: DbId,
    pub building_id: DbId,
    pub name: String,
    pub equipment_type: String,
    pub fmx_equipment_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub building_name: String,
    pub building_fmx_name: String,
    pub assignment_count: i64,
}

impl From<EquipmentRow> for EquipmentWithBuilding {
    fn from(row: EquipmentRow) -> Self {
        EquipmentWithBuilding {
            building: BuildingRef {
                id: row.building_id,
                name: row.building_name,
                fmx_building_name: row.building_fmx_name,
            },
            equipment: Equipment {
                id: row.id,
                building_id: row.building_id,
                name: row.name,
                equipment_type: row.equipment_type,
                fmx_equipment_name: row.fmx_equipment_name,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            assignment_count: row.assignment_count,
        }
    }
}

/// Input DTO for creating or overwriting an equipment item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentInput {
    pub building_id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub fmx_equipment_name: String,
}
