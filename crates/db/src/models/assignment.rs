//! PM template assignment model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use pmx_core::types::{DbId, Timestamp};

use crate::models::building::BuildingRef;
use crate::models::pm_template::PmTemplateRef;

/// A row from the `pm_template_assignments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: DbId,
    pub pm_template_id: DbId,
    pub equipment_id: DbId,
    /// Denormalized from the equipment row at creation time.
    pub building_id: DbId,
    pub assigned_users: Option<String>,
    pub outsourced: bool,
    pub remind_before_days_primary: Option<i32>,
    pub remind_before_days_secondary: Option<i32>,
    pub remind_after_days: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Equipment reference embedded in assignment views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentEquipmentRef {
    pub id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub fmx_equipment_name: String,
}

/// Assignment with its PM template, equipment, and building references.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentWithRefs {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub pm_template: PmTemplateRef,
    pub equipment: AssignmentEquipmentRef,
    pub building: BuildingRef,
}

/// Flat join row backing [`AssignmentWithRefs`].
#[derive(Debug, Clone, FromRow)]
pub struct AssignmentRow {
    #[sqlx(flatten)]
    pub assignment: Assignment,
    pub pm_template_name: String,
    pub pm_template_description: Option<String>,
    pub equipment_name: String,
    pub equipment_type: String,
    pub fmx_equipment_name: String,
    pub building_name: String,
    pub building_fmx_name: String,
}

impl From<AssignmentRow> for AssignmentWithRefs {
    fn from(row: AssignmentRow) -> Self {
        AssignmentWithRefs {
            pm_template: PmTemplateRef {
                id: row.assignment.pm_template_id,
                name: row.pm_template_name,
                description: row.pm_template_description,
            },
            equipment: AssignmentEquipmentRef {
                id: row.assignment.equipment_id,
                name: row.equipment_name,
                equipment_type: row.equipment_type,
                fmx_equipment_name: row.fmx_equipment_name,
            },
            building: BuildingRef {
                id: row.assignment.building_id,
                name: row.building_name,
                fmx_building_name: row.building_fmx_name,
            },
            assignment: row.assignment,
        }
    }
}

/// Wire input for bulk assignment creation: one PM template bound to many
/// equipment items with shared reminder settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentInput {
    pub pm_template_id: DbId,
    #[serde(default)]
    pub equipment_ids: Vec<DbId>,
    pub assigned_users: Option<String>,
    #[serde(default)]
    pub outsourced: bool,
    pub remind_before_days_primary: Option<i32>,
    pub remind_before_days_secondary: Option<i32>,
    pub remind_after_days: Option<i32>,
}

/// Response body for bulk creation.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentsCreated {
    pub created: u64,
}

/// Response body for the available-equipment lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableEquipment {
    pub equipment: Vec<crate::models::equipment::EquipmentWithBuilding>,
    pub equipment_types: Vec<String>,
    pub excluded_count: i64,
}
