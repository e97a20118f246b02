//! Building entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use pmx_core::types::{DbId, Timestamp};

/// A row from the `buildings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: DbId,
    pub name: String,
    pub fmx_building_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Building with its equipment count, as returned by list and detail views.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingWithStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub building: Building,
    pub equipment_count: i64,
}

/// Input DTO for creating or overwriting a building.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingInput {
    pub name: String,
    pub fmx_building_name: String,
}

/// Reference embedded in equipment and assignment views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingRef {
    pub id: DbId,
    pub name: String,
    pub fmx_building_name: String,
}
