//! Entity models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` input DTO; PUT is a full-field overwrite, so create
//!   and update share the same DTO
//! - List/detail views embedding related entities and counts the way the
//!   clients consume them
//!
//! JSON field names are camelCase; that shape is the external contract.

pub mod assignment;
pub mod building;
pub mod equipment;
pub mod instruction;
pub mod pm_template;
pub mod request_type;
pub mod task_template;

use serde::Serialize;
use sqlx::FromRow;

use pmx_core::types::DbId;

/// Minimal id + name reference embedded in related-entity views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EntityRef {
    pub id: DbId,
    pub name: String,
}
