//! Resolved assignment graph consumed by the export validator and the
//! workbook builder.
//!
//! These are plain value types: the repository layer loads and joins the
//! rows, so validation and workbook generation stay independent of the
//! store. Fields mirror what spreadsheet generation needs, nothing more.

use chrono::NaiveDate;

use crate::recurrence::RecurrenceFields;
use crate::types::DbId;

#[derive(Debug, Clone)]
pub struct ExportBuilding {
    pub id: DbId,
    pub name: String,
    pub fmx_building_name: String,
}

#[derive(Debug, Clone)]
pub struct ExportEquipment {
    pub id: DbId,
    pub name: String,
    pub fmx_equipment_name: String,
    pub building: ExportBuilding,
}

#[derive(Debug, Clone)]
pub struct ExportInstruction {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    /// Step texts, already ordered by `order_index`.
    pub steps: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ExportRequestType {
    pub id: DbId,
    pub name: String,
}

/// A task template with its references resolved.
///
/// `repeat`, `first_due_date`, `request_type` and `instruction` are optional
/// because stored data may have been seeded without going through the API
/// validator; the export validator reports every hole before the workbook
/// builder runs.
#[derive(Debug, Clone)]
pub struct ExportTask {
    pub id: DbId,
    pub name: String,
    pub location: Option<String>,
    pub first_due_date: Option<NaiveDate>,
    pub repeat: Option<String>,
    pub recurrence: RecurrenceFields,
    pub exclude_from: Option<NaiveDate>,
    pub exclude_thru: Option<NaiveDate>,
    /// Stored mode string, passed through to the sheet verbatim.
    pub next_due_mode: String,
    pub inventory_names: Option<String>,
    pub inventory_quantities: Option<String>,
    pub est_time_hours: Option<f64>,
    pub notes: Option<String>,
    pub request_type: Option<ExportRequestType>,
    pub instruction: Option<ExportInstruction>,
}

/// One assignment row with its full join graph: equipment, building, and
/// every task reachable through the assigned PM template.
#[derive(Debug, Clone)]
pub struct ExportAssignment {
    pub id: DbId,
    pub equipment: ExportEquipment,
    pub tasks: Vec<ExportTask>,
    pub assigned_users: Option<String>,
    pub outsourced: bool,
    pub remind_before_days_primary: Option<i32>,
    pub remind_before_days_secondary: Option<i32>,
    pub remind_after_days: Option<i32>,
}
