//! FMX export pipeline: resolved assignment graph, pre-flight validation,
//! and workbook generation.

pub mod graph;
pub mod validator;
pub mod workbook;

pub use graph::{
    ExportAssignment, ExportBuilding, ExportEquipment, ExportInstruction, ExportRequestType,
    ExportTask,
};
pub use validator::{format_validation_errors, validate_export, ValidationError, ValidationResult};
pub use workbook::{build_workbook, export_file_name};

/// Failure modes of the export pipeline.
///
/// Validation failures carry the full aggregated error list so the operator
/// sees every fix needed in one pass; the Display impl renders the same
/// field-grouped message the pre-flight endpoint produces.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No assignments found for the specified criteria")]
    NoAssignments,

    #[error("{}", format_validation_errors(errors))]
    Invalid { errors: Vec<ValidationError> },

    #[error("Failed to serialize workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}
