//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod assignment_repo;
pub mod building_repo;
pub mod equipment_repo;
pub mod export_repo;
pub mod instruction_repo;
pub mod pm_template_repo;
pub mod request_type_repo;
pub mod task_template_repo;

pub use assignment_repo::AssignmentRepo;
pub use building_repo::BuildingRepo;
pub use equipment_repo::EquipmentRepo;
pub use export_repo::{ExportFilter, ExportRepo};
pub use instruction_repo::InstructionRepo;
pub use pm_template_repo::PmTemplateRepo;
pub use request_type_repo::RequestTypeRepo;
pub use task_template_repo::TaskTemplateRepo;
