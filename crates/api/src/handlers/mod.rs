pub mod assignment;
pub mod building;
pub mod equipment;
pub mod export;
pub mod instruction;
pub mod pm_template;
pub mod request_type;
pub mod task_template;
