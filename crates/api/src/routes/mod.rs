//! Route table construction.

pub mod assignments;
pub mod buildings;
pub mod equipment;
pub mod export;
pub mod health;
pub mod instructions;
pub mod pm_templates;
pub mod request_types;
pub mod task_templates;

use axum::Router;

use crate::state::AppState;

/// All routes mounted under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/buildings", buildings::router())
        .nest("/equipment", equipment::router())
        .nest("/instructions", instructions::router())
        .nest("/request-types", request_types::router())
        .nest("/task-templates", task_templates::router())
        .nest("/pm-templates", pm_templates::router())
        .nest("/assignments", assignments::router())
        .nest("/export", export::router())
}
