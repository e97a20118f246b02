use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::assignment;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assignment::list).post(assignment::create))
        // The lookup route is registered before the id route so
        // "available-equipment" never parses as an id.
        .route(
            "/available-equipment",
            get(assignment::available_equipment),
        )
        .route("/{id}", delete(assignment::delete))
}
