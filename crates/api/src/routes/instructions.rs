use axum::routing::get;
use axum::Router;

use crate::handlers::instruction;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(instruction::list).post(instruction::create))
        .route(
            "/{id}",
            get(instruction::get_by_id)
                .put(instruction::update)
                .delete(instruction::delete),
        )
}
