use axum::routing::get;
use axum::Router;

use crate::handlers::building;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(building::list).post(building::create))
        .route(
            "/{id}",
            get(building::get_by_id)
                .put(building::update)
                .delete(building::delete),
        )
}
