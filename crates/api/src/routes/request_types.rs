use axum::routing::get;
use axum::Router;

use crate::handlers::request_type;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(request_type::list).post(request_type::create))
        .route(
            "/{id}",
            get(request_type::get_by_id)
                .put(request_type::update)
                .delete(request_type::delete),
        )
}
