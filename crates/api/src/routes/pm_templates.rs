use axum::routing::get;
use axum::Router;

use crate::handlers::pm_template;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pm_template::list).post(pm_template::create))
        .route(
            "/{id}",
            get(pm_template::get_by_id)
                .put(pm_template::update)
                .delete(pm_template::delete),
        )
}
