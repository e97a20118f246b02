use axum::routing::get;
use axum::Router;

use crate::handlers::task_template;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(task_template::list).post(task_template::create))
        .route(
            "/{id}",
            get(task_template::get_by_id)
                .put(task_template::update)
                .delete(task_template::delete),
        )
}
