use axum::routing::post;
use axum::Router;

use crate::handlers::export;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(export::export))
        .route("/validate", post(export::validate))
}
