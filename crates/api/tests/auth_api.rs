//! Admin token enforcement on `/api` routes.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, get_unauthed, get_with_auth_header, TEST_TOKEN};
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_missing_token_returns_401(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get_unauthed(app, "/api/buildings").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Unauthorized access");
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_wrong_token_returns_401(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get_with_auth_header(app, "/api/buildings", "Bearer not-the-token").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_bearer_token_is_accepted(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app, "/api/buildings").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_bare_token_without_bearer_prefix_is_accepted(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get_with_auth_header(app, "/api/buildings", TEST_TOKEN).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_every_api_prefix_is_protected(pool: PgPool) {
    for uri in [
        "/api/buildings",
        "/api/equipment",
        "/api/instructions",
        "/api/request-types",
        "/api/task-templates",
        "/api/pm-templates",
        "/api/assignments",
    ] {
        let app = build_test_app(pool.clone());
        let response = get_unauthed(app, uri).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri: {uri}");
    }
}
