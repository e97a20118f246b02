//! HTTP-level integration tests for the building, equipment, instruction,
//! and request type endpoints.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, post_json, put_json};
use sqlx::PgPool;

async fn create_building(pool: &PgPool, name: &str, fmx: &str) -> i64 {
    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/buildings",
        serde_json::json!({"name": name, "fmxBuildingName": fmx}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

async fn create_equipment(pool: &PgPool, building_id: i64, name: &str, fmx: &str) -> i64 {
    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/equipment",
        serde_json::json!({
            "buildingId": building_id,
            "name": name,
            "type": "RTU",
            "fmxEquipmentName": fmx,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Building CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_building_returns_201(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/buildings",
        serde_json::json!({"name": "North Campus", "fmxBuildingName": "NORTH-01"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["name"], "North Campus");
    assert_eq!(json["fmxBuildingName"], "NORTH-01");
    assert_eq!(json["equipmentCount"], 0);
    assert!(json["id"].is_number());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_building_trims_and_requires_names(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/buildings",
        serde_json::json!({"name": "   ", "fmxBuildingName": "X"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Name and FMX Building Name are required");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_duplicate_building_name_returns_409(pool: PgPool) {
    create_building(&pool, "Main", "MAIN-01").await;

    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/buildings",
        serde_json::json!({"name": "Main", "fmxBuildingName": "MAIN-02"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(
        json["error"],
        "Building with this name or FMX name already exists"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_building(pool: PgPool) {
    let id = create_building(&pool, "Old Name", "OLD-01").await;

    let app = build_test_app(pool);
    let response = put_json(
        app,
        &format!("/api/buildings/{id}"),
        serde_json::json!({"name": "New Name", "fmxBuildingName": "OLD-01"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "New Name");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_get_nonexistent_building_returns_404(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app, "/api/buildings/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_building_with_equipment_is_blocked(pool: PgPool) {
    let building_id = create_building(&pool, "Occupied", "OCC-01").await;
    create_equipment(&pool, building_id, "RTU-1", "RTU-01").await;

    let app = build_test_app(pool.clone());
    let response = delete(app, &format!("/api/buildings/{building_id}")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Cannot delete building with existing equipment");

    // Still there.
    let app = build_test_app(pool);
    let response = get(app, &format!("/api/buildings/{building_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_empty_building(pool: PgPool) {
    let id = create_building(&pool, "Empty", "EMPTY-01").await;

    let app = build_test_app(pool);
    let response = delete(app, &format!("/api/buildings/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Building deleted successfully"
    );
}

// ---------------------------------------------------------------------------
// Equipment CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_equipment_embeds_building(pool: PgPool) {
    let building_id = create_building(&pool, "Plant", "PLANT-01").await;

    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/equipment",
        serde_json::json!({
            "buildingId": building_id,
            "name": "Boiler 1",
            "type": "Boiler",
            "fmxEquipmentName": "BOILER-01",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["type"], "Boiler");
    assert_eq!(json["building"]["name"], "Plant");
    assert_eq!(json["assignmentCount"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_equipment_for_unknown_building_returns_400(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/equipment",
        serde_json::json!({
            "buildingId": 999999,
            "name": "Ghost",
            "type": "RTU",
            "fmxEquipmentName": "GHOST-01",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Building not found");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_duplicate_fmx_equipment_name_returns_409(pool: PgPool) {
    let building_id = create_building(&pool, "Plant", "PLANT-01").await;
    create_equipment(&pool, building_id, "RTU-1", "RTU-01").await;

    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/equipment",
        serde_json::json!({
            "buildingId": building_id,
            "name": "RTU-2",
            "type": "RTU",
            "fmxEquipmentName": "RTU-01",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"],
        "Equipment with this FMX name already exists"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_equipment_filtered_by_building(pool: PgPool) {
    let a = create_building(&pool, "A", "A-01").await;
    let b = create_building(&pool, "B", "B-01").await;
    create_equipment(&pool, a, "AHU-1", "AHU-01").await;
    create_equipment(&pool, b, "AHU-2", "AHU-02").await;

    let app = build_test_app(pool.clone());
    let response = get(app, &format!("/api/equipment?buildingId={a}")).await;
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["name"], "AHU-1");

    let app = build_test_app(pool);
    let response = get(app, "/api/equipment").await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Instruction sets
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_instruction_with_steps(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/instructions",
        serde_json::json!({
            "name": "Filter Change",
            "description": "Quarterly filter swap",
            "steps": [
                {"text": "Shut down unit"},
                {"text": "Replace filter"},
                {"text": "Restart unit"},
            ],
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["steps"].as_array().unwrap().len(), 3);
    assert_eq!(json["steps"][0]["text"], "Shut down unit");
    assert_eq!(json["steps"][0]["orderIndex"], 0);
    assert_eq!(json["steps"][2]["orderIndex"], 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_instruction_requires_at_least_one_step(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/instructions",
        serde_json::json!({"name": "Empty", "steps": []}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "At least one step is required"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_instruction_rejects_blank_step_with_position(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/instructions",
        serde_json::json!({
            "name": "Partial",
            "steps": [{"text": "Fine"}, {"text": "   "}],
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Step 2 cannot be empty");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_instruction_replaces_steps(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/instructions",
        serde_json::json!({
            "name": "Belt Check",
            "steps": [{"text": "Old step 1"}, {"text": "Old step 2"}],
        }),
    )
    .await;
    let id = body_json(response).await["id"].as_i64().unwrap();

    let app = build_test_app(pool);
    let response = put_json(
        app,
        &format!("/api/instructions/{id}"),
        serde_json::json!({
            "name": "Belt Check",
            "steps": [{"text": "Only step"}],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let steps = json["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0]["text"], "Only step");
    assert_eq!(steps[0]["orderIndex"], 0);
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_request_type_crud(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/request-types",
        serde_json::json!({"name": "Preventive Maintenance"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["id"].as_i64().unwrap();

    let app = build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/request-types/{id}"),
        serde_json::json!({"name": "PM Work"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "PM Work");

    let app = build_test_app(pool);
    let response = delete(app, &format!("/api/request-types/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_duplicate_request_type_returns_409(pool: PgPool) {
    let app = build_test_app(pool.clone());
    post_json(
        app,
        "/api/request-types",
        serde_json::json!({"name": "Inspection"}),
    )
    .await;

    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/request-types",
        serde_json::json!({"name": "Inspection"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"],
        "Request type with this name already exists"
    );
}
