//! PM template and assignment endpoints: linking task templates, bulk
//! assignment creation, duplicate rejection, and the available-equipment
//! lookup.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, post_json};
use sqlx::PgPool;

struct Fixture {
    building_id: i64,
    equipment_a: i64,
    equipment_b: i64,
    task_template_id: i64,
    pm_template_id: i64,
}

/// One building with two equipment items and a PM template carrying one
/// weekly task.
async fn fixture(pool: &PgPool) -> Fixture {
    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/buildings",
        serde_json::json!({"name": "Plant", "fmxBuildingName": "PLANT-01"}),
    )
    .await;
    let building_id = body_json(response).await["id"].as_i64().unwrap();

    let mut equipment = Vec::new();
    for (name, fmx) in [("AHU-1", "AHU-01"), ("AHU-2", "AHU-02")] {
        let app = build_test_app(pool.clone());
        let response = post_json(
            app,
            "/api/equipment",
            serde_json::json!({
                "buildingId": building_id,
                "name": name,
                "type": "AHU",
                "fmxEquipmentName": fmx,
            }),
        )
        .await;
        equipment.push(body_json(response).await["id"].as_i64().unwrap());
    }

    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/instructions",
        serde_json::json!({
            "name": "Filter Swap",
            "steps": [{"text": "Replace the filter"}],
        }),
    )
    .await;
    let instruction_id = body_json(response).await["id"].as_i64().unwrap();

    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/request-types",
        serde_json::json!({"name": "Preventive Maintenance"}),
    )
    .await;
    let request_type_id = body_json(response).await["id"].as_i64().unwrap();

    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/task-templates",
        serde_json::json!({
            "name": "Weekly Filter Swap",
            "instructionId": instruction_id,
            "requestTypeId": request_type_id,
            "firstDueDate": "2025-04-07",
            "repeatEnum": "WEEKLY",
            "weeklyMon": true,
        }),
    )
    .await;
    let task_template_id = body_json(response).await["id"].as_i64().unwrap();

    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/pm-templates",
        serde_json::json!({
            "name": "AHU Quarterly",
            "taskTemplateIds": [task_template_id],
        }),
    )
    .await;
    let pm_template_id = body_json(response).await["id"].as_i64().unwrap();

    Fixture {
        building_id,
        equipment_a: equipment[0],
        equipment_b: equipment[1],
        task_template_id,
        pm_template_id,
    }
}

// ---------------------------------------------------------------------------
// PM templates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_pm_template_detail_embeds_tasks(pool: PgPool) {
    let fx = fixture(&pool).await;

    let app = build_test_app(pool);
    let response = get(app, &format!("/api/pm-templates/{}", fx.pm_template_id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["taskCount"], 1);
    assert_eq!(json["tasks"][0]["id"], fx.task_template_id);
    assert_eq!(json["tasks"][0]["name"], "Weekly Filter Swap");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_duplicate_pm_template_name_returns_400(pool: PgPool) {
    fixture(&pool).await;

    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/pm-templates",
        serde_json::json!({"name": "AHU Quarterly"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "A PM template with this name already exists"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_pm_template_rejects_unknown_task_links(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/pm-templates",
        serde_json::json!({"name": "Broken Links", "taskTemplateIds": [999999]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "One or more task templates not found"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_linked_task_template_is_blocked(pool: PgPool) {
    let fx = fixture(&pool).await;

    let app = build_test_app(pool);
    let response = delete(app, &format!("/api/task-templates/{}", fx.task_template_id)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"],
        "Cannot delete task template that is used by PM templates"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_assigned_pm_template_is_blocked(pool: PgPool) {
    let fx = fixture(&pool).await;

    let app = build_test_app(pool.clone());
    post_json(
        app,
        "/api/assignments",
        serde_json::json!({
            "pmTemplateId": fx.pm_template_id,
            "equipmentIds": [fx.equipment_a],
        }),
    )
    .await;

    let app = build_test_app(pool);
    let response = delete(app, &format!("/api/pm-templates/{}", fx.pm_template_id)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Cannot delete PM template that is assigned to equipment. Remove all assignments first."
    );
}

// ---------------------------------------------------------------------------
// Assignments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_bulk_assignment_creates_one_row_per_equipment(pool: PgPool) {
    let fx = fixture(&pool).await;

    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/assignments",
        serde_json::json!({
            "pmTemplateId": fx.pm_template_id,
            "equipmentIds": [fx.equipment_a, fx.equipment_b],
            "assignedUsers": "jdoe",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["created"], 2);

    let app = build_test_app(pool);
    let response = get(
        app,
        &format!("/api/assignments?pmTemplateId={}", fx.pm_template_id),
    )
    .await;
    let json = body_json(response).await;
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["pmTemplate"]["name"], "AHU Quarterly");
    assert_eq!(rows[0]["building"]["name"], "Plant");
    assert_eq!(rows[0]["assignedUsers"], "jdoe");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_assignment_requires_equipment_ids(pool: PgPool) {
    let fx = fixture(&pool).await;

    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/assignments",
        serde_json::json!({"pmTemplateId": fx.pm_template_id, "equipmentIds": []}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "PM Template ID and equipment IDs are required"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_duplicate_assignment_names_the_equipment(pool: PgPool) {
    let fx = fixture(&pool).await;

    let app = build_test_app(pool.clone());
    post_json(
        app,
        "/api/assignments",
        serde_json::json!({
            "pmTemplateId": fx.pm_template_id,
            "equipmentIds": [fx.equipment_a],
        }),
    )
    .await;

    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/assignments",
        serde_json::json!({
            "pmTemplateId": fx.pm_template_id,
            "equipmentIds": [fx.equipment_a, fx.equipment_b],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "PM Template is already assigned to: AHU-1 (Plant)"
    );

    // The whole batch was rejected, including the not-yet-assigned item.
    let app = build_test_app(pool);
    let response = get(
        app,
        &format!("/api/assignments?pmTemplateId={}", fx.pm_template_id),
    )
    .await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_assignment_reports_what_was_removed(pool: PgPool) {
    let fx = fixture(&pool).await;

    let app = build_test_app(pool.clone());
    post_json(
        app,
        "/api/assignments",
        serde_json::json!({
            "pmTemplateId": fx.pm_template_id,
            "equipmentIds": [fx.equipment_a],
        }),
    )
    .await;

    let app = build_test_app(pool.clone());
    let response = get(app, "/api/assignments").await;
    let id = body_json(response).await[0]["id"].as_i64().unwrap();

    let app = build_test_app(pool);
    let response = delete(app, &format!("/api/assignments/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Removed assignment of \"AHU Quarterly\" from AHU-1 (Plant)"
    );
}

// ---------------------------------------------------------------------------
// Available equipment
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_available_equipment_excludes_assigned_items(pool: PgPool) {
    let fx = fixture(&pool).await;

    let app = build_test_app(pool.clone());
    post_json(
        app,
        "/api/assignments",
        serde_json::json!({
            "pmTemplateId": fx.pm_template_id,
            "equipmentIds": [fx.equipment_a],
        }),
    )
    .await;

    let app = build_test_app(pool);
    let response = get(
        app,
        &format!(
            "/api/assignments/available-equipment?buildingId={}&pmTemplateId={}",
            fx.building_id, fx.pm_template_id
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let equipment = json["equipment"].as_array().unwrap();
    assert_eq!(equipment.len(), 1);
    assert_eq!(equipment[0]["name"], "AHU-2");
    assert_eq!(json["excludedCount"], 1);
    assert_eq!(json["equipmentTypes"], serde_json::json!(["AHU"]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_available_equipment_requires_building_id(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app, "/api/assignments/available-equipment").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Building ID is required");
}
