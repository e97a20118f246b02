//! Export endpoints: pre-flight validation and workbook download.

mod common;

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use common::{body_bytes, body_json, build_test_app, post_json};
use sqlx::PgPool;

/// Seed a building with one assigned equipment item carrying a weekly task,
/// returning the building id.
async fn seed(pool: &PgPool) -> i64 {
    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/buildings",
        serde_json::json!({"name": "Plant", "fmxBuildingName": "PLANT-01"}),
    )
    .await;
    let building_id = body_json(response).await["id"].as_i64().unwrap();

    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/equipment",
        serde_json::json!({
            "buildingId": building_id,
            "name": "RTU-1",
            "type": "RTU",
            "fmxEquipmentName": "RTU-01",
        }),
    )
    .await;
    let equipment_id = body_json(response).await["id"].as_i64().unwrap();

    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/instructions",
        serde_json::json!({
            "name": "Filter Swap",
            "steps": [{"text": "Check filter"}, {"text": "Replace if dirty"}],
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
            "name": "RTU Program",
            "taskTemplateIds": [task_template_id],
        }),
    )
    .await;
    let pm_template_id = body_json(response).await["id"].as_i64().unwrap();

    let app = build_test_app(pool.clone());
    post_json(
        app,
        "/api/assignments",
        serde_json::json!({
            "pmTemplateId": pm_template_id,
            "equipmentIds": [equipment_id],
        }),
    )
    .await;

    building_id
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_validate_reports_counts(pool: PgPool) {
    let building_id = seed(&pool).await;

    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/export/validate",
        serde_json::json!({"buildingIds": [building_id]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["isValid"], true);
    assert_eq!(json["errors"].as_array().unwrap().len(), 0);
    assert_eq!(json["assignmentCount"], 1);
    assert_eq!(json["taskCount"], 1);
    assert_eq!(json["instructionCount"], 1);
    assert_eq!(json["equipmentCount"], 1);
    assert_eq!(json["buildingCount"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_validate_flags_missing_fmx_equipment_name(pool: PgPool) {
    let building_id = seed(&pool).await;

    // Blank the FMX name underneath the API; the write path refuses to.
    sqlx::query("UPDATE equipment SET fmx_equipment_name = ''")
        .execute(&pool)
        .await
        .unwrap();

    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/export/validate",
        serde_json::json!({"buildingIds": [building_id]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["isValid"], false);
    let errors = json["errors"].as_array().unwrap();
    assert!(errors
        .iter()
        .any(|e| e["field"] == "equipment.fmxEquipmentName"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_export_returns_spreadsheet(pool: PgPool) {
    let building_id = seed(&pool).await;

    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/export",
        serde_json::json!({"buildingIds": [building_id]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let disposition = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"fmx-planned-maintenance-"));
    assert!(disposition.ends_with(".xlsx\""));

    let bytes = body_bytes(response).await;
    // XLSX files are zip archives.
    assert_eq!(&bytes[..2], b"PK");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_export_with_invalid_data_returns_400(pool: PgPool) {
    let building_id = seed(&pool).await;
    sqlx::query("UPDATE equipment SET fmx_equipment_name = ''")
        .execute(&pool)
        .await
        .unwrap();

    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/export",
        serde_json::json!({"buildingIds": [building_id]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "EXPORT_ERROR");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("FMX Equipment Name is required for export"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_export_without_criteria_returns_400(pool: PgPool) {
    seed(&pool).await;

    let app = build_test_app(pool);
    let response = post_json(app, "/api/export", serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "No buildings or equipment specified for export"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_export_with_no_matching_assignments_returns_400(pool: PgPool) {
    seed(&pool).await;

    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/export",
        serde_json::json!({"buildingIds": [999999]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "No assignments found for the specified criteria"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_include_all_equipment_wins_over_id_lists(pool: PgPool) {
    seed(&pool).await;

    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/export/validate",
        serde_json::json!({
            "includeAllEquipment": true,
            "buildingIds": [999999],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["assignmentCount"], 1);
}
