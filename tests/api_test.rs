use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use taskfile::api::router;
use taskfile::config::AppConfig;
use taskfile::state::AppState;
use taskfile::store::{MemoryTaskStore, TaskStore};
use tower::ServiceExt;

fn test_config() -> AppConfig {
    AppConfig {
        auto_save_interval_ms: 30_000,
        data_storage_path: "./data".to_string(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
    }
}

async fn test_app() -> (Router, Arc<MemoryTaskStore>) {
    let store = Arc::new(MemoryTaskStore::new());
    store.create_file("inbox").await.expect("seed file");
    let state = AppState::new(test_config(), store.clone());
    let app = router(state);

    // Open the seeded file so mutations have a save target.
    let response = app
        .clone()
        .oneshot(request("POST", "/files/inbox/open", None))
        .await
        .expect("open file");
    assert_eq!(response.status(), StatusCode::OK);
    (app, store)
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

async fn create_task(app: &Router, body: Value) -> Value {
    let response = app
        .clone()
        .oneshot(request("POST", "/tasks", Some(body)))
        .await
        .expect("create task");
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn health_returns_ok() {
    let (app, _store) = test_app().await;
    let response = app
        .oneshot(request("GET", "/health", None))
        .await
        .expect("health");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn config_exposes_interval_and_path() {
    let (app, _store) = test_app().await;
    let response = app
        .oneshot(request("GET", "/config", None))
        .await
        .expect("config");
    let body = body_json(response).await;
    assert_eq!(body["autoSaveIntervalMs"], 30_000);
    assert_eq!(body["dataStoragePath"], "./data");
}

#[tokio::test]
async fn create_and_list_tasks_with_filter_and_sort() {
    let (app, _store) = test_app().await;
    create_task(
        &app,
        json!({"title": "pay rent", "priority": "high", "dueDate": "2026-09-05"}),
    )
    .await;
    create_task(&app, json!({"title": "water plants", "priority": "low"})).await;
    create_task(
        &app,
        json!({"title": "book flights", "priority": "high", "dueDate": "2026-09-01"}),
    )
    .await;

    let response = app
        .oneshot(request(
            "GET",
            "/tasks?priority=high&sortBy=dueDate&direction=asc",
            None,
        ))
        .await
        .expect("list tasks");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let titles: Vec<&str> = body
        .as_array()
        .expect("array")
        .iter()
        .map(|t| t["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, ["book flights", "pay rent"]);
}

#[tokio::test]
async fn search_filters_by_substring() {
    let (app, _store) = test_app().await;
    create_task(&app, json!({"title": "Buy groceries", "memo": "milk, eggs"})).await;
    create_task(&app, json!({"title": "Send invoice"})).await;

    let response = app
        .oneshot(request("GET", "/tasks?search=milk", None))
        .await
        .expect("search");
    let body = body_json(response).await;
    assert_eq!(body.as_array().expect("array").len(), 1);
    assert_eq!(body[0]["title"], "Buy groceries");
}

#[tokio::test]
async fn invalid_task_is_rejected_with_field_errors() {
    let (app, _store) = test_app().await;
    let response = app
        .oneshot(request(
            "POST",
            "/tasks",
            Some(json!({"title": "   ", "dueDate": "not a date"})),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .expect("fields")
        .iter()
        .map(|f| f["field"].as_str().expect("field"))
        .collect();
    assert_eq!(fields, ["title", "dueDate"]);
}

#[tokio::test]
async fn toggle_sets_and_clears_completion() {
    let (app, _store) = test_app().await;
    let task = create_task(&app, json!({"title": "laundry"})).await;
    let id = task["id"].as_str().expect("id");

    let response = app
        .clone()
        .oneshot(request("PATCH", &format!("/tasks/{id}/toggle"), None))
        .await
        .expect("toggle");
    let body = body_json(response).await;
    assert_eq!(body["completed"], true);
    assert!(body["completedAt"].is_string());

    let response = app
        .clone()
        .oneshot(request("PATCH", &format!("/tasks/{id}/toggle"), None))
        .await
        .expect("toggle back");
    let body = body_json(response).await;
    assert_eq!(body["completed"], false);
    assert!(body.get("completedAt").is_none());
}

#[tokio::test]
async fn update_patches_fields_and_clears_with_null() {
    let (app, _store) = test_app().await;
    let task = create_task(
        &app,
        json!({"title": "draft email", "memo": "cc the team", "dueDate": "2026-09-01"}),
    )
    .await;
    let id = task["id"].as_str().expect("id");

    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/tasks/{id}"),
            Some(json!({"title": "send email", "dueDate": null})),
        ))
        .await
        .expect("update");
    let body = body_json(response).await;
    assert_eq!(body["title"], "send email");
    assert!(body.get("dueDate").is_none());
    assert_eq!(body["memo"], "cc the team");
}

#[tokio::test]
async fn unknown_task_returns_not_found() {
    let (app, _store) = test_app().await;
    let response = app
        .oneshot(request("DELETE", "/tasks/missing-id", None))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn archive_groups_completed_tasks_and_reports_stats() {
    let (app, _store) = test_app().await;
    let task = create_task(&app, json!({"title": "ship release"})).await;
    let id = task["id"].as_str().expect("id");
    create_task(&app, json!({"title": "still open"})).await;

    app.clone()
        .oneshot(request("PATCH", &format!("/tasks/{id}/toggle"), None))
        .await
        .expect("complete");

    let response = app
        .clone()
        .oneshot(request("GET", "/archive", None))
        .await
        .expect("archive");
    let body = body_json(response).await;
    let groups = body.as_array().expect("groups");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["label"], "Today");
    assert_eq!(groups[0]["tasks"][0]["title"], "ship release");

    let response = app
        .oneshot(request("GET", "/archive/stats", None))
        .await
        .expect("stats");
    let stats = body_json(response).await;
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["today"], 1);
    assert_eq!(stats["thisWeek"], 1);
}

#[tokio::test]
async fn mutations_trigger_auto_save() {
    let (app, store) = test_app().await;
    create_task(&app, json!({"title": "persisted"})).await;
    assert_eq!(store.save_count(), 1);

    let saved = store.fetch_tasks("inbox").await.expect("saved file");
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].title, "persisted");

    let response = app
        .oneshot(request("GET", "/autosave", None))
        .await
        .expect("status");
    let status = body_json(response).await;
    assert_eq!(status["state"], "idle");
    assert!(status["lastSavedAt"].is_string());
}

#[tokio::test]
async fn save_now_endpoint_reports_whether_it_saved() {
    let (app, _store) = test_app().await;

    // Empty collection: nothing to persist.
    let response = app
        .clone()
        .oneshot(request("POST", "/autosave/save", None))
        .await
        .expect("save");
    let body = body_json(response).await;
    assert_eq!(body["saved"], false);

    create_task(&app, json!({"title": "something"})).await;
    let response = app
        .oneshot(request("POST", "/autosave/save", None))
        .await
        .expect("save");
    let body = body_json(response).await;
    assert_eq!(body["saved"], true);
}

#[tokio::test]
async fn deleting_the_open_file_deselects_it() {
    let (app, store) = test_app().await;
    create_task(&app, json!({"title": "will be orphaned"})).await;

    let response = app
        .clone()
        .oneshot(request("DELETE", "/files/inbox", None))
        .await
        .expect("delete file");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // With no file selected, further mutations no longer save anywhere.
    let count = store.save_count();
    create_task(&app, json!({"title": "unsaved"})).await;
    assert_eq!(store.save_count(), count);
    assert!(store.list_files().await.expect("list").is_empty());
}
