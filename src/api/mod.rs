use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{delete, get, patch, post};
use axum::{Router, extract::State, http::StatusCode};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{NewTaskRequest, Priority, Task, UpdateTaskRequest};
use crate::query::{
    Direction, FilterConfig, GroupField, SortConfig, SortField, StatusFilter, TagMode,
    apply_filter, apply_sort, archive_stats, day_label, group_by_date,
};
use crate::services::{AutoSaveStatus, SaveOutcome};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskQueryParams {
    status: Option<StatusFilter>,
    priority: Option<Priority>,
    tags: Option<String>,
    tag_mode: Option<TagMode>,
    search: Option<String>,
    sort_by: Option<SortField>,
    direction: Option<Direction>,
}

#[derive(Deserialize)]
struct CreateFileRequest {
    name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ArchiveGroup {
    date: String,
    label: String,
    tasks: Vec<Task>,
}

#[derive(Serialize)]
struct SaveResponse {
    saved: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/config", get(get_config))
        .route("/files", get(list_files).post(create_file))
        .route("/files/{name}", delete(delete_file))
        .route("/files/{name}/open", post(open_file))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", patch(update_task).delete(delete_task))
        .route("/tasks/{id}/toggle", patch(toggle_task))
        .route("/archive", get(archive))
        .route("/archive/stats", get(get_archive_stats))
        .route("/autosave", get(autosave_status))
        .route("/autosave/save", post(save_now))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> StatusCode {
    match state.store.list_files().await {
        Ok(_) => StatusCode::OK,
        Err(err) => {
            error!("health check failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn get_config(State(state): State<AppState>) -> Json<AppConfig> {
    Json(state.config.clone())
}

async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    let files = state.store.list_files().await?;
    Ok(Json(files))
}

async fn create_file(
    State(state): State<AppState>,
    Json(req): Json<CreateFileRequest>,
) -> Result<StatusCode, AppError> {
    state.store.create_file(&req.name).await?;
    Ok(StatusCode::CREATED)
}

async fn delete_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.delete_file(&name).await?;
    // Deselect a deleted file so auto-save does not quietly recreate it.
    let mut workspace = state.workspace.write().await;
    if workspace.file_id.as_deref() == Some(name.as_str()) {
        workspace.file_id = None;
        workspace.tasks.clear();
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn open_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = state.store.fetch_tasks(&name).await?;
    {
        let mut workspace = state.workspace.write().await;
        workspace.file_id = Some(name);
        workspace.tasks = tasks.clone();
    }
    state.autosave.mark_loaded().await?;
    Ok(Json(tasks))
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskQueryParams>,
) -> Result<Json<Vec<Task>>, AppError> {
    let filter = FilterConfig {
        status: params.status.unwrap_or_default(),
        priority: params.priority,
        tags: params
            .tags
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        tag_mode: params.tag_mode.unwrap_or_default(),
        search: params.search.unwrap_or_default(),
    };
    let default_sort = SortConfig::default();
    let sort = SortConfig {
        field: params.sort_by.unwrap_or(default_sort.field),
        direction: params.direction.unwrap_or(default_sort.direction),
    };

    let workspace = state.workspace.read().await;
    let filtered = apply_filter(&workspace.tasks, &filter);
    Ok(Json(apply_sort(&filtered, &sort)))
}

async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<NewTaskRequest>,
) -> Result<Json<Task>, AppError> {
    let errors = req.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    let task = req.into_task();
    {
        let mut workspace = state.workspace.write().await;
        workspace.tasks.push(task.clone());
    }
    sync_after_mutation(&state).await;
    Ok(Json(task))
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, AppError> {
    let errors = req.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    let updated = {
        let mut workspace = state.workspace.write().await;
        let task = workspace
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(AppError::NotFound)?;
        req.apply(task);
        task.clone()
    };
    sync_after_mutation(&state).await;
    Ok(Json(updated))
}

async fn toggle_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, AppError> {
    let toggled = {
        let mut workspace = state.workspace.write().await;
        let task = workspace
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(AppError::NotFound)?;
        task.set_completed(!task.completed);
        task.clone()
    };
    sync_after_mutation(&state).await;
    Ok(Json(toggled))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    {
        let mut workspace = state.workspace.write().await;
        let before = workspace.tasks.len();
        workspace.tasks.retain(|t| t.id != id);
        if workspace.tasks.len() == before {
            return Err(AppError::NotFound);
        }
    }
    sync_after_mutation(&state).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn archive(State(state): State<AppState>) -> Result<Json<Vec<ArchiveGroup>>, AppError> {
    let workspace = state.workspace.read().await;
    let completed: Vec<Task> = workspace
        .tasks
        .iter()
        .filter(|t| t.completed)
        .cloned()
        .collect();
    let groups = group_by_date(&completed, GroupField::Completed);

    let today = Local::now().date_naive();
    // Newest group first.
    let response = groups
        .into_iter()
        .rev()
        .map(|(date, tasks)| ArchiveGroup {
            label: day_label(&date, today),
            date,
            tasks,
        })
        .collect();
    Ok(Json(response))
}

async fn get_archive_stats(
    State(state): State<AppState>,
) -> Result<Json<crate::query::ArchiveStats>, AppError> {
    let workspace = state.workspace.read().await;
    Ok(Json(archive_stats(&workspace.tasks, Local::now())))
}

async fn autosave_status(State(state): State<AppState>) -> Json<AutoSaveStatus> {
    Json(state.autosave.status())
}

async fn save_now(State(state): State<AppState>) -> Result<Json<SaveResponse>, AppError> {
    let outcome = state.autosave.save_now().await?;
    Ok(Json(SaveResponse {
        saved: outcome == SaveOutcome::Saved,
    }))
}

// Persistence failures after a mutation are non-fatal: the edit stays in
// memory and the next trigger retries.
async fn sync_after_mutation(state: &AppState) {
    if let Err(e) = state.autosave.sync_if_changed().await {
        warn!("auto-save after mutation failed: {e}");
    }
}
