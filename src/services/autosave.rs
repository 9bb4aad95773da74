//! Auto-save scheduler.
//!
//! Reconciles the in-memory working set with its persisted file. Two paths
//! can request a save: the change-triggered path after a mutation, and a
//! recurring timer. Persistence is a full-document overwrite, so overlapping
//! requests degrade to last-write-wins instead of corrupting anything.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::models::Task;
use crate::store::TaskStore;

/// The in-memory working set: the currently open file and its tasks.
#[derive(Debug, Default)]
pub struct Workspace {
    pub file_id: Option<String>,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveState {
    Idle,
    Saving,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSaveStatus {
    pub state: SaveState,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// Nothing to persist: no file selected, empty collection, or (for the
    /// change-triggered path) no difference from the last saved snapshot.
    Skipped,
}

struct Snapshot {
    file_id: String,
    payload: String,
}

pub struct AutoSave {
    workspace: Arc<RwLock<Workspace>>,
    store: Arc<dyn TaskStore>,
    status: Mutex<AutoSaveStatus>,
    last_saved: Mutex<Option<Snapshot>>,
}

impl AutoSave {
    pub fn new(workspace: Arc<RwLock<Workspace>>, store: Arc<dyn TaskStore>) -> Self {
        Self {
            workspace,
            store,
            status: Mutex::new(AutoSaveStatus {
                state: SaveState::Idle,
                last_saved_at: None,
                error_message: None,
            }),
            last_saved: Mutex::new(None),
        }
    }

    pub fn status(&self) -> AutoSaveStatus {
        lock(&self.status).clone()
    }

    /// Record the current workspace content as already persisted. Called
    /// after opening a file so unchanged content does not retrigger a save.
    pub async fn mark_loaded(&self) -> Result<(), AppError> {
        let snapshot = self.capture().await?;
        *lock(&self.last_saved) = snapshot.map(|(file_id, _, payload)| Snapshot { file_id, payload });
        let mut status = lock(&self.status);
        status.state = SaveState::Idle;
        status.error_message = None;
        Ok(())
    }

    /// Unconditional save of the current working set (timer tick or explicit
    /// save-now). Skips when no file is selected or the collection is empty.
    pub async fn save_now(&self) -> Result<SaveOutcome, AppError> {
        match self.capture().await? {
            Some((file_id, tasks, payload)) => self.persist(file_id, tasks, payload).await,
            None => Ok(SaveOutcome::Skipped),
        }
    }

    /// Change-triggered save: persist only when the serialized collection or
    /// the target file differs from the last saved snapshot.
    pub async fn sync_if_changed(&self) -> Result<SaveOutcome, AppError> {
        let Some((file_id, tasks, payload)) = self.capture().await? else {
            return Ok(SaveOutcome::Skipped);
        };
        {
            let last_saved = lock(&self.last_saved);
            if let Some(snapshot) = last_saved.as_ref() {
                if snapshot.file_id == file_id && snapshot.payload == payload {
                    return Ok(SaveOutcome::Skipped);
                }
            }
        }
        self.persist(file_id, tasks, payload).await
    }

    /// Start the periodic path. The returned handle owns the timer task and
    /// aborts it on cancel or drop.
    pub fn spawn(self: Arc<Self>, interval: Duration) -> AutoSaveHandle {
        let autosave = self;
        let worker = tokio::spawn(async move {
            info!("starting auto-save scheduler (interval: {:?})", interval);
            loop {
                tokio::time::sleep(interval).await;
                match autosave.save_now().await {
                    Ok(SaveOutcome::Saved) => debug!("periodic auto-save completed"),
                    Ok(SaveOutcome::Skipped) => debug!("periodic auto-save skipped"),
                    // Non-fatal; the next tick retries.
                    Err(e) => warn!("periodic auto-save failed: {e}"),
                }
            }
        });
        AutoSaveHandle { worker }
    }

    // Snapshot the working set without holding the lock across I/O.
    async fn capture(&self) -> Result<Option<(String, Vec<Task>, String)>, AppError> {
        let (file_id, tasks) = {
            let workspace = self.workspace.read().await;
            match &workspace.file_id {
                Some(file_id) if !workspace.tasks.is_empty() => {
                    (file_id.clone(), workspace.tasks.clone())
                }
                _ => return Ok(None),
            }
        };
        let payload = serde_json::to_string(&tasks)?;
        Ok(Some((file_id, tasks, payload)))
    }

    async fn persist(
        &self,
        file_id: String,
        tasks: Vec<Task>,
        payload: String,
    ) -> Result<SaveOutcome, AppError> {
        lock(&self.status).state = SaveState::Saving;
        match self.store.save_tasks(&file_id, &tasks).await {
            Ok(()) => {
                *lock(&self.last_saved) = Some(Snapshot { file_id, payload });
                let mut status = lock(&self.status);
                status.state = SaveState::Idle;
                status.last_saved_at = Some(Utc::now());
                status.error_message = None;
                Ok(SaveOutcome::Saved)
            }
            Err(e) => {
                let mut status = lock(&self.status);
                status.state = SaveState::Error;
                status.error_message = Some(e.to_string());
                Err(e)
            }
        }
    }
}

pub struct AutoSaveHandle {
    worker: JoinHandle<()>,
}

impl AutoSaveHandle {
    pub fn cancel(&self) {
        self.worker.abort();
    }
}

impl Drop for AutoSaveHandle {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
