use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::Task;
use crate::store::{TaskStore, validate_file_name};

/// In-memory store used by tests and the scheduler tests in particular.
/// `set_fail_saves` makes every save fail so error handling can be exercised
/// without a real I/O fault.
#[derive(Default)]
pub struct MemoryTaskStore {
    files: Mutex<HashMap<String, Vec<Task>>>,
    fail_saves: AtomicBool,
    save_count: AtomicUsize,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn fetch_tasks(&self, file_id: &str) -> Result<Vec<Task>, AppError> {
        validate_file_name(file_id)?;
        let files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        files.get(file_id).cloned().ok_or(AppError::NotFound)
    }

    async fn save_tasks(&self, file_id: &str, tasks: &[Task]) -> Result<(), AppError> {
        validate_file_name(file_id)?;
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(AppError::BadRequest("save failure injected".to_string()));
        }
        let mut files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        files.insert(file_id.to_string(), tasks.to_vec());
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_files(&self) -> Result<Vec<String>, AppError> {
        let files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = files.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn create_file(&self, name: &str) -> Result<(), AppError> {
        validate_file_name(name)?;
        let mut files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        if files.contains_key(name) {
            return Err(AppError::Conflict(format!("File already exists: {name}")));
        }
        files.insert(name.to_string(), Vec::new());
        Ok(())
    }

    async fn delete_file(&self, name: &str) -> Result<(), AppError> {
        validate_file_name(name)?;
        let mut files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        files.remove(name).map(|_| ()).ok_or(AppError::NotFound)
    }
}
