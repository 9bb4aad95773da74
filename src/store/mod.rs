pub mod file;
pub mod memory;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::Task;

pub use file::FileTaskStore;
pub use memory::MemoryTaskStore;

/// Persistence boundary for task documents. A "file" is a named, whole
/// document holding one task collection; saves are full overwrites, so
/// overlapping writers degrade to last-write-wins rather than corruption.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn fetch_tasks(&self, file_id: &str) -> Result<Vec<Task>, AppError>;
    async fn save_tasks(&self, file_id: &str, tasks: &[Task]) -> Result<(), AppError>;
    async fn list_files(&self) -> Result<Vec<String>, AppError>;
    async fn create_file(&self, name: &str) -> Result<(), AppError>;
    async fn delete_file(&self, name: &str) -> Result<(), AppError>;
}

/// File names come from user input; reject anything that could escape the
/// data directory or collide with temp files.
pub(crate) fn validate_file_name(name: &str) -> Result<(), AppError> {
    if name.is_empty() {
        return Err(AppError::BadRequest("File name must not be empty".to_string()));
    }
    if name.starts_with('.') || name.contains(['/', '\\']) || name.contains("..") {
        return Err(AppError::BadRequest(format!("Invalid file name: {name}")));
    }
    Ok(())
}
