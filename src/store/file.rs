use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::error::AppError;
use crate::models::Task;
use crate::store::{TaskStore, validate_file_name};

/// Task store backed by JSON documents under a data directory, one
/// `<name>.json` per file. Writes go through a temp file plus rename so a
/// crashed save never leaves a half-written document behind.
pub struct FileTaskStore {
    root: PathBuf,
}

impl FileTaskStore {
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn document_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.root.join(format!(".{name}.json.tmp"))
    }

    async fn write_document(&self, name: &str, contents: &str) -> Result<(), AppError> {
        let temp = self.temp_path(name);
        fs::write(&temp, contents).await?;
        fs::rename(&temp, self.document_path(name)).await?;
        Ok(())
    }
}

fn map_not_found(e: std::io::Error) -> AppError {
    if e.kind() == ErrorKind::NotFound {
        AppError::NotFound
    } else {
        AppError::Storage(e)
    }
}

fn file_stem(path: &Path) -> Option<String> {
    if path.extension()? != "json" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.starts_with('.') {
        return None;
    }
    Some(stem.to_string())
}

#[async_trait]
impl TaskStore for FileTaskStore {
    async fn fetch_tasks(&self, file_id: &str) -> Result<Vec<Task>, AppError> {
        validate_file_name(file_id)?;
        let raw = fs::read_to_string(self.document_path(file_id))
            .await
            .map_err(map_not_found)?;
        let mut tasks: Vec<Task> = serde_json::from_str(&raw)?;
        // Legacy normalization boundary: fold single-category documents
        // into tags before anything downstream sees them.
        for task in &mut tasks {
            task.fold_legacy_category();
        }
        Ok(tasks)
    }

    async fn save_tasks(&self, file_id: &str, tasks: &[Task]) -> Result<(), AppError> {
        validate_file_name(file_id)?;
        let contents = serde_json::to_string_pretty(tasks)?;
        self.write_document(file_id, &contents).await?;
        debug!("saved {} tasks to {}", tasks.len(), file_id);
        Ok(())
    }

    async fn list_files(&self) -> Result<Vec<String>, AppError> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if let Some(stem) = file_stem(&entry.path()) {
                names.push(stem);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn create_file(&self, name: &str) -> Result<(), AppError> {
        validate_file_name(name)?;
        if fs::try_exists(self.document_path(name)).await? {
            return Err(AppError::Conflict(format!("File already exists: {name}")));
        }
        self.write_document(name, "[]").await
    }

    async fn delete_file(&self, name: &str) -> Result<(), AppError> {
        validate_file_name(name)?;
        fs::remove_file(self.document_path(name))
            .await
            .map_err(map_not_found)
    }
}
