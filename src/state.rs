use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::services::{AutoSave, Workspace};
use crate::store::TaskStore;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn TaskStore>,
    pub workspace: Arc<RwLock<Workspace>>,
    pub autosave: Arc<AutoSave>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn TaskStore>) -> Self {
        let workspace = Arc::new(RwLock::new(Workspace::default()));
        let autosave = Arc::new(AutoSave::new(Arc::clone(&workspace), Arc::clone(&store)));
        Self {
            config,
            store,
            workspace,
            autosave,
        }
    }
}
