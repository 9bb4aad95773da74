use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskfile::api::router;
use taskfile::config::AppConfig;
use taskfile::state::AppState;
use taskfile::store::FileTaskStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "taskfile=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let store = Arc::new(FileTaskStore::open(config.data_storage_path.as_str()).await?);

    let state = AppState::new(config.clone(), store);
    let _autosave = state
        .autosave
        .clone()
        .spawn(Duration::from_millis(config.auto_save_interval_ms));

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
