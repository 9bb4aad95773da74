use std::env;
use std::net::SocketAddr;

use serde::Serialize;

use crate::error::AppError;

pub const DEFAULT_AUTO_SAVE_INTERVAL_MS: u64 = 30_000;
pub const DEFAULT_DATA_STORAGE_PATH: &str = "./data";

/// Runtime configuration, loaded from the environment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub auto_save_interval_ms: u64,
    pub data_storage_path: String,
    #[serde(skip)]
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let auto_save_interval_ms = match env::var("AUTO_SAVE_INTERVAL_MS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::BadRequest(format!("AUTO_SAVE_INTERVAL_MS is not a number: {raw}"))
            })?,
            Err(_) => DEFAULT_AUTO_SAVE_INTERVAL_MS,
        };

        let data_storage_path = env::var("DATA_STORAGE_PATH")
            .unwrap_or_else(|_| DEFAULT_DATA_STORAGE_PATH.to_string());

        let bind_addr = match env::var("BIND_ADDR") {
            Ok(raw) => raw
                .parse::<SocketAddr>()
                .map_err(|_| AppError::BadRequest(format!("BIND_ADDR is not an address: {raw}")))?,
            Err(_) => SocketAddr::from(([127, 0, 0, 1], 3000)),
        };

        Ok(Self {
            auto_save_interval_ms,
            data_storage_path,
            bind_addr,
        })
    }
}
