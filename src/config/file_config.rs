use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub request_timeout_sec: Option<u64>,
    pub max_upload_mb: Option<usize>,

    // Downstream services
    pub blob_store_url: Option<String>,
    pub catalog_url: Option<String>,
    pub catalog_username: Option<String>,
    pub catalog_password: Option<String>,

    // Well-known catalog rows
    pub default_format_id: Option<String>,
    pub default_stack_id: Option<String>,

    /// Clients allowed to upload. Replaces any `--user` given on the CLI.
    pub users: Option<Vec<UserConfig>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    pub username: String,
    pub password: String,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
