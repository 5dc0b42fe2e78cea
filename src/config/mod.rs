mod file_config;

pub use file_config::{FileConfig, UserConfig};

use crate::catalog::{CatalogCredentials, CatalogDefaults};
use crate::server::{ApiUser, RequestsLoggingLevel, ServerConfig};
use anyhow::{anyhow, bail, Context, Result};
use clap::ValueEnum;
use uuid::Uuid;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub request_timeout_sec: u64,
    pub max_upload_mb: usize,
    pub blob_store_url: Option<String>,
    pub catalog_url: Option<String>,
    pub catalog_username: Option<String>,
    pub catalog_password: Option<String>,
    pub default_format_id: Option<String>,
    pub default_stack_id: Option<String>,
    /// `name:password` pairs.
    pub users: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub request_timeout_sec: u64,
    pub max_upload_bytes: usize,

    // Downstream services
    pub blob_store_url: String,
    pub catalog_url: String,
    pub catalog_credentials: CatalogCredentials,

    pub catalog_defaults: CatalogDefaults,
    pub users: Vec<ApiUser>,
}

/// Value of `blob_store_url` that selects the in-process blob store.
pub const MEMORY_BLOB_STORE: &str = "memory";

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let request_timeout_sec = file
            .request_timeout_sec
            .unwrap_or(cli.request_timeout_sec);
        if request_timeout_sec == 0 {
            bail!("request_timeout_sec must be greater than zero");
        }

        let max_upload_mb = file.max_upload_mb.unwrap_or(cli.max_upload_mb);
        let max_upload_bytes = max_upload_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow!("max_upload_mb is too large: {}", max_upload_mb))?;

        let blob_store_url = required(file.blob_store_url, &cli.blob_store_url, "blob_store_url")?;
        let catalog_url = required(file.catalog_url, &cli.catalog_url, "catalog_url")?;
        let catalog_credentials = CatalogCredentials {
            username: required(
                file.catalog_username,
                &cli.catalog_username,
                "catalog_username",
            )?,
            password: required(
                file.catalog_password,
                &cli.catalog_password,
                "catalog_password",
            )?,
        };

        let defaults = CatalogDefaults::default();
        let catalog_defaults = CatalogDefaults {
            format_id: parse_default_id(
                file.default_format_id.or_else(|| cli.default_format_id.clone()),
                defaults.format_id,
                "default_format_id",
            )?,
            stack_id: parse_default_id(
                file.default_stack_id.or_else(|| cli.default_stack_id.clone()),
                defaults.stack_id,
                "default_stack_id",
            )?,
        };

        let users = match file.users {
            Some(users) => users
                .into_iter()
                .map(|u| ApiUser {
                    username: u.username,
                    password: u.password,
                })
                .collect(),
            None => cli
                .users
                .iter()
                .map(|s| parse_user(s))
                .collect::<Result<Vec<_>>>()?,
        };
        if users.is_empty() {
            bail!("At least one user must be configured via --user or [[users]] in config file");
        }
        if users.iter().any(|u| u.username.is_empty()) {
            bail!("User names must not be empty");
        }

        Ok(Self {
            port,
            metrics_port,
            logging_level,
            request_timeout_sec,
            max_upload_bytes,
            blob_store_url,
            catalog_url,
            catalog_credentials,
            catalog_defaults,
            users,
        })
    }

    pub fn uses_memory_blob_store(&self) -> bool {
        self.blob_store_url == MEMORY_BLOB_STORE
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            max_upload_bytes: self.max_upload_bytes,
            users: self.users.clone(),
        }
    }
}

fn required(file: Option<String>, cli: &Option<String>, name: &str) -> Result<String> {
    file.or_else(|| cli.clone())
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            anyhow!(
                "{} must be specified via --{} or in config file",
                name,
                name.replace('_', "-")
            )
        })
}

fn parse_default_id(raw: Option<String>, fallback: Uuid, name: &str) -> Result<Uuid> {
    match raw {
        Some(raw) => Uuid::parse_str(raw.trim())
            .with_context(|| format!("{} is not a valid UUID: {:?}", name, raw)),
        None => Ok(fallback),
    }
}

/// Parses a `name:password` CLI user. The password may itself contain `:`.
fn parse_user(s: &str) -> Result<ApiUser> {
    let (username, password) = s
        .split_once(':')
        .ok_or_else(|| anyhow!("User must be given as name:password, got {:?}", s))?;
    Ok(ApiUser {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
