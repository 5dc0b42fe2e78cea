use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use smuggler::blob_store::{BlobStore, MemoryBlobStore, MossClient};
use smuggler::catalog::CatalogSession;
use smuggler::config::{AppConfig, CliConfig, FileConfig};
use smuggler::ingestion::Orchestrator;
use smuggler::server::{metrics, run_server, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values in it override the flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3050)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9092)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Base URL of the blob store, or "memory" to keep blobs in process.
    #[clap(long)]
    pub blob_store_url: Option<String>,

    /// Base URL of the catalog service.
    #[clap(long)]
    pub catalog_url: Option<String>,

    #[clap(long)]
    pub catalog_username: Option<String>,

    #[clap(long)]
    pub catalog_password: Option<String>,

    /// Timeout in seconds for every call to the catalog or the blob store.
    #[clap(long, default_value_t = 60)]
    pub request_timeout_sec: u64,

    /// Largest accepted upload, in megabytes.
    #[clap(long, default_value_t = 1024)]
    pub max_upload_mb: usize,

    /// Id of the Format given to every Holding.
    #[clap(long)]
    pub default_format_id: Option<String>,

    /// Id of the Stack given to every HoldingGroup.
    #[clap(long)]
    pub default_stack_id: Option<String>,

    /// A client allowed to upload, as name:password. Repeatable.
    #[clap(long = "user")]
    pub users: Vec<String>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            port: self.port,
            metrics_port: self.metrics_port,
            logging_level: self.logging_level.clone(),
            request_timeout_sec: self.request_timeout_sec,
            max_upload_mb: self.max_upload_mb,
            blob_store_url: self.blob_store_url.clone(),
            catalog_url: self.catalog_url.clone(),
            catalog_username: self.catalog_username.clone(),
            catalog_password: self.catalog_password.clone(),
            default_format_id: self.default_format_id.clone(),
            default_stack_id: self.default_stack_id.clone(),
            users: self.users.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Could not install tracing subscriber")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)
        .context("Invalid configuration")?;

    info!("Initializing metrics...");
    metrics::init_metrics();

    let blob_store: Arc<dyn BlobStore> = if config.uses_memory_blob_store() {
        warn!("Using in-memory blob store, uploads will not survive a restart");
        Arc::new(MemoryBlobStore::new())
    } else {
        info!("Blob store at {}", config.blob_store_url);
        Arc::new(MossClient::new(
            config.blob_store_url.clone(),
            config.request_timeout_sec,
        )?)
    };

    let catalog = CatalogSession::new(
        config.catalog_url.clone(),
        config.catalog_credentials.clone(),
        config.request_timeout_sec,
    )?;
    info!("Catalog at {}", catalog.base_url());
    // Not fatal: every catalog call logs in again while unauthenticated.
    if let Err(err) = catalog.login().await {
        warn!("Initial catalog login failed: {}", err);
    }

    let orchestrator = Orchestrator::new(Arc::new(catalog), blob_store, config.catalog_defaults);

    info!(
        "Accepting uploads from {} user(s), up to {} MB each",
        config.users.len(),
        config.max_upload_bytes / (1024 * 1024)
    );
    run_server(config.server_config(), Arc::new(orchestrator)).await
}
