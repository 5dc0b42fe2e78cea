mod auth;
pub mod config;
mod http_layers;
mod ingestion_routes;
pub mod metrics;
pub mod server;
pub mod state;

pub use config::{ApiUser, ServerConfig};
pub use http_layers::*;
pub use server::{make_app, run_server};
