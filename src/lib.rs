//! smuggler: ingests uploaded music files into the catalog ("impala") and
//! the blob store ("moss").
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod blob_store;
pub mod catalog;
pub mod config;
pub mod ingestion;
pub mod server;
pub mod tags;

// Re-export commonly used types for convenience
pub use blob_store::{BlobStore, MemoryBlobStore, MossClient};
pub use catalog::{CatalogApi, CatalogSession};
pub use ingestion::Orchestrator;
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
