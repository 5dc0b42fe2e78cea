//! Track ingestion.
//!
//! One upload of a track:
//! 1. Embedded tags are read from the bytes
//! 2. If the file is audio, its catalog hierarchy is created (idempotent)
//! 3. The bytes are written to the blob store, whatever step 2 returned
//!
//! The two store outcomes are reported separately so a caller always knows
//! what to retry.

mod orchestrator;
mod report;

pub use orchestrator::Orchestrator;
pub use report::{BlobOutcome, CatalogOutcome, IngestionError, IngestionReport};
