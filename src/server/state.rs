use axum::extract::FromRef;

use crate::ingestion::Orchestrator;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedOrchestrator = Arc<Orchestrator>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub orchestrator: GuardedOrchestrator,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedOrchestrator {
    fn from_ref(input: &ServerState) -> Self {
        input.orchestrator.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
