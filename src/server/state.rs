use axum::extract::FromRef;

use crate::relay::RelayService;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedRelayService = Arc<RelayService>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub relay: GuardedRelayService,
}

impl FromRef<ServerState> for GuardedRelayService {
    fn from_ref(input: &ServerState) -> Self {
        input.relay.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
