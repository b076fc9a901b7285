//! Application state shared across handlers.

use crate::auth::Authenticator;
use crate::broker::Broker;
use osbridge_core::config::AppConfig;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Protocol bridge over the configured executor.
    pub broker: Arc<Broker>,
    /// Inbound authentication policy.
    pub auth: Arc<Authenticator>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(config: AppConfig, broker: Broker, auth: Authenticator) -> Self {
        Self {
            config: Arc::new(config),
            broker: Arc::new(broker),
            auth: Arc::new(auth),
        }
    }
}
