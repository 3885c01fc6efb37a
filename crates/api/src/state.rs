use std::sync::Arc;

use clipforge_vendor::VideoProvider;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: both fields are behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The vendor adapter selected at startup.
    pub provider: Arc<dyn VideoProvider>,
}

impl AppState {
    pub fn new(config: ServerConfig, provider: Arc<dyn VideoProvider>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
        }
    }
}
