//! Shared application state.

use std::sync::Arc;

use authrecon_core::{GatewayConfig, Result, ServiceProfile};
use authrecon_resolve::ReconciliationEngine;
use authrecon_runtime::Dispatcher;
use authrecon_sources::HttpSourceClient;
use tracing::info;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: GatewayConfig,
    pub profile: Arc<ServiceProfile>,
    pub dispatcher: Dispatcher<HttpSourceClient>,
}

impl AppState {
    /// Load the configured profile and wire the HTTP client, engine and
    /// dispatcher around it.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let profile = config.load_profile()?;
        Self::with_profile(config, profile)
    }

    pub fn with_profile(config: GatewayConfig, profile: ServiceProfile) -> Result<Self> {
        profile.validate()?;
        let profile = Arc::new(profile);
        let client = HttpSourceClient::from_config(&config)?;
        let engine = ReconciliationEngine::new(profile.clone(), client);
        let dispatcher = Dispatcher::new(engine, config.max_concurrency);

        info!(
            "Dispatcher ready: max_concurrency={}, cache_entries={}",
            dispatcher.max_concurrency(),
            config.cache_entries
        );

        Ok(Self {
            config,
            profile,
            dispatcher,
        })
    }
}
