//! Gateway configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::profile::ServiceProfile;

pub const DEFAULT_PORT: u16 = 5002;
pub const DEFAULT_PROFILE: &str = "loc";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
pub const DEFAULT_CACHE_ENTRIES: usize = 1000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Top-level gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// HTTP server port.
    pub port: u16,
    /// Preset name (`loc`, `qa`, `ucsc`), ignored when `profile_file` is set.
    pub profile_name: String,
    /// JSON profile replacing the preset.
    pub profile_file: Option<PathBuf>,
    /// Upstream base URL override for the preset.
    pub base_url: Option<String>,
    /// Per-fetch timeout.
    pub fetch_timeout: Duration,
    /// Maximum batch keys reconciled at once.
    pub max_concurrency: usize,
    /// Response cache capacity; 0 disables caching.
    pub cache_entries: usize,
    pub cache_ttl: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            profile_name: DEFAULT_PROFILE.into(),
            profile_file: None,
            base_url: None,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            cache_entries: DEFAULT_CACHE_ENTRIES,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

impl GatewayConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_or(&lookup, "PORT", defaults.port)?;
        let timeout_secs = parse_or(
            &lookup,
            "AUTHRECON_FETCH_TIMEOUT_SECS",
            DEFAULT_FETCH_TIMEOUT_SECS,
        )?;
        let max_concurrency: usize =
            parse_or(&lookup, "AUTHRECON_MAX_CONCURRENCY", defaults.max_concurrency)?;
        let cache_entries = parse_or(&lookup, "AUTHRECON_CACHE_ENTRIES", defaults.cache_entries)?;
        let cache_ttl_secs = parse_or(&lookup, "AUTHRECON_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;

        Ok(Self {
            port,
            profile_name: lookup("AUTHRECON_PROFILE").unwrap_or(defaults.profile_name),
            profile_file: lookup("AUTHRECON_PROFILE_FILE").map(PathBuf::from),
            base_url: lookup("AUTHRECON_BASE_URL").filter(|s| !s.is_empty()),
            fetch_timeout: Duration::from_secs(timeout_secs),
            max_concurrency: max_concurrency.max(1),
            cache_entries,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
        })
    }

    /// Build the service profile this configuration selects.
    pub fn load_profile(&self) -> Result<ServiceProfile> {
        let profile = match &self.profile_file {
            Some(path) => {
                info!("Loading service profile from {}", path.display());
                ServiceProfile::load(path)?
            }
            None => ServiceProfile::preset(&self.profile_name, self.base_url.as_deref())?,
        };
        info!(
            "Service profile '{}': {} types",
            profile.name,
            profile.types.len()
        );
        Ok(profile)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has invalid value '{}'", key, raw))),
    }
}
