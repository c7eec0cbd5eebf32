//! Source client trait and the reqwest-backed implementation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use authrecon_core::{GatewayConfig, RawRecord, SourceDescriptor};
use reqwest::Client;
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::error::FetchError;
use crate::parse::parse_body;

/// Executes one lookup against one upstream source.
pub trait SourceClient: Send + Sync {
    /// Fetch and parse, surfacing upstream failures.
    fn try_fetch(
        &self,
        source: &SourceDescriptor,
        query: &str,
    ) -> impl Future<Output = Result<Vec<RawRecord>, FetchError>> + Send;

    /// Fetch and parse; any failure is logged and yields no records.
    fn fetch(
        &self,
        source: &SourceDescriptor,
        query: &str,
    ) -> impl Future<Output = Vec<RawRecord>> + Send {
        async move {
            match self.try_fetch(source, query).await {
                Ok(records) => records,
                Err(e) => {
                    warn!("Source {} failed for {:?}: {}", source.id, query, e);
                    Vec::new()
                }
            }
        }
    }
}

/// Substitute authority, subauthority and the URL-escaped query into the
/// source's endpoint template.
pub fn build_url(source: &SourceDescriptor, query: &str) -> String {
    let escaped: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    source
        .endpoint_template
        .replace("{authority}", &source.authority_id)
        .replace("{subauthority}", &source.subauthority_id)
        .replace("{query}", &escaped)
}

/// HTTP source client with per-request timeout and optional response cache.
#[derive(Clone)]
pub struct HttpSourceClient {
    client: Client,
    timeout: Duration,
    cache: Option<Arc<ResponseCache>>,
}

impl HttpSourceClient {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Request)?;
        Ok(Self {
            client,
            timeout,
            cache: None,
        })
    }

    /// Build a client from gateway configuration, with caching if enabled.
    pub fn from_config(config: &GatewayConfig) -> authrecon_core::Result<Self> {
        let client = Self::new(config.fetch_timeout)
            .map_err(|e| authrecon_core::Error::Http(e.to_string()))?;
        if config.cache_entries == 0 {
            return Ok(client);
        }
        Ok(client.with_cache(Arc::new(ResponseCache::new(
            config.cache_entries,
            config.cache_ttl,
        ))))
    }

    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&Arc<ResponseCache>> {
        self.cache.as_ref()
    }

    async fn get_body(&self, url: &str) -> Result<String, FetchError> {
        if let Some(body) = self.cache.as_ref().and_then(|c| c.get(url)) {
            debug!("Cache hit for {}", url);
            return Ok(body);
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        if let Some(cache) = &self.cache {
            cache.put(url.to_string(), body.clone());
        }
        Ok(body)
    }

    fn classify(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Request(e)
        }
    }
}

impl SourceClient for HttpSourceClient {
    async fn try_fetch(
        &self,
        source: &SourceDescriptor,
        query: &str,
    ) -> Result<Vec<RawRecord>, FetchError> {
        let url = build_url(source, query);
        debug!("Fetching {} from {}", source.id, url);

        let body = self.get_body(&url).await?;
        let records = parse_body(source.format, &body)?;
        debug!("Source {} returned {} records", source.id, records.len());
        Ok(records)
    }
}
