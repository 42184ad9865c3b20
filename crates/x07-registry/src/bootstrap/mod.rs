//! Process-scoped configuration loading
//!
//! The bootstrap document and the index `config.json` are each fetched at
//! most once at a time and kept for the lifetime of the loader once they
//! validate. A failed load is not kept: the next call starts over.

use std::time::Duration;

use reqwest::header::CACHE_CONTROL;
use serde_json::Value;
use tracing::{info, warn};
use url::Url;
use x07_config::{RuntimeConfig, Settings, RUNTIME_CONFIG_PATH};
use x07_core::error::{ApiError, ErrorKind};
use x07_core::types::IndexConfig;

use crate::api::decode_index_config;
use crate::cache::SingleFlight;
use crate::client::{HttpTransport, RequestOptions};
use crate::RegistryResult;

const RUNTIME_KEY: &str = "runtime";
const INDEX_CONFIG_KEY: &str = "index";

/// Time bound for the bootstrap document
pub const BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the runtime config comes from
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Fetch the bootstrap document from this registry web origin
    Origin(Url),
    /// Fixed config, no bootstrap document
    Static(RuntimeConfig),
}

/// Single-flight loader for the runtime config and the index config
#[derive(Debug)]
pub struct ConfigLoader {
    transport: HttpTransport,
    source: ConfigSource,
    bootstrap_timeout: Duration,
    runtime: SingleFlight<RuntimeConfig>,
    index_config: SingleFlight<IndexConfig>,
}

impl ConfigLoader {
    pub fn new(transport: HttpTransport, source: ConfigSource, bootstrap_timeout: Duration) -> Self {
        Self {
            transport,
            source,
            bootstrap_timeout,
            runtime: SingleFlight::new("runtime-config"),
            index_config: SingleFlight::new("index-config"),
        }
    }

    /// Origin-based loader when an origin is configured, static otherwise
    pub fn from_settings(transport: HttpTransport, settings: &Settings) -> RegistryResult<Self> {
        let source = match settings.origin_url()? {
            Some(origin) => ConfigSource::Origin(origin),
            None => ConfigSource::Static(settings.static_runtime_config()?),
        };
        Ok(Self::new(transport, source, settings.bootstrap_timeout()))
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Validated runtime config, fetched on first use
    pub async fn runtime_config(&self) -> RegistryResult<RuntimeConfig> {
        let origin = match &self.source {
            ConfigSource::Static(config) => return Ok(config.clone()),
            ConfigSource::Origin(origin) => origin,
        };

        let url = origin
            .join(RUNTIME_CONFIG_PATH)
            .map_err(|e| ApiError::misconfig(format!("invalid origin {}: {}", origin, e)))?;
        let transport = self.transport.clone();
        let timeout = self.bootstrap_timeout;

        self.runtime
            .get_or_fetch(RUNTIME_KEY, move || fetch_runtime_config(transport, url, timeout))
            .await
    }

    /// Index `config.json`, fetched on first use
    pub async fn index_config(&self) -> RegistryResult<IndexConfig> {
        let runtime = self.runtime_config().await?;
        let url = runtime.index_url("config.json")?;
        let transport = self.transport.clone();

        self.index_config
            .get_or_fetch(INDEX_CONFIG_KEY, move || async move {
                transport
                    .fetch_json(&url, decode_index_config, RequestOptions::get())
                    .await
            })
            .await
    }

    /// Drop both cached configs
    pub fn reset(&self) {
        self.runtime.clear();
        self.index_config.clear();
    }
}

/// Fetch and validate the bootstrap document; every failure is `MISCONFIG`
async fn fetch_runtime_config(
    transport: HttpTransport,
    url: Url,
    timeout: Duration,
) -> RegistryResult<RuntimeConfig> {
    let misconfig = |message: String| ApiError::misconfig(message).with_url(url.as_str());

    let options = RequestOptions::get()
        .with_timeout(timeout)
        .with_header(CACHE_CONTROL, "no-store")?;
    let text = transport.fetch_text(&url, options).await.map_err(|e| {
        let message = match e.kind {
            ErrorKind::Timeout => "runtime config request timed out".to_string(),
            ErrorKind::Http { status } => {
                format!("failed to load runtime config: HTTP {}", status)
            },
            _ => e.message,
        };
        misconfig(message)
    })?;

    let raw: Value = serde_json::from_str(&text)
        .map_err(|e| misconfig(format!("runtime config was not valid JSON: {}", e)))?;

    match RuntimeConfig::from_document(&raw) {
        Ok(config) => {
            info!("loaded runtime config, index at {}", config.index_base);
            Ok(config)
        },
        Err(e) => {
            warn!("rejected runtime config from {}: {}", url, e);
            Err(misconfig(e.to_string()))
        },
    }
}
