//! Package metadata fetching
//!
//! Metadata for one published version is immutable, so it is cached per
//! `name@version` with the same coalescing as index entries.

use std::sync::Arc;

use tracing::debug;
use x07_core::types::PackageMetadataResponse;
use x07_core::utils::validate_package_name;

use crate::api::decode_package_metadata_response;
use crate::bootstrap::ConfigLoader;
use crate::cache::SingleFlight;
use crate::client::{endpoint_url, HttpTransport, RequestOptions};
use crate::RegistryResult;

fn cache_key(name: &str, version: &str) -> String {
    format!("{}@{}", name, version)
}

/// Cached, coalesced access to `packages/{name}/{version}/metadata`
#[derive(Debug)]
pub struct MetadataFetcher {
    transport: HttpTransport,
    config: Arc<ConfigLoader>,
    cache: SingleFlight<PackageMetadataResponse>,
}

impl MetadataFetcher {
    pub fn new(transport: HttpTransport, config: Arc<ConfigLoader>) -> Self {
        Self {
            transport,
            config,
            cache: SingleFlight::new("package-metadata"),
        }
    }

    /// Manifest and checksum of `name` at `version`.
    ///
    /// The version is passed through as-is; an unknown one comes back as an
    /// HTTP error from the server.
    pub async fn get_metadata(
        &self,
        name: &str,
        version: &str,
    ) -> RegistryResult<PackageMetadataResponse> {
        validate_package_name(name)?;
        let key = cache_key(name, version);
        if let Some(metadata) = self.cache.peek(&key) {
            debug!("metadata for {} served from cache", key);
            return Ok(metadata);
        }

        let index_config = self.config.index_config().await?;
        let url = endpoint_url(&index_config.api, &["packages", name, version, "metadata"])?;
        let transport = self.transport.clone();

        self.cache
            .get_or_fetch(&key, move || async move {
                transport
                    .fetch_json(&url, decode_package_metadata_response, RequestOptions::get())
                    .await
            })
            .await
    }

    pub fn invalidate(&self, name: &str, version: &str) -> bool {
        self.cache.invalidate(&cache_key(name, version))
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}
