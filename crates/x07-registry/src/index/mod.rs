//! Sparse index entry fetching
//!
//! A package's index file is newline-delimited JSON, one entry per published
//! version. Any bad line fails the whole file; there is no partial result.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use x07_core::error::ApiError;
use x07_core::types::IndexEntry;
use x07_core::utils::index_relative_path;

use crate::api::decode_index_entry;
use crate::bootstrap::ConfigLoader;
use crate::cache::SingleFlight;
use crate::client::{HttpTransport, RequestOptions};
use crate::RegistryResult;

/// Parse an index file, in line order. Blank lines are skipped.
pub fn parse_index_file(text: &str) -> RegistryResult<Vec<IndexEntry>> {
    let mut entries = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let raw: Value = serde_json::from_str(trimmed).map_err(|e| {
            ApiError::bad_index(line_no, format!("invalid ndjson line {}: {}", line_no, e))
        })?;
        let entry = decode_index_entry(&raw).map_err(|e| {
            ApiError::bad_index(line_no, format!("invalid index entry line {}: {}", line_no, e))
        })?;
        entries.push(entry);
    }

    Ok(entries)
}

/// Cached, coalesced access to per-package index files
#[derive(Debug)]
pub struct IndexEntryFetcher {
    transport: HttpTransport,
    config: Arc<ConfigLoader>,
    cache: SingleFlight<Vec<IndexEntry>>,
}

impl IndexEntryFetcher {
    pub fn new(transport: HttpTransport, config: Arc<ConfigLoader>) -> Self {
        Self {
            transport,
            config,
            cache: SingleFlight::new("index-entries"),
        }
    }

    /// All entries of `name`, in file order.
    ///
    /// Invalid names fail before any request is made.
    pub async fn get_entries(&self, name: &str) -> RegistryResult<Vec<IndexEntry>> {
        let path = index_relative_path(name)?;
        if let Some(entries) = self.cache.peek(name) {
            debug!("index entries for {} served from cache", name);
            return Ok(entries);
        }

        let runtime = self.config.runtime_config().await?;
        let url = runtime.index_url(&path)?;
        let transport = self.transport.clone();

        self.cache
            .get_or_fetch(name, move || async move {
                let text = transport.fetch_text(&url, RequestOptions::get()).await?;
                parse_index_file(&text).map_err(|e| e.with_url(url.as_str()))
            })
            .await
    }

    /// Forget the cached entries of one package
    pub fn invalidate(&self, name: &str) -> bool {
        self.cache.invalidate(name)
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}
