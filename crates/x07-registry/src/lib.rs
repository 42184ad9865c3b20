//! Sparse index and registry API client for x07 packages
//!
//! This crate resolves package metadata from a static, sharded sparse index
//! and calls the companion registry API (search, owners, tokens, yank, auth).
//! Index and metadata lookups are coalesced per key and cached for the
//! lifetime of the [`Registry`]; every server response is decoded strictly.

pub mod api;
pub mod bootstrap;
pub mod cache;
pub mod client;
pub mod index;
pub mod metadata;
pub mod registry;

// Re-export main types
pub use bootstrap::{ConfigLoader, ConfigSource};
pub use cache::SingleFlight;
pub use client::{HttpTransport, RequestOptions};
pub use index::{parse_index_file, IndexEntryFetcher};
pub use metadata::MetadataFetcher;
pub use registry::{Registry, DEFAULT_SEARCH_LIMIT};

use x07_core::error::ApiError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, ApiError>;
