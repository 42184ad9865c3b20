//! Wire data types for the sparse index and the registry API.
//!
//! This module provides the strongly-shaped values produced by the schema
//! decoders:
//! - Index documents (config, entries, catalog)
//! - Package manifests
//! - Registry API response envelopes

pub mod account;
pub mod index;
pub mod package;

// Re-export all public types
pub use account::{
    AccountResponse, AuthSessionResponse, AuthSessionUser, OwnersResponse, SearchHit,
    SearchResponse, SimpleOkResponse, TokenCreateResponse, TokenInfo, TokenListResponse,
    YankResponse,
};
pub use index::{
    Catalog, CatalogPackage, IndexConfig, IndexEntry, CATALOG_SCHEMA, INDEX_ENTRY_SCHEMA,
};
pub use package::{PackageManifest, PackageMetadataResponse};
