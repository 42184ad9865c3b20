//! # x07-core
//!
//! Core types and utilities shared across all x07 client crates.
//!
//! This crate provides:
//! - `ApiError`, the single error currency crossing every fallible boundary
//! - Wire types for index entries, manifests and registry API responses
//! - Typed extractors over untyped JSON values
//! - Package name validation and sparse-index path sharding
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `error`: Error kinds, decode failures and result aliases
//! - `types`: Wire data types (IndexEntry, PackageManifest, etc.)
//! - `utils`: Pure helpers (names, index paths, JSON extraction)

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{ApiError, DecodeError, DecodeResult, ErrorKind, X07Result};
pub use types::{
    Catalog, CatalogPackage, IndexConfig, IndexEntry, PackageManifest, PackageMetadataResponse,
};
pub use utils::{index_relative_path, validate_package_name};
