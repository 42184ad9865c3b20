//! Sparse index document types.

use serde::Serialize;

/// Required `schema_version` of every index entry line
pub const INDEX_ENTRY_SCHEMA: &str = "x07.index-entry@0.1.0";

/// Required `schema_version` of the catalog document
pub const CATALOG_SCHEMA: &str = "x07.index-catalog@0.1.0";

/// `config.json` at the root of the sparse index.
///
/// Only the sparse protocol is supported, so a decoded config always had
/// `sparse: true` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexConfig {
    /// Download base URL
    pub dl: String,
    /// Registry API root
    pub api: String,
    #[serde(rename = "auth-required")]
    pub auth_required: bool,
    #[serde(rename = "verified-namespaces", skip_serializing_if = "Option::is_none")]
    pub verified_namespaces: Option<Vec<String>>,
}

/// One line of a package's index file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub schema_version: String,
    pub name: String,
    pub version: String,
    /// Content checksum, passed through unverified
    pub cksum: String,
    pub yanked: bool,
}

impl IndexEntry {
    /// Build an entry carrying the current schema tag
    pub fn new(name: impl Into<String>, version: impl Into<String>, cksum: impl Into<String>, yanked: bool) -> Self {
        Self {
            schema_version: INDEX_ENTRY_SCHEMA.to_string(),
            name: name.into(),
            version: version.into(),
            cksum: cksum.into(),
            yanked,
        }
    }
}

/// Denormalized package listing; not authoritative for resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub schema_version: String,
    pub packages: Vec<CatalogPackage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogPackage {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
}
