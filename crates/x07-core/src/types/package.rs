//! Package manifest types.

use serde::Serialize;

/// Manifest of one published package version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageManifest {
    pub schema_version: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
    pub module_root: String,
    /// Module paths in manifest order
    pub modules: Vec<String>,
}

/// `GET packages/{name}/{version}/metadata`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageMetadataResponse {
    pub package: PackageManifest,
    pub cksum: String,
}
