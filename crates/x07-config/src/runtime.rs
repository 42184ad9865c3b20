//! Bootstrap runtime configuration
//!
//! A registry web origin serves one JSON document at a well-known path that
//! tells the client where the sparse index lives. The document is validated
//! strictly: once a document is being loaded nothing is silently defaulted.

use serde::Serialize;
use serde_json::Value;
use url::Url;
use x07_core::error::{ApiError, DecodeError, DecodeResult};
use x07_core::utils::json::{as_object, expect_literal, expect_string};

use crate::ConfigResult;

/// Required `schema` tag of the bootstrap document
pub const RUNTIME_CONFIG_SCHEMA: &str = "x07.registry_web_config@v1";

/// Well-known path of the bootstrap document, relative to the origin
pub const RUNTIME_CONFIG_PATH: &str = "/x07-registry-web-config.json";

/// Index used when no origin and no explicit index base are configured
pub const DEFAULT_INDEX_BASE: &str = "https://index.x07.io/";

pub const DEFAULT_CATALOG_PATH: &str = "catalog.json";

/// Validated process-wide bootstrap configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeConfig {
    /// Schema tag the configuration was validated against
    pub schema: &'static str,
    /// Sparse index root, always ending in `/`
    pub index_base: Url,
    /// Catalog path relative to `index_base`, no leading `/`
    pub catalog_path: String,
    /// Absolute path of the API description on the origin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openapi_url: Option<String>,
}

impl RuntimeConfig {
    /// Validate a parsed bootstrap document
    pub fn from_document(raw: &Value) -> DecodeResult<Self> {
        let obj = as_object(raw, "runtime config")?;
        expect_literal(obj, "schema", RUNTIME_CONFIG_SCHEMA)?;

        let index_base = normalize_index_base(&expect_string(obj, "index_base")?)?;
        let catalog_path = normalize_catalog_path(&expect_string(obj, "catalog_path")?)?;
        let openapi_url = normalize_openapi_url(&expect_string(obj, "openapi_url")?)?;

        Ok(Self {
            schema: RUNTIME_CONFIG_SCHEMA,
            index_base,
            catalog_path,
            openapi_url: Some(openapi_url),
        })
    }

    /// Build a config without a bootstrap document.
    ///
    /// Blank inputs fall back to the public index.
    pub fn from_static(index_base: &str, catalog_path: &str) -> ConfigResult<Self> {
        let index_base = match index_base.trim() {
            "" => DEFAULT_INDEX_BASE,
            trimmed => trimmed,
        };
        let catalog_path = match catalog_path.trim() {
            "" => DEFAULT_CATALOG_PATH,
            trimmed => trimmed,
        };

        let to_misconfig = |e: DecodeError| ApiError::misconfig(e.to_string());
        Ok(Self {
            schema: RUNTIME_CONFIG_SCHEMA,
            index_base: normalize_index_base(index_base).map_err(to_misconfig)?,
            catalog_path: normalize_catalog_path(catalog_path).map_err(to_misconfig)?,
            openapi_url: None,
        })
    }

    /// Resolve a path inside the sparse index
    pub fn index_url(&self, path: &str) -> ConfigResult<Url> {
        self.index_base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::misconfig(format!("invalid index path {}: {}", path, e)))
    }

    /// URL of the catalog document
    pub fn catalog_url(&self) -> ConfigResult<Url> {
        self.index_url(&self.catalog_path)
    }
}

fn normalize_index_base(raw: &str) -> DecodeResult<Url> {
    let mut trimmed = raw.trim().to_string();
    if trimmed.is_empty() {
        return Err(DecodeError::invalid("index_base", "must be non-empty"));
    }
    if !trimmed.ends_with('/') {
        trimmed.push('/');
    }

    match Url::parse(&trimmed) {
        Ok(url) if !url.cannot_be_a_base() => Ok(url),
        _ => Err(DecodeError::invalid(
            "index_base",
            format!("must be a valid URL: {}", trimmed),
        )),
    }
}

fn normalize_catalog_path(raw: &str) -> DecodeResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DecodeError::invalid("catalog_path", "must be non-empty"));
    }
    Ok(trimmed.trim_start_matches('/').to_string())
}

fn normalize_openapi_url(raw: &str) -> DecodeResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DecodeError::invalid("openapi_url", "must be non-empty"));
    }
    if trimmed.starts_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("/{}", trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use x07_core::error::ErrorKind;

    fn document() -> Value {
        json!({
            "schema": RUNTIME_CONFIG_SCHEMA,
            "index_base": " https://index.example.test/sparse ",
            "catalog_path": "//catalog/all.json",
            "openapi_url": "openapi.json"
        })
    }

    #[test]
    fn test_document_is_normalized() {
        let config = RuntimeConfig::from_document(&document()).unwrap();

        assert_eq!(config.schema, RUNTIME_CONFIG_SCHEMA);
        assert_eq!(config.index_base.as_str(), "https://index.example.test/sparse/");
        assert_eq!(config.catalog_path, "catalog/all.json");
        assert_eq!(config.openapi_url.as_deref(), Some("/openapi.json"));
        assert_eq!(
            config.catalog_url().unwrap().as_str(),
            "https://index.example.test/sparse/catalog/all.json"
        );
    }

    #[test]
    fn test_schema_mismatch_rejected() {
        let mut doc = document();
        doc["schema"] = json!("x07.registry_web_config@v2");

        let err = RuntimeConfig::from_document(&doc).unwrap_err();
        assert_eq!(err.to_string(), format!("schema must be {}", RUNTIME_CONFIG_SCHEMA));
    }

    #[test]
    fn test_missing_field_named() {
        let mut doc = document();
        doc.as_object_mut().unwrap().remove("catalog_path");

        let err = RuntimeConfig::from_document(&doc).unwrap_err();
        assert_eq!(err.to_string(), "catalog_path must be a string");
    }

    #[test]
    fn test_empty_and_invalid_values_rejected() {
        for (field, value) in [
            ("index_base", "  "),
            ("index_base", "not a url"),
            ("catalog_path", "   "),
            ("openapi_url", ""),
        ] {
            let mut doc = document();
            doc[field] = json!(value);
            let err = RuntimeConfig::from_document(&doc).unwrap_err();
            assert!(err.to_string().starts_with(field), "{}: {}", field, err);
        }
    }

    #[test]
    fn test_non_object_rejected() {
        let err = RuntimeConfig::from_document(&json!("config")).unwrap_err();
        assert_eq!(err.to_string(), "runtime config must be an object");
    }

    #[test]
    fn test_static_defaults() {
        let config = RuntimeConfig::from_static("", " ").unwrap();
        assert_eq!(config.schema, RUNTIME_CONFIG_SCHEMA);
        assert_eq!(config.index_base.as_str(), DEFAULT_INDEX_BASE);
        assert_eq!(config.catalog_path, DEFAULT_CATALOG_PATH);
        assert_eq!(config.openapi_url, None);

        let err = RuntimeConfig::from_static("::bad::", "catalog.json").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Misconfig);
    }

    #[test]
    fn test_index_url_strips_leading_slash() {
        let config = RuntimeConfig::from_static("https://index.example.test/root", "").unwrap();
        assert_eq!(
            config.index_url("/ab/cd/abcd").unwrap().as_str(),
            "https://index.example.test/root/ab/cd/abcd"
        );
    }
}
