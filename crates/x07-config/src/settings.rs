//! Client settings layering, fallback logic, and environment overrides
//!
//! Settings come from `~/.x07/config.toml`, then `X07_*` environment
//! variables, then command-line flags, each layer overriding the previous.

use std::collections::HashMap;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use url::Url;
use x07_core::error::ApiError;

use crate::runtime::RuntimeConfig;
use crate::ConfigResult;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_BOOTSTRAP_TIMEOUT_MS: u64 = 5_000;

/// How mutating API calls authenticate.
///
/// Deployments use exactly one strategy; calls never mix them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthStrategy {
    /// Anonymous; only read-only calls are possible
    #[default]
    None,
    /// `Authorization: Bearer <token>`
    Bearer { token: String },
    /// Same-origin session cookie plus anti-forgery header
    Session { cookie: String, csrf_token: String },
}

impl AuthStrategy {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, AuthStrategy::None)
    }
}

/// Complete client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Registry web origin serving the bootstrap document
    pub origin: Option<String>,

    /// Explicit sparse index root, used when no origin is set
    pub index_base: Option<String>,

    pub catalog_path: Option<String>,

    pub auth: AuthStrategy,

    /// Time bound for general requests
    pub timeout_ms: u64,

    /// Time bound for the bootstrap document
    pub bootstrap_timeout_ms: u64,

    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            origin: None,
            index_base: None,
            catalog_path: None,
            auth: AuthStrategy::None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            bootstrap_timeout_ms: DEFAULT_BOOTSTRAP_TIMEOUT_MS,
            user_agent: format!("x07reg/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn bootstrap_timeout(&self) -> Duration {
        Duration::from_millis(self.bootstrap_timeout_ms)
    }

    /// Parsed origin, if one is configured
    pub fn origin_url(&self) -> ConfigResult<Option<Url>> {
        self.origin
            .as_deref()
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                Url::parse(origin)
                    .map_err(|e| ApiError::misconfig(format!("origin must be a valid URL: {}", e)))
            })
            .transpose()
    }

    /// Runtime config for deployments without a bootstrap document
    pub fn static_runtime_config(&self) -> ConfigResult<RuntimeConfig> {
        RuntimeConfig::from_static(
            self.index_base.as_deref().unwrap_or_default(),
            self.catalog_path.as_deref().unwrap_or_default(),
        )
    }
}

/// Parse settings from TOML text
pub fn parse_settings(content: &str) -> ConfigResult<Settings> {
    toml::from_str(content)
        .map_err(|e| ApiError::misconfig(format!("failed to parse settings: {}", e)))
}

/// Settings file discovery and loading
pub struct SettingsLoader {
    path: Utf8PathBuf,
}

impl SettingsLoader {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }

    /// Loader for `~/.x07/config.toml`
    pub fn global() -> ConfigResult<Self> {
        Ok(Self::new(x07_home()?.join("config.toml")))
    }

    pub fn path(&self) -> &Utf8PathBuf {
        &self.path
    }

    /// Load the settings file, if present
    pub async fn load(&self) -> ConfigResult<Option<Settings>> {
        if !self.path.exists() {
            tracing::debug!("no settings file at {}", self.path);
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ApiError::misconfig(format!("failed to read {}: {}", self.path, e))
        })?;
        parse_settings(&content).map(Some)
    }
}

/// `~/.x07`, home of the settings file and stored credential
pub fn x07_home() -> ConfigResult<Utf8PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| ApiError::misconfig("could not determine home directory"))?;

    Utf8PathBuf::try_from(home_dir)
        .map(|home| home.join(".x07"))
        .map_err(|e| ApiError::misconfig(format!("invalid home directory path: {}", e)))
}

/// Settings layering and merging
pub struct SettingsLayering;

impl SettingsLayering {
    /// Merge file settings with environment and CLI overrides
    pub fn merge(
        file_settings: Option<Settings>,
        env_overrides: &HashMap<String, String>,
        cli_overrides: &HashMap<String, String>,
    ) -> ConfigResult<Settings> {
        let mut merged = file_settings.unwrap_or_default();

        Self::apply_env_overrides(&mut merged, env_overrides)?;
        Self::apply_cli_overrides(&mut merged, cli_overrides)?;

        Ok(merged)
    }

    fn apply_env_overrides(
        settings: &mut Settings,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "X07_ORIGIN" => settings.origin = Some(value.clone()),
                "X07_INDEX_BASE" => settings.index_base = Some(value.clone()),
                "X07_CATALOG_PATH" => settings.catalog_path = Some(value.clone()),
                "X07_TOKEN" => apply_token(settings, value),
                "X07_TIMEOUT_MS" => {
                    settings.timeout_ms = value.trim().parse().map_err(|e| {
                        ApiError::misconfig(format!("invalid X07_TIMEOUT_MS: {}", e))
                    })?;
                },
                _ => {},
            }
        }

        Ok(())
    }

    fn apply_cli_overrides(
        settings: &mut Settings,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "origin" => settings.origin = Some(value.clone()),
                "index_base" => settings.index_base = Some(value.clone()),
                "token" => apply_token(settings, value),
                _ => {},
            }
        }

        Ok(())
    }

    /// Collect `X07_*` environment variables
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with("X07_"))
            .collect()
    }
}

fn apply_token(settings: &mut Settings, value: &str) {
    let token = value.trim();
    if !token.is_empty() {
        settings.auth = AuthStrategy::Bearer {
            token: token.to_string(),
        };
    }
}
