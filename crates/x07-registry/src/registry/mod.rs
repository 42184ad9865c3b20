//! Registry facade
//!
//! Composes configuration loading, the cached index and metadata fetchers,
//! and version selection, and exposes the registry API calls. API calls are
//! never cached: each one resolves the API root from the cached index config
//! and issues exactly one request.

use std::sync::Arc;

use reqwest::header::{HeaderName, AUTHORIZATION, COOKIE};
use serde_json::json;
use tracing::info;
use url::Url;
use x07_config::{AuthStrategy, RuntimeConfig, Settings};
use x07_core::error::ApiError;
use x07_core::types::{
    AccountResponse, AuthSessionResponse, Catalog, IndexConfig, IndexEntry, OwnersResponse,
    PackageMetadataResponse, SearchResponse, SimpleOkResponse, TokenCreateResponse,
    TokenListResponse, YankResponse,
};
use x07_core::utils::{is_official_package, validate_package_name};
use x07_resolver::{latest_usable_version, Version};

use crate::api::{
    decode_account_response, decode_auth_session_response, decode_catalog,
    decode_owners_response, decode_search_response, decode_simple_ok_response,
    decode_token_create_response, decode_token_list_response, decode_yank_response,
};
use crate::bootstrap::ConfigLoader;
use crate::client::{endpoint_url, HttpTransport, RequestOptions};
use crate::index::IndexEntryFetcher;
use crate::metadata::MetadataFetcher;
use crate::RegistryResult;

/// Page size used when a search does not ask for one
pub const DEFAULT_SEARCH_LIMIT: u64 = 20;

const CSRF_HEADER: &str = "x-csrf-token";

/// Client for one registry deployment
#[derive(Debug)]
pub struct Registry {
    transport: HttpTransport,
    config: Arc<ConfigLoader>,
    entries: IndexEntryFetcher,
    metadata: MetadataFetcher,
    auth: AuthStrategy,
}

impl Registry {
    /// Build a registry client from layered settings
    pub fn new(settings: &Settings) -> RegistryResult<Self> {
        let transport = HttpTransport::with_config(&settings.user_agent, settings.request_timeout())?;
        let config = ConfigLoader::from_settings(transport.clone(), settings)?;
        Ok(Self::with_parts(transport, config, settings.auth.clone()))
    }

    pub fn with_parts(transport: HttpTransport, config: ConfigLoader, auth: AuthStrategy) -> Self {
        let config = Arc::new(config);
        Self {
            entries: IndexEntryFetcher::new(transport.clone(), config.clone()),
            metadata: MetadataFetcher::new(transport.clone(), config.clone()),
            transport,
            config,
            auth,
        }
    }

    pub fn auth(&self) -> &AuthStrategy {
        &self.auth
    }

    pub async fn runtime_config(&self) -> RegistryResult<RuntimeConfig> {
        self.config.runtime_config().await
    }

    pub async fn index_config(&self) -> RegistryResult<IndexConfig> {
        self.config.index_config().await
    }

    /// Package catalog; fetched fresh on every call
    pub async fn catalog(&self) -> RegistryResult<Catalog> {
        let url = self.runtime_config().await?.catalog_url()?;
        self.transport
            .fetch_json(&url, decode_catalog, RequestOptions::get())
            .await
    }

    /// Index entries of `name`, in file order
    pub async fn index_entries(&self, name: &str) -> RegistryResult<Vec<IndexEntry>> {
        self.entries.get_entries(name).await
    }

    /// Highest non-yanked, valid version of `name`, if any
    pub async fn latest_version(&self, name: &str) -> RegistryResult<Option<Version>> {
        let entries = self.index_entries(name).await?;
        Ok(latest_usable_version(&entries))
    }

    pub async fn package_metadata(
        &self,
        name: &str,
        version: &str,
    ) -> RegistryResult<PackageMetadataResponse> {
        self.metadata.get_metadata(name, version).await
    }

    /// Archive URL of one version. No request is made for the archive.
    pub async fn download_url(&self, name: &str, version: &str) -> RegistryResult<Url> {
        validate_package_name(name)?;
        let index_config = self.index_config().await?;
        endpoint_url(&index_config.dl, &[name, version, "download"])
    }

    /// Whether `name` lives under a verified or built-in namespace
    pub async fn is_official(&self, name: &str) -> RegistryResult<bool> {
        let index_config = self.index_config().await?;
        Ok(is_official_package(
            name,
            index_config.verified_namespaces.as_deref(),
        ))
    }

    /// Full-text package search. A blank query lists packages.
    pub async fn search(&self, q: &str, limit: u64, offset: u64) -> RegistryResult<SearchResponse> {
        let mut url = self.api_url(&["search"]).await?;
        {
            let mut query = url.query_pairs_mut();
            let q = q.trim();
            if !q.is_empty() {
                query.append_pair("q", q);
            }
            query
                .append_pair("limit", &limit.to_string())
                .append_pair("offset", &offset.to_string());
        }

        self.transport
            .fetch_json(&url, decode_search_response, RequestOptions::get())
            .await
    }

    pub async fn owners(&self, name: &str) -> RegistryResult<OwnersResponse> {
        validate_package_name(name)?;
        let url = self.api_url(&["packages", name, "owners"]).await?;
        self.transport
            .fetch_json(&url, decode_owners_response, RequestOptions::get())
            .await
    }

    /// Account behind the configured token
    pub async fn account(&self) -> RegistryResult<AccountResponse> {
        let options = self.authenticate(RequestOptions::get(), false)?;
        let url = self.api_url(&["account"]).await?;
        self.transport
            .fetch_json(&url, decode_account_response, options)
            .await
    }

    /// Current session; anonymous callers get `authenticated: false`
    pub async fn auth_session(&self) -> RegistryResult<AuthSessionResponse> {
        let options = if self.auth.is_anonymous() {
            RequestOptions::get()
        } else {
            self.authenticate(RequestOptions::get(), false)?
        };
        let url = self.api_url(&["auth", "session"]).await?;
        self.transport
            .fetch_json(&url, decode_auth_session_response, options)
            .await
    }

    pub async fn logout(&self) -> RegistryResult<SimpleOkResponse> {
        let options = self.authenticate(RequestOptions::post(), true)?;
        let url = self.api_url(&["auth", "logout"]).await?;
        let response = self
            .transport
            .fetch_json(&url, decode_simple_ok_response, options)
            .await?;
        info!("logged out");
        Ok(response)
    }

    pub async fn list_tokens(&self) -> RegistryResult<TokenListResponse> {
        let options = self.authenticate(RequestOptions::get(), false)?;
        let url = self.api_url(&["tokens"]).await?;
        self.transport
            .fetch_json(&url, decode_token_list_response, options)
            .await
    }

    /// Create an API token. The secret is only ever returned here.
    pub async fn create_token(
        &self,
        label: &str,
        scopes: &[String],
    ) -> RegistryResult<TokenCreateResponse> {
        let label = label.trim();
        if label.is_empty() {
            return Err(ApiError::invalid_input("token label must not be blank"));
        }

        let options = self
            .authenticate(RequestOptions::post(), true)?
            .with_json(json!({ "label": label, "scopes": scopes }));
        let url = self.api_url(&["tokens"]).await?;
        let created = self
            .transport
            .fetch_json(&url, decode_token_create_response, options)
            .await?;
        info!("created token {} ({})", created.token_id, label);
        Ok(created)
    }

    pub async fn revoke_token(&self, token_id: &str) -> RegistryResult<SimpleOkResponse> {
        if token_id.trim().is_empty() {
            return Err(ApiError::invalid_input("token id must not be blank"));
        }

        let options = self.authenticate(RequestOptions::post(), true)?;
        let url = self.api_url(&["tokens", token_id.trim(), "revoke"]).await?;
        let response = self
            .transport
            .fetch_json(&url, decode_simple_ok_response, options)
            .await?;
        info!("revoked token {}", token_id.trim());
        Ok(response)
    }

    /// Set or clear the yanked flag of one version.
    ///
    /// The package's cached index entries are dropped on success.
    pub async fn yank(&self, name: &str, version: &str, yanked: bool) -> RegistryResult<YankResponse> {
        validate_package_name(name)?;
        let options = self
            .authenticate(RequestOptions::post(), true)?
            .with_json(json!({ "yanked": yanked }));
        let url = self.api_url(&["packages", name, version, "yank"]).await?;
        let response = self
            .transport
            .fetch_json(&url, decode_yank_response, options)
            .await?;

        self.entries.invalidate(name);
        info!("{}@{} yanked={}", response.name, response.version, response.yanked);
        Ok(response)
    }

    /// Drop every cached config, index file and metadata document
    pub fn clear_caches(&self) {
        self.config.reset();
        self.entries.clear();
        self.metadata.clear();
    }

    async fn api_url(&self, segments: &[&str]) -> RegistryResult<Url> {
        let index_config = self.index_config().await?;
        endpoint_url(&index_config.api, segments)
    }

    /// Attach credentials for the configured strategy.
    ///
    /// Session auth adds the anti-forgery header on `mutating` calls only.
    fn authenticate(&self, options: RequestOptions, mutating: bool) -> RegistryResult<RequestOptions> {
        match &self.auth {
            AuthStrategy::None => Err(ApiError::invalid_input(
                "this call requires authentication; log in first",
            )),
            AuthStrategy::Bearer { token } => {
                options.with_header(AUTHORIZATION, &format!("Bearer {}", token))
            },
            AuthStrategy::Session { cookie, csrf_token } => {
                let options = options.with_header(COOKIE, cookie)?;
                if mutating {
                    options.with_header(HeaderName::from_static(CSRF_HEADER), csrf_token)
                } else {
                    Ok(options)
                }
            },
        }
    }
}
