//! HTTP transport with bounded request time and normalized failures
//!
//! Every failure mode of a request (connection errors, timeouts, non-success
//! statuses, unparseable or mis-shaped bodies) comes back as one
//! [`ApiError`] with a distinct kind. No retries happen at this layer.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use serde_json::Value;
use tracing::debug;
use url::Url;
use x07_core::error::{ApiError, DecodeResult};

use crate::RegistryResult;

/// Time bound for general requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-request method, headers, body and time bound
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    /// JSON request body
    pub body: Option<Value>,
    /// Overrides the transport's default timeout
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn post() -> Self {
        Self {
            method: Method::POST,
            ..Self::get()
        }
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a header; values with characters not allowed in headers are rejected
    pub fn with_header(mut self, name: HeaderName, value: &str) -> RegistryResult<Self> {
        let value = HeaderValue::from_str(value).map_err(|e| {
            ApiError::invalid_input(format!("invalid value for header {}: {}", name, e))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

/// HTTP transport shared by every fetcher
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Underlying HTTP client with connection pooling
    client: Client,
    default_timeout: Duration,
}

impl HttpTransport {
    /// Create a transport with the default timeout and user agent
    pub fn new() -> RegistryResult<Self> {
        Self::with_config(
            &format!("x07reg/{}", env!("CARGO_PKG_VERSION")),
            DEFAULT_TIMEOUT,
        )
    }

    pub fn with_config(user_agent: &str, default_timeout: Duration) -> RegistryResult<Self> {
        let client = ClientBuilder::new()
            // Connection pooling configuration
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .gzip(true)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ApiError::unknown(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            default_timeout,
        })
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Issue one request and return the body of a successful response
    pub async fn fetch_text(&self, url: &Url, options: RequestOptions) -> RegistryResult<String> {
        let timeout = options.timeout.unwrap_or(self.default_timeout);
        debug!("{} {}", options.method, url);

        let mut request = self
            .client
            .request(options.method, url.clone())
            .headers(options.headers)
            .timeout(timeout);
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| classify(e, url))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| classify(e, url))?;

        if !status.is_success() {
            return Err(error_from_body(status, &text).with_url(url.as_str()));
        }
        Ok(text)
    }

    /// Fetch, parse as JSON, then decode.
    ///
    /// Unparseable text is `BAD_JSON`; JSON rejected by `decode` is
    /// `BAD_RESPONSE`.
    pub async fn fetch_json<T, D>(
        &self,
        url: &Url,
        decode: D,
        options: RequestOptions,
    ) -> RegistryResult<T>
    where
        D: FnOnce(&Value) -> DecodeResult<T>,
    {
        let text = self.fetch_text(url, options).await?;
        let raw: Value = serde_json::from_str(&text)
            .map_err(|e| ApiError::bad_json(e.to_string()).with_url(url.as_str()))?;
        decode(&raw).map_err(|e| ApiError::bad_response(e.to_string()).with_url(url.as_str()))
    }
}

/// `base` with `segments` appended, each percent-encoded as one path segment.
///
/// `base` comes from server config, so a bad base is `MISCONFIG`.
pub fn endpoint_url(base: &str, segments: &[&str]) -> RegistryResult<Url> {
    let mut url = Url::parse(base.trim())
        .map_err(|e| ApiError::misconfig(format!("invalid base URL {}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::misconfig(format!("base URL {} cannot hold a path", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Map a reqwest failure to its error kind
fn classify(error: reqwest::Error, url: &Url) -> ApiError {
    let err = if error.is_timeout() {
        ApiError::timeout()
    } else if error.is_builder() {
        ApiError::unknown(error.to_string())
    } else {
        ApiError::network(error.to_string())
    };
    err.with_url(url.as_str())
}

/// Surface a structured `{code, message, request_id?}` body verbatim,
/// otherwise a generic HTTP error
fn error_from_body(status: StatusCode, text: &str) -> ApiError {
    let parsed: Option<Value> = serde_json::from_str(text).ok();
    let structured = parsed.as_ref().and_then(Value::as_object).and_then(|obj| {
        let code = obj.get("code")?.as_str()?;
        let message = obj.get("message")?.as_str()?;
        let request_id = obj
            .get("request_id")
            .and_then(Value::as_str)
            .map(str::to_string);
        Some(ApiError::server(status.as_u16(), code, message).with_request_id(request_id))
    });

    structured.unwrap_or_else(|| ApiError::http(status.as_u16()))
}
