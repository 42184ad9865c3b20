//! Registry API response envelopes.
//!
//! Every envelope here carried `ok: true` on the wire; the decoders reject
//! anything else, so the discriminant is not kept on the Rust side.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResponse {
    pub q: String,
    pub limit: u64,
    pub offset: u64,
    pub total: u64,
    pub packages: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnersResponse {
    pub name: String,
    pub owners: Vec<String>,
}

/// `GET account` (bearer deployments)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountResponse {
    pub user_id: String,
    pub handle: String,
    pub token_id: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSessionUser {
    pub id: String,
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_user_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub email_verified: bool,
    pub email_primary: bool,
    pub is_admin: bool,
    pub scopes: Vec<String>,
}

/// `GET auth/session` (cookie deployments)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthSessionUser>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub id: String,
    pub label: String,
    pub scopes: Vec<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<String>,
}

impl TokenInfo {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenListResponse {
    pub tokens: Vec<TokenInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenCreateResponse {
    pub token_id: String,
    /// Secret value, shown once
    pub token: String,
    pub scopes: Vec<String>,
}

/// Acknowledgement carrying nothing but `ok: true`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimpleOkResponse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YankResponse {
    pub name: String,
    pub version: String,
    pub yanked: bool,
}
