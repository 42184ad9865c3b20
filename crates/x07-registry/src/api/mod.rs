//! Schema decoders for index documents and registry API responses
//!
//! One pure function per response shape. Discriminants (`ok`, `sparse`,
//! `schema_version`) are compared to their exact literal; nested objects are
//! decoded by their own decoder so errors name the deepest offending field.

use serde_json::Value;
use x07_core::error::DecodeResult;
use x07_core::types::{
    AccountResponse, AuthSessionResponse, AuthSessionUser, Catalog, CatalogPackage, IndexConfig,
    IndexEntry, OwnersResponse, PackageManifest, PackageMetadataResponse, SearchHit,
    SearchResponse, SimpleOkResponse, TokenCreateResponse, TokenInfo, TokenListResponse,
    YankResponse, CATALOG_SCHEMA, INDEX_ENTRY_SCHEMA,
};
use x07_core::utils::json::{
    as_object, expect_array, expect_bool, expect_literal, expect_string, expect_string_array,
    expect_true, expect_u64, optional_string, optional_string_array, optional_u64, Object,
};

/// Object carrying the `ok: true` discriminant
fn ok_envelope<'a>(raw: &'a Value, what: &str) -> DecodeResult<&'a Object> {
    let obj = as_object(raw, what)?;
    expect_true(obj, "ok")?;
    Ok(obj)
}

static NULL: Value = Value::Null;

/// Nested value to hand to another decoder; absent reads as `null`
fn field<'a>(obj: &'a Object, name: &str) -> &'a Value {
    obj.get(name).unwrap_or(&NULL)
}

pub fn decode_index_config(raw: &Value) -> DecodeResult<IndexConfig> {
    let obj = as_object(raw, "index config")?;
    let dl = expect_string(obj, "dl")?;
    let api = expect_string(obj, "api")?;
    let auth_required = expect_bool(obj, "auth-required")?;
    expect_true(obj, "sparse")?;
    let verified_namespaces = optional_string_array(obj, "verified-namespaces")?;

    Ok(IndexConfig {
        dl,
        api,
        auth_required,
        verified_namespaces,
    })
}

pub fn decode_index_entry(raw: &Value) -> DecodeResult<IndexEntry> {
    let obj = as_object(raw, "index entry")?;
    expect_literal(obj, "schema_version", INDEX_ENTRY_SCHEMA)?;

    Ok(IndexEntry {
        schema_version: INDEX_ENTRY_SCHEMA.to_string(),
        name: expect_string(obj, "name")?,
        version: expect_string(obj, "version")?,
        cksum: expect_string(obj, "cksum")?,
        yanked: expect_bool(obj, "yanked")?,
    })
}

pub fn decode_package_manifest(raw: &Value) -> DecodeResult<PackageManifest> {
    let obj = as_object(raw, "package manifest")?;

    Ok(PackageManifest {
        schema_version: expect_string(obj, "schema_version")?,
        name: expect_string(obj, "name")?,
        description: optional_string(obj, "description")?,
        version: expect_string(obj, "version")?,
        module_root: expect_string(obj, "module_root")?,
        modules: expect_string_array(obj, "modules")?,
    })
}

pub fn decode_package_metadata_response(raw: &Value) -> DecodeResult<PackageMetadataResponse> {
    let obj = ok_envelope(raw, "metadata response")?;
    let package = decode_package_manifest(field(obj, "package"))?;
    let cksum = expect_string(obj, "cksum")?;
    Ok(PackageMetadataResponse { package, cksum })
}

pub fn decode_catalog(raw: &Value) -> DecodeResult<Catalog> {
    let obj = as_object(raw, "catalog")?;
    expect_literal(obj, "schema_version", CATALOG_SCHEMA)?;

    let packages = expect_array(obj, "packages")?
        .iter()
        .map(|p| -> DecodeResult<CatalogPackage> {
            let p = as_object(p, "package")?;
            Ok(CatalogPackage {
                name: expect_string(p, "name")?,
                latest: optional_string(p, "latest")?,
            })
        })
        .collect::<DecodeResult<Vec<_>>>()?;

    Ok(Catalog {
        schema_version: CATALOG_SCHEMA.to_string(),
        packages,
    })
}

fn decode_search_hit(raw: &Value) -> DecodeResult<SearchHit> {
    let obj = as_object(raw, "package")?;
    Ok(SearchHit {
        name: expect_string(obj, "name")?,
        latest_version: optional_string(obj, "latest_version")?,
        description: optional_string(obj, "description")?,
        modules_count: optional_u64(obj, "modules_count")?,
    })
}

pub fn decode_search_response(raw: &Value) -> DecodeResult<SearchResponse> {
    let obj = ok_envelope(raw, "search response")?;
    let q = expect_string(obj, "q")?;
    let limit = expect_u64(obj, "limit")?;
    let offset = expect_u64(obj, "offset")?;
    let total = expect_u64(obj, "total")?;
    let packages = expect_array(obj, "packages")?
        .iter()
        .map(decode_search_hit)
        .collect::<DecodeResult<Vec<_>>>()?;

    Ok(SearchResponse {
        q,
        limit,
        offset,
        total,
        packages,
    })
}

pub fn decode_owners_response(raw: &Value) -> DecodeResult<OwnersResponse> {
    let obj = ok_envelope(raw, "owners response")?;
    Ok(OwnersResponse {
        name: expect_string(obj, "name")?,
        owners: expect_string_array(obj, "owners")?,
    })
}

pub fn decode_account_response(raw: &Value) -> DecodeResult<AccountResponse> {
    let obj = ok_envelope(raw, "account response")?;
    Ok(AccountResponse {
        user_id: expect_string(obj, "user_id")?,
        handle: expect_string(obj, "handle")?,
        token_id: expect_string(obj, "token_id")?,
        scopes: expect_string_array(obj, "scopes")?,
    })
}

fn decode_auth_session_user(raw: &Value) -> DecodeResult<AuthSessionUser> {
    let obj = as_object(raw, "user")?;
    Ok(AuthSessionUser {
        id: expect_string(obj, "id")?,
        handle: expect_string(obj, "handle")?,
        github_user_id: optional_u64(obj, "github_user_id")?,
        github_login: optional_string(obj, "github_login")?,
        avatar_url: optional_string(obj, "avatar_url")?,
        profile_url: optional_string(obj, "profile_url")?,
        email: optional_string(obj, "email")?,
        email_verified: expect_bool(obj, "email_verified")?,
        email_primary: expect_bool(obj, "email_primary")?,
        is_admin: expect_bool(obj, "is_admin")?,
        scopes: expect_string_array(obj, "scopes")?,
    })
}

pub fn decode_auth_session_response(raw: &Value) -> DecodeResult<AuthSessionResponse> {
    let obj = ok_envelope(raw, "auth session response")?;
    let user = match field(obj, "user") {
        Value::Null => None,
        user => Some(decode_auth_session_user(user)?),
    };

    Ok(AuthSessionResponse {
        authenticated: expect_bool(obj, "authenticated")?,
        csrf_token: optional_string(obj, "csrf_token")?,
        user,
    })
}

pub fn decode_token_info(raw: &Value) -> DecodeResult<TokenInfo> {
    let obj = as_object(raw, "token")?;
    Ok(TokenInfo {
        id: expect_string(obj, "id")?,
        label: expect_string(obj, "label")?,
        scopes: expect_string_array(obj, "scopes")?,
        created_at: expect_string(obj, "created_at")?,
        last_used_at: optional_string(obj, "last_used_at")?,
        revoked_at: optional_string(obj, "revoked_at")?,
    })
}

pub fn decode_token_list_response(raw: &Value) -> DecodeResult<TokenListResponse> {
    let obj = ok_envelope(raw, "token list response")?;
    let tokens = expect_array(obj, "tokens")?
        .iter()
        .map(decode_token_info)
        .collect::<DecodeResult<Vec<_>>>()?;
    Ok(TokenListResponse { tokens })
}

pub fn decode_token_create_response(raw: &Value) -> DecodeResult<TokenCreateResponse> {
    let obj = ok_envelope(raw, "token create response")?;
    Ok(TokenCreateResponse {
        token_id: expect_string(obj, "token_id")?,
        token: expect_string(obj, "token")?,
        scopes: expect_string_array(obj, "scopes")?,
    })
}

pub fn decode_simple_ok_response(raw: &Value) -> DecodeResult<SimpleOkResponse> {
    ok_envelope(raw, "response")?;
    Ok(SimpleOkResponse)
}

pub fn decode_yank_response(raw: &Value) -> DecodeResult<YankResponse> {
    let obj = ok_envelope(raw, "yank response")?;
    Ok(YankResponse {
        name: expect_string(obj, "name")?,
        version: expect_string(obj, "version")?,
        yanked: expect_bool(obj, "yanked")?,
    })
}
