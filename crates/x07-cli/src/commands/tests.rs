//! Unit tests for CLI commands.

use super::*;

use camino::Utf8PathBuf;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use x07_config::RuntimeConfig;
use x07_core::types::{
    AuthSessionResponse, AuthSessionUser, Catalog, CatalogPackage, IndexEntry, OwnersResponse,
    PackageManifest, PackageMetadataResponse, SearchHit, SearchResponse, TokenInfo,
};
use x07_registry::bootstrap::BOOTSTRAP_TIMEOUT;
use x07_registry::{ConfigLoader, ConfigSource, HttpTransport};

/// Context against a static index on `server`, with a token file in `temp_dir`
fn test_context(server: &MockServer, temp_dir: &TempDir, auth: AuthStrategy) -> CommandContext {
    let runtime = RuntimeConfig::from_static(&format!("{}/index", server.uri()), "").unwrap();
    let transport = HttpTransport::new().unwrap();
    let config = ConfigLoader::new(
        transport.clone(),
        ConfigSource::Static(runtime),
        BOOTSTRAP_TIMEOUT,
    );
    let registry = Registry::with_parts(transport, config, auth);

    let token_path = Utf8PathBuf::try_from(temp_dir.path().join("token")).unwrap();
    CommandContext::with_parts(registry, TokenStore::new(token_path), false)
}

async fn mount_index_config(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/index/config.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dl": format!("{}/dl/", server.uri()),
            "api": format!("{}/api/", server.uri()),
            "auth-required": false,
            "sparse": true
        })))
        .mount(server)
        .await;
}

#[test]
fn test_select_version() {
    let entries = vec![
        IndexEntry::new("demo", "1.0.0", "sha256:a", false),
        IndexEntry::new("demo", "1.4.2", "sha256:b", false),
        IndexEntry::new("demo", "2.0.0", "sha256:c", true),
        IndexEntry::new("demo", "2.1.0-beta.1", "sha256:d", false),
    ];

    let latest = index::select_version(&entries, None).unwrap().unwrap();
    assert_eq!(latest.to_string(), "2.1.0-beta.1");

    let matching = index::select_version(&entries, Some("^1")).unwrap().unwrap();
    assert_eq!(matching.to_string(), "1.4.2");

    assert_eq!(index::select_version(&entries, Some("^3")).unwrap(), None);

    let err = index::select_version(&entries, Some("not a req")).unwrap_err();
    let api_error = err.downcast_ref::<x07_core::ApiError>().unwrap();
    assert_eq!(api_error.kind, x07_core::ErrorKind::InvalidInput);
}

#[test]
fn test_published_version_keeps_index_spelling() {
    let entries = vec![
        IndexEntry::new("demo", "1.0.0", "sha256:a", false),
        IndexEntry::new("demo", "v2.0.0", "sha256:b", false),
    ];

    let latest = index::select_version(&entries, None).unwrap().unwrap();
    assert_eq!(latest.to_string(), "2.0.0");
    assert_eq!(index::published_version(&entries, &latest), "v2.0.0");

    let missing = x07_resolver::Version::new(9, 9, 9);
    assert_eq!(index::published_version(&entries, &missing), "9.9.9");
}

#[test]
fn test_render_entries_marks_yanked() {
    let entries = vec![
        IndexEntry::new("demo", "1.0.0", "sha256:a", false),
        IndexEntry::new("demo", "10.0.0", "sha256:b", true),
    ];
    assert_eq!(
        index::render_entries(&entries),
        vec!["1.0.0   sha256:a", "10.0.0  sha256:b  (yanked)"]
    );
}

#[test]
fn test_render_info() {
    let metadata = PackageMetadataResponse {
        package: PackageManifest {
            schema_version: "x07.package@0.1.0".to_string(),
            name: "x07lang-demo".to_string(),
            description: None,
            version: "1.0.0".to_string(),
            module_root: "src".to_string(),
            modules: vec!["demo.core".to_string(), "demo.io".to_string()],
        },
        cksum: "sha256:ff".to_string(),
    };

    let lines = index::render_info(&metadata, true, "https://dl.example.test/x");
    assert_eq!(lines[0], "x07lang-demo 1.0.0 (official)");
    assert!(lines.contains(&"modules:     demo.core, demo.io".to_string()));
    assert_eq!(lines.last().unwrap(), "download:    https://dl.example.test/x");
}

#[test]
fn test_render_catalog() {
    let catalog = Catalog {
        schema_version: "x07.index-catalog@0.1.0".to_string(),
        packages: vec![
            CatalogPackage {
                name: "ab".to_string(),
                latest: Some("0.2.0".to_string()),
            },
            CatalogPackage {
                name: "fresh".to_string(),
                latest: None,
            },
        ],
    };
    assert_eq!(index::render_catalog(&catalog), vec!["ab     0.2.0", "fresh  -"]);
}

#[test]
fn test_render_search() {
    let page = SearchResponse {
        q: "demo".to_string(),
        limit: 20,
        offset: 20,
        total: 22,
        packages: vec![
            SearchHit {
                name: "demo".to_string(),
                latest_version: Some("1.0.0".to_string()),
                description: Some("A demo".to_string()),
                modules_count: Some(2),
            },
            SearchHit {
                name: "demo-x".to_string(),
                latest_version: None,
                description: None,
                modules_count: None,
            },
        ],
    };

    assert_eq!(
        packages::render_search(&page),
        vec![
            "demo    1.0.0  A demo",
            "demo-x  -",
            "showing 21 to 22 of 22"
        ]
    );

    let empty = SearchResponse {
        packages: Vec::new(),
        total: 0,
        ..page
    };
    assert_eq!(packages::render_search(&empty), vec!["no packages found"]);
}

#[test]
fn test_render_owners() {
    let owners = OwnersResponse {
        name: "demo".to_string(),
        owners: Vec::new(),
    };
    assert_eq!(packages::render_owners(&owners), vec!["demo has no owners"]);
}

#[test]
fn test_render_tokens() {
    let tokens = vec![
        TokenInfo {
            id: "tok_1".to_string(),
            label: "ci".to_string(),
            scopes: vec!["publish".to_string()],
            created_at: "2026-01-02T00:00:00Z".to_string(),
            last_used_at: Some("2026-02-01T00:00:00Z".to_string()),
            revoked_at: None,
        },
        TokenInfo {
            id: "tok_2".to_string(),
            label: "old".to_string(),
            scopes: Vec::new(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
            last_used_at: Some("2025-06-01T00:00:00Z".to_string()),
            revoked_at: Some("2025-07-01T00:00:00Z".to_string()),
        },
    ];

    assert_eq!(
        account::render_tokens(&tokens),
        vec![
            "tok_1  ci  [publish]  created 2026-01-02T00:00:00Z  last used 2026-02-01T00:00:00Z",
            "tok_2  old  []  created 2025-01-01T00:00:00Z  revoked 2025-07-01T00:00:00Z",
        ]
    );
    assert_eq!(account::render_tokens(&[]), vec!["no tokens"]);
}

#[test]
fn test_render_session() {
    let anonymous = AuthSessionResponse {
        authenticated: false,
        csrf_token: None,
        user: None,
    };
    assert_eq!(account::render_session(&anonymous), vec!["not logged in"]);

    let signed_in = AuthSessionResponse {
        authenticated: true,
        csrf_token: Some("csrf".to_string()),
        user: Some(AuthSessionUser {
            id: "u1".to_string(),
            handle: "alice".to_string(),
            github_user_id: None,
            github_login: None,
            avatar_url: None,
            profile_url: None,
            email: Some("alice@example.test".to_string()),
            email_verified: true,
            email_primary: true,
            is_admin: false,
            scopes: vec!["publish".to_string()],
        }),
    };
    assert_eq!(
        account::render_session(&signed_in),
        vec![
            "alice (u1)",
            "email:  alice@example.test (verified)",
            "scopes: publish"
        ]
    );
}

#[tokio::test]
async fn test_login_then_logout() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let ctx = test_context(&server, &temp_dir, AuthStrategy::None);

    account::login("  x07_secret \n", &ctx).await.unwrap();
    assert_eq!(ctx.tokens.load().await.unwrap().as_deref(), Some("x07_secret"));

    account::logout(&ctx).await.unwrap();
    assert_eq!(ctx.tokens.load().await.unwrap(), None);

    // Bearer and anonymous logout never call the server.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_rejects_blank_token() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let ctx = test_context(&server, &temp_dir, AuthStrategy::None);

    assert!(account::login("   ", &ctx).await.is_err());
    assert_eq!(ctx.tokens.load().await.unwrap(), None);
}

#[tokio::test]
async fn test_session_logout_calls_server() {
    let server = MockServer::start().await;
    mount_index_config(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .and(header("x-csrf-token", "csrf-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let auth = AuthStrategy::Session {
        cookie: "x07_session=abc".to_string(),
        csrf_token: "csrf-1".to_string(),
    };
    let ctx = test_context(&server, &temp_dir, auth);
    account::logout(&ctx).await.unwrap();
}

#[tokio::test]
async fn test_dispatch_latest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index/3/d/dem"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            json!({
                "schema_version": "x07.index-entry@0.1.0",
                "name": "dem",
                "version": "0.3.0",
                "cksum": "sha256:00",
                "yanked": true
            })
            .to_string(),
        ))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let ctx = test_context(&server, &temp_dir, AuthStrategy::None);

    let err = dispatch_command(
        Commands::Latest {
            name: "dem".to_string(),
            req: None,
        },
        &ctx,
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "no usable version of dem");
}

#[tokio::test]
async fn test_dispatch_path_rejects_bad_name() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let ctx = test_context(&server, &temp_dir, AuthStrategy::None);

    let err = dispatch_command(
        Commands::Path {
            name: "Bad".to_string(),
        },
        &ctx,
    )
    .await
    .unwrap_err();
    assert!(err.downcast_ref::<x07_core::ApiError>().is_some());
    assert!(server.received_requests().await.unwrap().is_empty());
}
