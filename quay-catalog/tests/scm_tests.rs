use quay_catalog::{HttpUrlReader, ScmIntegration, ScmIntegrations, UrlReader};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Integration resolution ──────────────────────────────────────

#[test]
fn by_url_matches_host() {
    let integrations = ScmIntegrations::new(vec![
        ScmIntegration::new("github.com"),
        ScmIntegration::new("gitlab.acme.dev"),
    ]);

    let hit = integrations
        .by_url("https://github.com/acme/ms-payments/tree/main/")
        .unwrap();
    assert_eq!(hit.host, "github.com");

    assert!(integrations.by_url("https://bitbucket.org/x/y").is_none());
    assert!(integrations.by_url("not a url").is_none());
}

#[test]
fn resolve_root_ensures_trailing_slash() {
    let integrations = ScmIntegrations::default();
    assert_eq!(
        integrations.resolve_root("https://github.com/acme/repo/tree/main"),
        "https://github.com/acme/repo/tree/main/"
    );
    assert_eq!(
        integrations.resolve_root("https://github.com/acme/repo/tree/main/"),
        "https://github.com/acme/repo/tree/main/"
    );
}

#[test]
fn join_url_strips_relative_prefixes() {
    let root = "https://github.com/acme/repo/tree/main/";
    assert_eq!(
        ScmIntegrations::join_url(root, "./chart/values.qa.yaml"),
        "https://github.com/acme/repo/tree/main/chart/values.qa.yaml"
    );
    assert_eq!(
        ScmIntegrations::join_url(root, "logo.png"),
        "https://github.com/acme/repo/tree/main/logo.png"
    );
}

// ── HttpUrlReader ───────────────────────────────────────────────

#[tokio::test]
async fn read_url_returns_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/acme/repo/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png-bytes".to_vec()))
        .mount(&server)
        .await;

    let reader = HttpUrlReader::new(ScmIntegrations::default());
    let bytes = reader
        .read_url(&format!("{}/acme/repo/logo.png", server.uri()))
        .await
        .unwrap();

    assert_eq!(bytes, b"png-bytes");
}

#[tokio::test]
async fn read_url_sends_integration_token() {
    let server = MockServer::start().await;
    let host = server.uri();
    let host = host.trim_start_matches("http://").to_string();

    Mock::given(method("GET"))
        .and(path("/secret.yaml"))
        .and(header("authorization", "Bearer scm-token"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .mount(&server)
        .await;

    let reader = HttpUrlReader::new(ScmIntegrations::new(vec![
        ScmIntegration::new(host).with_token("scm-token"),
    ]));
    let bytes = reader
        .read_url(&format!("{}/secret.yaml", server.uri()))
        .await
        .unwrap();

    assert_eq!(bytes, b"ok");
}

#[tokio::test]
async fn read_url_distinguishes_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.yaml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let reader = HttpUrlReader::new(ScmIntegrations::default());
    let err = reader
        .read_url(&format!("{}/missing.yaml", server.uri()))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn read_url_maps_other_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky.yaml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let reader = HttpUrlReader::new(ScmIntegrations::default());
    let err = reader
        .read_url(&format!("{}/flaky.yaml", server.uri()))
        .await
        .unwrap_err();

    assert!(!err.is_not_found());
    assert!(err.to_string().contains("503"));
}
