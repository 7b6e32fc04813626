//! End-to-end runs against one mock server standing in for arXiv, DeepL and GitHub.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use arxiv_quration_bot::config::{Config, CredentialSources};
use arxiv_quration_bot::query::SearchQuery;
use arxiv_quration_bot::{BotError, ClientError, app, formatters};

const PRIVATE_KEY: &str = include_str!("fixtures/test-app-key.pem");
const ISSUES_PATH: &str = "/repos/arXivQuration/arXivQurationBot/issues";

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query</title>
  <id>http://arxiv.org/api/test</id>
  <entry>
    <id>http://arxiv.org/abs/2403.01234v1</id>
    <published>2024-03-09T18:00:00Z</published>
    <title>Fault-tolerant
  logical qubits</title>
    <summary>We demonstrate
logical qubits.</summary>
    <author><name>A. One</name></author>
    <author><name>B. Two</name></author>
    <arxiv:doi xmlns:arxiv="http://arxiv.org/schemas/atom">10.1103/PhysRevA.1.1</arxiv:doi>
    <link title="doi" href="http://dx.doi.org/10.1103/PhysRevA.1.1" rel="related"/>
    <link href="http://arxiv.org/abs/2403.01234v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2403.01234v1" rel="related" type="application/pdf"/>
  </entry>
</feed>"#;

// =============================================================================
// Helper Functions
// =============================================================================

fn sources() -> CredentialSources {
    CredentialSources {
        app_key: Some(PRIVATE_KEY.to_string()),
        app_key_path: PathBuf::from("/nonexistent/key.pem"),
        app_id: Some("352129".to_string()),
        deepl_auth_key: Some("test-key:fx".to_string()),
    }
}

fn query() -> SearchQuery {
    SearchQuery::for_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
}

async fn mount_github_auth(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/app/installations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 42, "account": {"login": "arXivQuration"}}
        ])))
        .mount(mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/app/installations/42/access_tokens"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": "ghs_test",
            "expires_at": "2024-03-15T01:00:00Z"
        })))
        .mount(mock_server)
        .await;
}

async fn mount_arxiv(mock_server: &MockServer, feed: &str) {
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed))
        .mount(mock_server)
        .await;
}

async fn mount_deepl(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .and(body_partial_json(json!({"text": ["We demonstrate logical qubits."]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "translations": [{"detected_source_language": "EN", "text": "論理量子ビットを実証する。"}]
        })))
        .mount(mock_server)
        .await;
}

async fn mount_issues(mock_server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path(ISSUES_PATH))
        .and(header("authorization", "Bearer ghs_test"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "number": 1,
            "html_url": "https://github.com/arXivQuration/arXivQurationBot/issues/1"
        })))
        .expect(expected)
        .mount(mock_server)
        .await;
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_full_run_files_issue() {
    let mock_server = MockServer::start().await;
    mount_github_auth(&mock_server).await;
    mount_arxiv(&mock_server, FEED).await;
    mount_deepl(&mock_server).await;
    mount_issues(&mock_server, 1).await;

    let config = Config::for_testing(&mock_server.uri());
    let summary = app::run_with_query(&config, &sources(), &query()).await.unwrap();

    assert_eq!(summary.fetched, 1);
    assert_eq!(summary.created.len(), 1);
    assert!(summary.is_complete());

    let requests = mock_server.received_requests().await.unwrap();
    let issue_request = requests.iter().find(|r| r.url.path() == ISSUES_PATH).unwrap();
    let issue: serde_json::Value = serde_json::from_slice(&issue_request.body).unwrap();

    assert_eq!(issue["title"], "Fault-tolerant logical qubits");

    let body = issue["body"].as_str().unwrap();
    let sections = formatters::parse_body(body).unwrap();
    assert_eq!(sections.summary, "論理量子ビットを実証する。");
    assert_eq!(
        sections.links,
        "http://arxiv.org/abs/2403.01234v1 ([ar5iv](http://ar5iv.org/abs/2403.01234v1), \
         [pdf](http://arxiv.org/pdf/2403.01234v1))\n\
         [doi:10.1103/PhysRevA.1.1](https://doi.org/10.1103/PhysRevA.1.1)"
    );
    assert_eq!(sections.authors, "A. One, B. Two");
    assert_eq!(sections.published, "2024/03/09");
}

#[tokio::test]
async fn test_running_twice_files_two_issues() {
    let mock_server = MockServer::start().await;
    mount_github_auth(&mock_server).await;
    mount_arxiv(&mock_server, FEED).await;
    mount_deepl(&mock_server).await;
    mount_issues(&mock_server, 2).await;

    let config = Config::for_testing(&mock_server.uri());
    for _ in 0..2 {
        let summary = app::run_with_query(&config, &sources(), &query()).await.unwrap();
        assert_eq!(summary.created.len(), 1);
    }
}

#[tokio::test]
async fn test_key_file_fallback() {
    let mock_server = MockServer::start().await;
    mount_github_auth(&mock_server).await;
    mount_arxiv(&mock_server, r#"<feed xmlns="http://www.w3.org/2005/Atom"></feed>"#).await;

    let mut key_file = tempfile::NamedTempFile::new().unwrap();
    key_file.write_all(PRIVATE_KEY.as_bytes()).unwrap();

    let sources = CredentialSources {
        app_key: None,
        app_key_path: key_file.path().to_path_buf(),
        ..sources()
    };

    let config = Config::for_testing(&mock_server.uri());
    let summary = app::run_with_query(&config, &sources, &query()).await.unwrap();
    assert_eq!(summary.fetched, 0);
}

#[tokio::test]
async fn test_missing_app_id_fails_before_network() {
    let mock_server = MockServer::start().await;

    let sources = CredentialSources { app_id: None, ..sources() };
    let config = Config::for_testing(&mock_server.uri());
    let err = app::run_with_query(&config, &sources, &query()).await.unwrap_err();

    assert!(matches!(err, BotError::Configuration { .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_deepl_key() {
    let mock_server = MockServer::start().await;

    let sources = CredentialSources { deepl_auth_key: Some(String::new()), ..sources() };
    let config = Config::for_testing(&mock_server.uri());
    let err = app::run_with_query(&config, &sources, &query()).await.unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_rejected_app_is_authentication_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app/installations"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})))
        .mount(&mock_server)
        .await;

    let config = Config::for_testing(&mock_server.uri());
    let err = app::run_with_query(&config, &sources(), &query()).await.unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_arxiv_outage_is_fetch_error() {
    let mock_server = MockServer::start().await;
    mount_github_auth(&mock_server).await;
    mount_issues(&mock_server, 0).await;

    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = Config::for_testing(&mock_server.uri());
    let err = app::run_with_query(&config, &sources(), &query()).await.unwrap_err();
    assert_eq!(err.exit_code(), 4);
}

#[tokio::test]
async fn test_arxiv_timeout_is_fetch_error() {
    let mock_server = MockServer::start().await;
    mount_github_auth(&mock_server).await;
    mount_issues(&mock_server, 0).await;

    Mock::given(method("GET"))
        .and(path("/api/query"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(FEED).set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.request_timeout = Duration::from_millis(300);
    let err = app::run_with_query(&config, &sources(), &query()).await.unwrap_err();

    assert!(matches!(err, BotError::Fetch(ClientError::Timeout(_))));
    assert_eq!(err.exit_code(), 4);
}

#[tokio::test]
async fn test_translation_failure_is_skipped_by_default() {
    let mock_server = MockServer::start().await;
    mount_github_auth(&mock_server).await;
    mount_arxiv(&mock_server, FEED).await;
    mount_issues(&mock_server, 0).await;

    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .respond_with(ResponseTemplate::new(456).set_body_string("Quota exceeded"))
        .mount(&mock_server)
        .await;

    let config = Config::for_testing(&mock_server.uri());
    let summary = app::run_with_query(&config, &sources(), &query()).await.unwrap();

    assert_eq!(summary.fetched, 1);
    assert!(summary.created.is_empty());
    assert_eq!(summary.failures[0].paper_id, "http://arxiv.org/abs/2403.01234v1");
    assert_eq!(summary.exit_code(), 5);
}
