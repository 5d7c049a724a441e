// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metasearch::domain::models::provider::{ProviderConfig, ProviderKind};
use metasearch::domain::models::query::Query;
use metasearch::domain::models::search_result::ContentType;
use metasearch::domain::search::credentials::StaticCredentialStore;
use metasearch::domain::search::engine::{AdapterError, SearchProvider};
use metasearch::infrastructure::search::google::GoogleSearchProvider;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/customsearch/v1";

fn google_config(server: &MockServer) -> ProviderConfig {
    let mut config = ProviderConfig::new("google", ProviderKind::Google);
    config.endpoint = Some(format!("{}{}", server.uri(), SEARCH_PATH));
    config.credential = Some("GOOGLE_API_KEY".to_string());
    config.params.insert("cx".to_string(), "GOOGLE_CX".to_string());
    config
}

fn google_provider(config: &ProviderConfig) -> GoogleSearchProvider {
    let store = StaticCredentialStore::new()
        .with("GOOGLE_API_KEY", "test-key")
        .with("GOOGLE_CX", "engine-1");
    GoogleSearchProvider::new(config, reqwest::Client::new(), Arc::new(store))
}

fn items(range: std::ops::Range<usize>) -> Value {
    let items: Vec<Value> = range
        .map(|i| {
            json!({
                "title": format!("Result {}", i),
                "link": format!("https://example.com/{}", i),
                "snippet": format!("snippet {}", i),
            })
        })
        .collect();
    json!({ "items": items })
}

#[tokio::test]
async fn test_parses_items_and_decodes_entities() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("key", "test-key"))
        .and(query_param("cx", "engine-1"))
        .and(query_param("q", "rust async"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "title": "Tokio &amp; async",
                    "link": "https://tokio.rs/",
                    "snippet": "An asynchronous\n runtime &quot;for&quot; Rust",
                    "displayLink": "tokio.rs"
                },
                { "title": "No link here", "snippet": "skipped" },
                {
                    "title": "Async book",
                    "link": "https://rust-lang.github.io/async-book/async-book.pdf",
                    "snippet": "pdf",
                    "mime": "application/pdf",
                    "fileFormat": "PDF/Adobe Acrobat"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let google = google_provider(&google_config(&server));
    let results = google
        .fetch(&Query::new("rust async"), 10, Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Tokio & async");
    assert_eq!(results[0].snippet, "An asynchronous runtime \"for\" Rust");
    assert_eq!(results[0].rank, 1);
    assert_eq!(results[0].provider, "google");
    assert_eq!(results[0].metadata["display_link"], "tokio.rs");
    assert_eq!(results[1].rank, 2);
    assert_eq!(results[1].content_type, ContentType::Document);
}

#[tokio::test]
async fn test_pages_until_enough_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("start", "1"))
        .and(query_param("num", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(0..10)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("start", "11"))
        .and(query_param("num", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(10..15)))
        .expect(1)
        .mount(&server)
        .await;

    let google = google_provider(&google_config(&server));
    let results = google
        .fetch(&Query::new("rust"), 15, Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(results.len(), 15);
    let ranks: Vec<u32> = results.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, (1..=15).collect::<Vec<u32>>());
    assert_eq!(results[14].url, "https://example.com/14");
}

#[tokio::test]
async fn test_later_page_failure_keeps_partial_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("start", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(0..10)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("start", "11"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let google = google_provider(&google_config(&server));
    let results = google
        .fetch(&Query::new("rust"), 20, Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(results.len(), 10);
}

#[tokio::test]
async fn test_unauthorized_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let google = google_provider(&google_config(&server));
    let err = google
        .fetch(&Query::new("rust"), 10, Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, AdapterError::Unauthorized(_)));
}

#[tokio::test]
async fn test_too_many_requests_uses_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let google = google_provider(&google_config(&server));
    let err = google
        .fetch(&Query::new("rust"), 10, Duration::from_secs(5))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        AdapterError::RateLimited {
            retry_after: Duration::from_secs(7)
        }
    );
}

#[tokio::test]
async fn test_daily_limit_forbidden_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "Daily Limit Exceeded",
                "errors": [{ "reason": "dailyLimitExceeded" }]
            }
        })))
        .mount(&server)
        .await;

    let google = google_provider(&google_config(&server));
    let err = google
        .fetch(&Query::new("rust"), 10, Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, AdapterError::RateLimited { .. }));
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let google = google_provider(&google_config(&server));
    let err = google
        .fetch(&Query::new("rust"), 10, Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, AdapterError::Unavailable(_)));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(items(0..1))
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&server)
        .await;

    let google = google_provider(&google_config(&server));
    let err = google
        .fetch(&Query::new("rust"), 10, Duration::from_millis(100))
        .await
        .unwrap_err();

    assert_eq!(err, AdapterError::Timeout);
}

#[tokio::test]
async fn test_local_quota_blocks_second_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(0..1)))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = google_config(&server);
    config.requests_per_minute = Some(1);
    let google = google_provider(&config);

    google
        .fetch(&Query::new("rust"), 1, Duration::from_secs(5))
        .await
        .unwrap();
    let err = google
        .fetch(&Query::new("rust"), 1, Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, AdapterError::RateLimited { .. }));
}
