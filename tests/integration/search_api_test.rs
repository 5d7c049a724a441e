// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_server, handle, MockProvider};
use axum::http::StatusCode;
use metasearch::domain::search::engine::AdapterError;
use serde_json::{json, Value};

fn two_providers() -> Vec<metasearch::infrastructure::search::dispatcher::ProviderHandle> {
    vec![
        handle(MockProvider::new("google").with_urls(&[
            "https://rust-lang.org/",
            "https://doc.rust-lang.org/book",
        ])),
        handle(MockProvider::new("bing").with_urls(&[
            "https://rust-lang.org/?utm_source=bing",
            "https://crates.io",
        ])),
    ]
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(two_providers());

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["providers"], json!(["google", "bing"]));
}

#[tokio::test]
async fn test_health_degraded_without_providers() {
    let server = create_test_server(Vec::new());

    let body: Value = server.get("/health").await.json();
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn test_version_endpoint() {
    let server = create_test_server(Vec::new());

    let response = server.get("/v1/version").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "metasearch");
}

#[tokio::test]
async fn test_search_merges_duplicates() {
    let server = create_test_server(two_providers());

    let response = server
        .post("/v1/search")
        .json(&json!({ "query": "rust programming language", "num_results": 10 }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let results = body["results"].as_array().unwrap();
    // rust-lang.org appears in both providers
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["url"], "https://rust-lang.org/");
    assert_eq!(results[0]["providers"], json!(["google", "bing"]));

    let metadata = &body["metadata"];
    assert_eq!(metadata["ranking_strategy"], "weighted");
    assert_eq!(metadata["partial_results"], false);
    assert_eq!(metadata["total_results"], 3);
    assert_eq!(metadata["deduplication"]["duplicates_removed"], 1);
    assert_eq!(metadata["result_counts"]["google"], 2);
    assert_eq!(body["query"]["text"], "rust programming language");
}

#[tokio::test]
async fn test_search_interleaved_strategy() {
    let server = create_test_server(vec![
        handle(MockProvider::new("google").with_urls(&["https://a.com/1", "https://a.com/2"])),
        handle(MockProvider::new("bing").with_urls(&["https://b.com/1", "https://b.com/2"])),
    ]);

    let body: Value = server
        .post("/v1/search")
        .json(&json!({ "query": "news", "strategy": "interleaved" }))
        .await
        .json();

    let urls: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["url"].as_str().unwrap())
        .collect();
    assert_eq!(
        urls,
        vec!["https://a.com/1", "https://b.com/1", "https://a.com/2", "https://b.com/2"]
    );
    assert_eq!(body["metadata"]["ranking_strategy"], "interleaved");
}

#[tokio::test]
async fn test_search_respects_limit_alias() {
    let server = create_test_server(two_providers());

    let body: Value = server
        .post("/v1/search")
        .json(&json!({ "query": "rust", "limit": 1 }))
        .await
        .json();

    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_rejects_empty_query() {
    let server = create_test_server(two_providers());

    let response = server
        .post("/v1/search")
        .json(&json!({ "query": "   " }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn test_search_rejects_zero_results() {
    let server = create_test_server(two_providers());

    let response = server
        .post("/v1/search")
        .json(&json!({ "query": "rust", "num_results": 0 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_rejects_malformed_body() {
    let server = create_test_server(two_providers());

    let response = server.post("/v1/search").text("{not json").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn test_unknown_provider_filter_is_configuration_error() {
    let server = create_test_server(two_providers());

    let response = server
        .post("/v1/search")
        .json(&json!({ "query": "rust", "providers": ["yandex"] }))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["code"], "configuration_error");
}

#[tokio::test]
async fn test_provider_filter_limits_dispatch() {
    let bing = MockProvider::new("bing").with_urls(&["https://b.com"]);
    let bing_calls = bing.calls();
    let server = create_test_server(vec![
        handle(MockProvider::new("google").with_urls(&["https://a.com"])),
        handle(bing),
    ]);

    let body: Value = server
        .post("/v1/search")
        .json(&json!({ "query": "rust", "sources": ["Google"] }))
        .await
        .json();

    assert_eq!(body["metadata"]["providers_used"], json!(["google"]));
    assert_eq!(bing_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_all_providers_failing_returns_empty_success() {
    let server = create_test_server(vec![
        handle(
            MockProvider::new("google")
                .failing(AdapterError::Unauthorized("missing api key".into())),
        ),
        handle(MockProvider::new("bing").failing(AdapterError::Unavailable("503".into()))),
    ]);

    let response = server
        .post("/v1/search")
        .json(&json!({ "query": "rust" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["results"].as_array().unwrap().is_empty());
    let metadata = &body["metadata"];
    assert_eq!(metadata["partial_results"], true);
    assert_eq!(metadata["provider_errors"]["google"]["kind"], "unauthorized");
    assert_eq!(metadata["provider_errors"]["bing"]["kind"], "unavailable");
    assert_eq!(metadata["result_counts"]["bing"], 0);
}

#[tokio::test]
async fn test_partial_failure_keeps_successful_results() {
    let server = create_test_server(vec![
        handle(MockProvider::new("google").with_urls(&["https://a.com", "https://b.com"])),
        handle(MockProvider::new("bing").failing(AdapterError::RateLimited {
            retry_after: std::time::Duration::from_secs(2),
        })),
    ]);

    let body: Value = server
        .post("/v1/search")
        .json(&json!({ "query": "rust" }))
        .await
        .json();

    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["metadata"]["partial_results"], true);
    assert_eq!(
        body["metadata"]["provider_errors"]["bing"]["retry_after_ms"],
        2000
    );
}

#[tokio::test]
async fn test_analyze_endpoint() {
    let server = create_test_server(Vec::new());

    let response = server
        .get("/v1/search/analyze")
        .add_query_param("query", "best restaurants in new york")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["intent"], "local");
    assert_eq!(body["locality"], "local");
    assert_eq!(body["language"], "en");
}

#[tokio::test]
async fn test_analyze_endpoint_requires_query() {
    let server = create_test_server(Vec::new());

    let response = server.get("/v1/search/analyze").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
