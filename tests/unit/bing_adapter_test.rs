// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metasearch::domain::models::provider::{ProviderConfig, ProviderKind};
use metasearch::domain::models::query::Query;
use metasearch::domain::search::credentials::StaticCredentialStore;
use metasearch::domain::search::engine::{AdapterError, SearchProvider};
use metasearch::infrastructure::search::bing::BingSearchProvider;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/v7.0/search";

fn bing_provider(server: &MockServer) -> BingSearchProvider {
    let mut config = ProviderConfig::new("bing", ProviderKind::Bing);
    config.endpoint = Some(format!("{}{}", server.uri(), SEARCH_PATH));
    config.credential = Some("BING_API_KEY".to_string());
    let store = StaticCredentialStore::new().with("BING_API_KEY", "bing-key");
    BingSearchProvider::new(&config, reqwest::Client::new(), Arc::new(store))
}

#[tokio::test]
async fn test_sends_subscription_key_and_parses_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(header("Ocp-Apim-Subscription-Key", "bing-key"))
        .and(query_param("q", "rust site:docs.rs"))
        .and(query_param("count", "5"))
        .and(query_param("offset", "0"))
        .and(query_param("textDecorations", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "webPages": {
                "value": [
                    {
                        "name": "serde &amp; friends",
                        "url": "https://docs.rs/serde",
                        "snippet": "Serialization  framework",
                        "displayUrl": "docs.rs/serde",
                        "dateLastCrawled": "2025-01-01T00:00:00Z",
                        "language": "en"
                    },
                    {
                        "name": "tokio",
                        "url": "https://docs.rs/tokio",
                        "snippet": "Runtime"
                    }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut query = Query::new("rust");
    query
        .parameters
        .insert("site".to_string(), json!("docs.rs"));

    let results = bing_provider(&server)
        .fetch(&query, 5, Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "serde & friends");
    assert_eq!(results[0].snippet, "Serialization framework");
    assert_eq!(results[0].metadata["display_url"], "docs.rs/serde");
    assert_eq!(results[0].metadata["language"], "en");
    assert_eq!(results[1].rank, 2);
    assert_eq!(results[1].provider, "bing");
}

#[tokio::test]
async fn test_missing_web_pages_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "_type": "SearchResponse" })))
        .mount(&server)
        .await;

    let results = bing_provider(&server)
        .fetch(&Query::new("zzzz"), 10, Duration::from_secs(5))
        .await
        .unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn test_count_is_capped_per_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("count", "50"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "webPages": { "value": [{ "name": "only", "url": "https://a.com", "snippet": "" }] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = bing_provider(&server)
        .fetch(&Query::new("rust"), 80, Duration::from_secs(5))
        .await
        .unwrap();

    // a short page ends paging
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn test_forbidden_out_of_call_volume_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_string(r#"{"error":{"code":"OutOfCallVolume","message":"quota"}}"#),
        )
        .mount(&server)
        .await;

    let err = bing_provider(&server)
        .fetch(&Query::new("rust"), 10, Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, AdapterError::RateLimited { .. }));
}

#[tokio::test]
async fn test_forbidden_without_quota_reason_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("invalid subscription key"))
        .mount(&server)
        .await;

    let err = bing_provider(&server)
        .fetch(&Query::new("rust"), 10, Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, AdapterError::Unauthorized(_)));
}

#[tokio::test]
async fn test_rate_limited_without_retry_after_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = bing_provider(&server)
        .fetch(&Query::new("rust"), 10, Duration::from_secs(5))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        AdapterError::RateLimited {
            retry_after: Duration::from_secs(1)
        }
    );
}
