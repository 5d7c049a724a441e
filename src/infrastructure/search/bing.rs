// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::provider::{ProviderConfig, ProviderKind};
use crate::domain::models::query::Query;
use crate::domain::models::search_result::{ContentType, RawResult};
use crate::domain::search::credentials::CredentialStore;
use crate::domain::search::engine::{AdapterError, SearchProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::google::clean_snippet;
use super::http_status::error_for_status;
use super::quota::ProviderQuota;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingResponse {
    web_pages: Option<BingWebPages>,
}

#[derive(Debug, Deserialize)]
struct BingWebPages {
    #[serde(default)]
    value: Vec<BingWebPage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingWebPage {
    #[serde(default)]
    name: String,
    url: Option<String>,
    #[serde(default)]
    snippet: String,
    display_url: Option<String>,
    date_last_crawled: Option<String>,
    language: Option<String>,
}

/// Bing Web Search v7 适配器
///
/// API Key 通过 `Ocp-Apim-Subscription-Key` 请求头发送。
/// `site:` 与 `filetype:` 操作符保留在查询文本中交给 Bing 处理。
pub struct BingSearchProvider {
    name: String,
    endpoint: String,
    credential: Option<String>,
    client: Client,
    credentials: Arc<dyn CredentialStore>,
    quota: ProviderQuota,
}

impl BingSearchProvider {
    pub fn new(
        config: &ProviderConfig,
        client: Client,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            name: config.name.clone(),
            endpoint: config.endpoint().to_string(),
            credential: config.credential.clone(),
            client,
            credentials,
            quota: ProviderQuota::new(config.requests_per_minute),
        }
    }

    fn api_key(&self) -> Result<String, AdapterError> {
        self.credential
            .as_deref()
            .and_then(|reference| self.credentials.resolve(reference))
            .ok_or_else(|| AdapterError::Unauthorized(format!("{}: missing API key", self.name)))
    }

    /// 拼接查询文本，将操作符还原到 q 中
    fn query_text(query: &Query) -> String {
        let mut q = query.search_text().to_string();
        if let Some(site) = query.parameter_str("site") {
            q.push_str(&format!(" site:{}", site));
        }
        if let Some(filetype) = query.parameter_str("filetype") {
            q.push_str(&format!(" filetype:{}", filetype));
        }
        q.trim().to_string()
    }

    async fn fetch_page(
        &self,
        key: &str,
        params: &[(&'static str, String)],
        timeout: Duration,
    ) -> Result<Vec<BingWebPage>, AdapterError> {
        self.quota.check()?;

        let response = self
            .client
            .get(&self.endpoint)
            .header(SUBSCRIPTION_KEY_HEADER, key)
            .query(params)
            .timeout(timeout)
            .send()
            .await?;
        let response = error_for_status(response, &self.name).await?;
        let body: BingResponse = response.json().await?;
        Ok(body.web_pages.map(|pages| pages.value).unwrap_or_default())
    }

    fn to_raw_result(&self, page: BingWebPage, rank: u32) -> Option<RawResult> {
        let url = page.url?;
        let mut metadata = Map::new();
        if let Some(display_url) = page.display_url {
            metadata.insert("display_url".to_string(), Value::String(display_url));
        }
        if let Some(crawled) = page.date_last_crawled {
            metadata.insert("date_last_crawled".to_string(), Value::String(crawled));
        }
        if let Some(language) = page.language {
            metadata.insert("language".to_string(), Value::String(language));
        }

        Some(RawResult {
            title: html_escape::decode_html_entities(page.name.trim()).into_owned(),
            url,
            snippet: clean_snippet(&page.snippet),
            provider: self.name.clone(),
            rank,
            relevance: None,
            content_type: ContentType::Web,
            is_ad: false,
            metadata,
        })
    }
}

#[async_trait]
impl SearchProvider for BingSearchProvider {
    async fn fetch(
        &self,
        query: &Query,
        max_results: usize,
        timeout: Duration,
    ) -> Result<Vec<RawResult>, AdapterError> {
        let key = self.api_key()?;
        let q = Self::query_text(query);
        let deadline = Instant::now() + timeout;
        let mut results: Vec<RawResult> = Vec::with_capacity(max_results);
        let mut offset = 0usize;

        while results.len() < max_results {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                if results.is_empty() {
                    return Err(AdapterError::Timeout);
                }
                break;
            }

            let count = (max_results - results.len()).min(ProviderKind::Bing.request_cap());
            let mut params = vec![
                ("q", q.clone()),
                ("count", count.to_string()),
                ("offset", offset.to_string()),
                ("textDecorations", "false".to_string()),
            ];
            if !query.language.is_empty() {
                params.push(("setLang", query.language.clone()));
            }
            debug!("Bing request offset={} count={}", offset, count);

            let pages = match self.fetch_page(&key, &params, remaining).await {
                Ok(pages) => pages,
                Err(e) if results.is_empty() => return Err(e),
                Err(e) => {
                    warn!("Bing paging stopped after {} results: {}", results.len(), e);
                    break;
                }
            };

            let page_len = pages.len();
            for page in pages {
                if results.len() >= max_results {
                    break;
                }
                let rank = results.len() as u32 + 1;
                if let Some(result) = self.to_raw_result(page, rank) {
                    results.push(result);
                }
            }

            offset += page_len;
            if page_len < count {
                break;
            }
        }

        info!("Bing returned {} results", results.len());
        Ok(results)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
