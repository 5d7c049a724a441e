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

use super::http_status::error_for_status;
use super::quota::ProviderQuota;

/// Custom Search API 允许的最大 start + num
const GOOGLE_RESULT_CEILING: usize = 100;

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleItem {
    #[serde(default)]
    title: String,
    link: Option<String>,
    #[serde(default)]
    snippet: String,
    display_link: Option<String>,
    mime: Option<String>,
    file_format: Option<String>,
}

/// Google Custom Search JSON API 适配器
///
/// 凭证：`credential` 引用解析为 API Key，`params.cx` 为搜索引擎 ID
/// （先按凭证引用解析，解析不到时按字面值使用）
pub struct GoogleSearchProvider {
    name: String,
    endpoint: String,
    credential: Option<String>,
    cx: Option<String>,
    client: Client,
    credentials: Arc<dyn CredentialStore>,
    quota: ProviderQuota,
}

impl GoogleSearchProvider {
    pub fn new(
        config: &ProviderConfig,
        client: Client,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            name: config.name.clone(),
            endpoint: config.endpoint().to_string(),
            credential: config.credential.clone(),
            cx: config.params.get("cx").cloned(),
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

    fn search_engine_id(&self) -> Result<String, AdapterError> {
        let reference = self
            .cx
            .as_deref()
            .map(str::trim)
            .filter(|cx| !cx.is_empty())
            .ok_or_else(|| {
                AdapterError::Unauthorized(format!("{}: missing search engine id (cx)", self.name))
            })?;
        Ok(self
            .credentials
            .resolve(reference)
            .unwrap_or_else(|| reference.to_string()))
    }

    fn build_params(&self, query: &Query, key: &str, cx: &str, start: usize, num: usize) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("key", key.to_string()),
            ("cx", cx.to_string()),
            ("q", query.search_text().to_string()),
            ("num", num.to_string()),
            ("start", start.to_string()),
        ];

        if !query.language.is_empty() {
            params.push(("hl", query.language.clone()));
            params.push(("lr", format!("lang_{}", query.language)));
        }
        if let Some(site) = query.parameter_str("site") {
            params.push(("siteSearch", site.to_string()));
            params.push(("siteSearchFilter", "i".to_string()));
        }
        if let Some(filetype) = query.parameter_str("filetype") {
            params.push(("fileType", filetype.to_string()));
        }
        params
    }

    async fn fetch_page(
        &self,
        params: &[(&'static str, String)],
        timeout: Duration,
    ) -> Result<Vec<GoogleItem>, AdapterError> {
        self.quota.check()?;

        let response = self
            .client
            .get(&self.endpoint)
            .query(params)
            .timeout(timeout)
            .send()
            .await?;
        let response = error_for_status(response, &self.name).await?;
        let body: GoogleResponse = response.json().await?;
        Ok(body.items)
    }

    fn to_raw_result(&self, item: GoogleItem, rank: u32) -> Option<RawResult> {
        let url = item.link?;
        let mut metadata = Map::new();
        if let Some(display_link) = item.display_link {
            metadata.insert("display_link".to_string(), Value::String(display_link));
        }
        if let Some(format) = &item.file_format {
            metadata.insert("file_format".to_string(), Value::String(format.clone()));
        }

        let content_type = if item.mime.is_some() || item.file_format.is_some() {
            ContentType::Document
        } else {
            ContentType::Web
        };

        Some(RawResult {
            title: html_escape::decode_html_entities(item.title.trim()).into_owned(),
            url,
            snippet: clean_snippet(&item.snippet),
            provider: self.name.clone(),
            rank,
            relevance: None,
            content_type,
            is_ad: false,
            metadata,
        })
    }
}

/// 解码 HTML 实体并合并空白
pub(crate) fn clean_snippet(snippet: &str) -> String {
    html_escape::decode_html_entities(snippet)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl SearchProvider for GoogleSearchProvider {
    async fn fetch(
        &self,
        query: &Query,
        max_results: usize,
        timeout: Duration,
    ) -> Result<Vec<RawResult>, AdapterError> {
        let key = self.api_key()?;
        let cx = self.search_engine_id()?;

        let wanted = max_results.min(GOOGLE_RESULT_CEILING);
        let deadline = Instant::now() + timeout;
        let mut results: Vec<RawResult> = Vec::with_capacity(wanted);
        let mut start = 1usize;

        while results.len() < wanted {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                if results.is_empty() {
                    return Err(AdapterError::Timeout);
                }
                break;
            }

            let num = (wanted - results.len())
                .min(ProviderKind::Google.request_cap())
                .min(GOOGLE_RESULT_CEILING + 1 - start);
            let params = self.build_params(query, &key, &cx, start, num);
            debug!("Google request start={} num={}", start, num);

            let items = match self.fetch_page(&params, remaining).await {
                Ok(items) => items,
                Err(e) if results.is_empty() => return Err(e),
                Err(e) => {
                    warn!("Google paging stopped after {} results: {}", results.len(), e);
                    break;
                }
            };

            let page_len = items.len();
            for item in items {
                if results.len() >= wanted {
                    break;
                }
                let rank = results.len() as u32 + 1;
                if let Some(result) = self.to_raw_result(item, rank) {
                    results.push(result);
                }
            }

            start += page_len;
            if page_len < num || start > GOOGLE_RESULT_CEILING {
                break;
            }
        }

        info!("Google returned {} results", results.len());
        Ok(results)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
