// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::query::Query;
use crate::domain::models::search_response::RankingStrategy;
use crate::domain::services::search_service::{QueryInput, SearchRequest};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use validator::{Validate, ValidationError};

/// 查询可以是纯文本，也可以是已分析的查询对象
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum QueryPayload {
    Text(String),
    Structured(Query),
}

impl QueryPayload {
    pub fn text(&self) -> &str {
        match self {
            QueryPayload::Text(text) => text,
            QueryPayload::Structured(query) => &query.text,
        }
    }
}

fn validate_query(query: &QueryPayload) -> Result<(), ValidationError> {
    if query.text().trim().is_empty() {
        let mut err = ValidationError::new("empty_query");
        err.message = Some("Query cannot be empty".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SearchRequestDto {
    #[validate(custom(function = "validate_query"))]
    pub query: QueryPayload,
    #[serde(alias = "limit")]
    #[validate(range(min = 1, message = "num_results must be at least 1"))]
    pub num_results: Option<usize>,
    /// 引擎名称过滤，例如 ["google", "bing"]
    #[serde(alias = "sources")]
    pub providers: Option<Vec<String>>,
    pub strategy: Option<RankingStrategy>,
    #[validate(range(min = 1, message = "timeout_ms must be at least 1"))]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl From<SearchRequestDto> for SearchRequest {
    fn from(dto: SearchRequestDto) -> Self {
        let query = match dto.query {
            QueryPayload::Text(text) => QueryInput::Text(text),
            QueryPayload::Structured(query) => QueryInput::Analyzed(query),
        };
        SearchRequest {
            query,
            num_results: dto.num_results,
            providers: dto.providers,
            strategy: dto.strategy,
            timeout: dto.timeout_ms.map(Duration::from_millis),
            parameters: dto.parameters,
        }
    }
}

/// `GET /v1/search/analyze` 的查询参数
#[derive(Debug, Deserialize, Validate)]
pub struct AnalyzeQueryParams {
    #[validate(length(min = 1, message = "Query cannot be empty"))]
    pub query: String,
}
