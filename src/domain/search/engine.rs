// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::query::Query;
use crate::domain::models::search_response::ProviderError;
use crate::domain::models::search_result::RawResult;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 单个搜索引擎的错误
///
/// 这些错误只影响对应引擎，由分发器就地记录，不会中断整个搜索
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdapterError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Rate limit exceeded, retry after {}ms", retry_after.as_millis())]
    RateLimited { retry_after: Duration },
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
    #[error("Timeout")]
    Timeout,
}

impl AdapterError {
    /// 错误类别，用于响应元数据和指标标签
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::Unauthorized(_) => "unauthorized",
            AdapterError::RateLimited { .. } => "rate_limited",
            AdapterError::Unavailable(_) => "unavailable",
            AdapterError::Timeout => "timeout",
        }
    }

    /// 判断错误是否可重试
    pub fn is_retryable(&self) -> bool {
        !matches!(self, AdapterError::Unauthorized(_))
    }

    pub fn to_provider_error(&self) -> ProviderError {
        ProviderError {
            kind: self.kind().to_string(),
            message: self.to_string(),
            retry_after_ms: match self {
                AdapterError::RateLimited { retry_after } => Some(retry_after.as_millis() as u64),
                _ => None,
            },
        }
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout
        } else {
            AdapterError::Unavailable(err.to_string())
        }
    }
}

/// 搜索引擎适配器
///
/// 每个实现负责：
/// - 将规范化查询转换为引擎请求
/// - 在给定超时内返回（部分结果或超时错误）
/// - 把引擎响应规范化为 [`RawResult`]
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// 获取最多 `max_results` 条排名结果
    async fn fetch(
        &self,
        query: &Query,
        max_results: usize,
        timeout: Duration,
    ) -> Result<Vec<RawResult>, AdapterError>;

    /// Get the name of the search engine
    fn name(&self) -> &str;
}
