// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::search::engine::AdapterError;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use std::time::Duration;

/// 未提供 Retry-After 时的默认等待
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// 403 响应体中表示配额耗尽而非凭证错误的原因
const QUOTA_REASONS: &[&str] = &[
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "quotaExceeded",
    "dailyLimitExceeded",
    "OutOfCallVolume",
];

/// 解析 Retry-After（秒数形式）
pub fn retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

/// 将 HTTP 状态码映射为适配器错误
///
/// - 401/403：凭证错误；403 响应体带配额原因时视为限流
/// - 429：限流，遵循 Retry-After
/// - 其他非成功状态：引擎不可用
pub fn classify(status: StatusCode, headers: &HeaderMap, body: &str, provider: &str) -> AdapterError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => AdapterError::RateLimited {
            retry_after: retry_after(headers),
        },
        StatusCode::FORBIDDEN if QUOTA_REASONS.iter().any(|r| body.contains(r)) => {
            AdapterError::RateLimited {
                retry_after: retry_after(headers),
            }
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AdapterError::Unauthorized(format!("{} rejected credentials ({})", provider, status))
        }
        _ => AdapterError::Unavailable(format!("{} returned status {}", provider, status)),
    }
}

/// 成功状态原样返回响应，否则读取响应体并映射错误
pub async fn error_for_status(response: Response, provider: &str) -> Result<Response, AdapterError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let headers = response.headers().clone();
    let body = response.text().await.unwrap_or_default();
    Err(classify(status, &headers, &body, provider))
}
