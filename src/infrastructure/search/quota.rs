// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::search::engine::AdapterError;
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;

/// 单个搜索引擎的请求配额
///
/// 未配置每分钟请求数时不做限制。配额耗尽时不等待，直接返回
/// [`AdapterError::RateLimited`]，由分发器记录为该引擎的失败。
pub struct ProviderQuota {
    limiter: Option<DefaultDirectRateLimiter>,
}

impl ProviderQuota {
    pub fn new(requests_per_minute: Option<u32>) -> Self {
        let limiter = requests_per_minute
            .and_then(NonZeroU32::new)
            .map(|rpm| RateLimiter::direct(Quota::per_minute(rpm)));
        Self { limiter }
    }

    pub fn unlimited() -> Self {
        Self { limiter: None }
    }

    /// 消耗一次请求配额
    pub fn check(&self) -> Result<(), AdapterError> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };
        limiter.check().map_err(|not_until| AdapterError::RateLimited {
            retry_after: not_until.wait_time_from(DefaultClock::default().now()),
        })
    }
}

impl std::fmt::Debug for ProviderQuota {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderQuota")
            .field("limited", &self.limiter.is_some())
            .finish()
    }
}
