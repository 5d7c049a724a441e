// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::domain::models::provider::ProviderConfig;
use crate::domain::models::query::Query;
use crate::domain::models::search_result::RawResult;
use crate::domain::search::engine::{AdapterError, SearchProvider};
use crate::infrastructure::observability::metrics;

/// 已配置的引擎：配置与适配器
#[derive(Clone)]
pub struct ProviderHandle {
    pub config: ProviderConfig,
    pub adapter: Arc<dyn SearchProvider>,
}

impl ProviderHandle {
    pub fn new(config: ProviderConfig, adapter: Arc<dyn SearchProvider>) -> Self {
        Self { config, adapter }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }
}

impl std::fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("config", &self.config)
            .field("adapter", &self.adapter.name())
            .finish()
    }
}

/// 单个引擎的调用结果
#[derive(Debug, Clone)]
pub struct ProviderOutcome {
    pub provider: String,
    pub result: Result<Vec<RawResult>, AdapterError>,
    pub latency: Duration,
}

/// 一次分发的完整报告，按引擎优先级排列
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<ProviderOutcome>,
    pub elapsed: Duration,
}

impl DispatchReport {
    /// 参与本次分发的引擎
    pub fn providers_used(&self) -> Vec<String> {
        self.outcomes.iter().map(|o| o.provider.clone()).collect()
    }

    /// 成功返回的引擎及其结果
    pub fn successes(&self) -> impl Iterator<Item = (&str, &[RawResult])> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(results) => Some((o.provider.as_str(), results.as_slice())),
            Err(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &AdapterError)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(_) => None,
            Err(e) => Some((o.provider.as_str(), e)),
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    #[error("No enabled search providers")]
    NoProviders,
}

/// 并发分发器
///
/// 每个启用的引擎一个 tokio 任务，全部完成或到达截止时间即返回。
/// 截止时未完成的任务被中止并记为 [`AdapterError::Timeout`]，
/// 任务 panic 记为 [`AdapterError::Unavailable`]。
#[derive(Debug, Default, Clone)]
pub struct FanOutDispatcher;

impl FanOutDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// 向所有启用的引擎分发查询
    ///
    /// # 参数
    ///
    /// * `query` - 已分析的查询，只读共享给各任务
    /// * `providers` - 按优先级排列的引擎
    /// * `num_results` - 每个引擎最多获取的结果数
    /// * `timeout` - 整体截止时间
    ///
    /// # 返回值
    ///
    /// 没有启用的引擎时返回 [`DispatchError::NoProviders`]，此时不会发起任何调用
    pub async fn dispatch(
        &self,
        query: Arc<Query>,
        providers: &[ProviderHandle],
        num_results: usize,
        timeout: Duration,
    ) -> Result<DispatchReport, DispatchError> {
        let active: Vec<&ProviderHandle> = providers.iter().filter(|p| p.config.enabled).collect();
        if active.is_empty() {
            return Err(DispatchError::NoProviders);
        }

        let started = Instant::now();
        let deadline = started + timeout;
        let mut tasks = JoinSet::new();

        for (index, handle) in active.iter().enumerate() {
            let adapter = handle.adapter.clone();
            let query = query.clone();
            let max_results = handle
                .config
                .max_results
                .map_or(num_results, |cap| cap.min(num_results));

            tasks.spawn(async move {
                let call_started = Instant::now();
                let call = AssertUnwindSafe(adapter.fetch(&query, max_results, timeout)).catch_unwind();
                let result = match tokio::time::timeout(timeout, call).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(_)) => Err(AdapterError::Unavailable(
                        "provider task panicked".to_string(),
                    )),
                    Err(_) => Err(AdapterError::Timeout),
                };
                (index, result, call_started.elapsed())
            });
        }

        let mut slots: Vec<Option<ProviderOutcome>> = active.iter().map(|_| None).collect();

        loop {
            match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((index, result, latency)))) => {
                    slots[index] = Some(ProviderOutcome {
                        provider: active[index].name().to_string(),
                        result,
                        latency,
                    });
                }
                Ok(Some(Err(e))) => {
                    warn!("Provider task failed to join: {}", e);
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        "Dispatch deadline of {}ms reached with {} provider(s) outstanding",
                        timeout.as_millis(),
                        tasks.len()
                    );
                    tasks.abort_all();
                    break;
                }
            }
        }

        let elapsed = started.elapsed();
        let outcomes: Vec<ProviderOutcome> = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| ProviderOutcome {
                    provider: active[index].name().to_string(),
                    result: Err(AdapterError::Timeout),
                    latency: elapsed,
                })
            })
            .collect();

        for outcome in &outcomes {
            let label = match &outcome.result {
                Ok(results) => {
                    info!(
                        "Provider {} returned {} results in {}ms",
                        outcome.provider,
                        results.len(),
                        outcome.latency.as_millis()
                    );
                    "ok"
                }
                Err(e) => {
                    warn!("Provider {} failed: {}", outcome.provider, e);
                    e.kind()
                }
            };
            metrics::record_provider_call(&outcome.provider, label, outcome.latency);
        }

        Ok(DispatchReport { outcomes, elapsed })
    }
}
