// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use crate::domain::models::query::Query;
use crate::domain::models::search_response::{
    DedupStats, RankingStrategy, SearchMetadata, SearchResponse, Timings,
};

use super::dispatcher::DispatchReport;
use super::ranker::RankedResults;

/// 响应的请求级标识
#[derive(Debug, Clone)]
pub struct ResponseContext {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub strategy: RankingStrategy,
}

impl ResponseContext {
    pub fn new(strategy: RankingStrategy) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            strategy,
        }
    }
}

/// 组装搜索响应
///
/// 纯数据转换，不做 I/O。结果 ID 重复或引擎列表为空属于调用方的编程错误。
pub fn assemble(
    query: Query,
    ranked: RankedResults,
    report: &DispatchReport,
    deduplication: DedupStats,
    timings: Timings,
    context: ResponseContext,
) -> SearchResponse {
    debug_assert!(
        {
            let mut seen = HashSet::new();
            ranked.results.iter().all(|r| seen.insert(r.id.as_str()))
        },
        "result ids must be unique"
    );
    debug_assert!(
        ranked.results.iter().all(|r| !r.providers.is_empty()),
        "every result needs at least one provider"
    );

    let mut result_counts = BTreeMap::new();
    let mut provider_latency_ms = BTreeMap::new();
    let mut provider_errors = BTreeMap::new();

    for outcome in &report.outcomes {
        let count = match &outcome.result {
            Ok(results) => results.len(),
            Err(e) => {
                provider_errors.insert(outcome.provider.clone(), e.to_provider_error());
                0
            }
        };
        result_counts.insert(outcome.provider.clone(), count);
        provider_latency_ms.insert(
            outcome.provider.clone(),
            outcome.latency.as_secs_f64() * 1000.0,
        );
    }

    let metadata = SearchMetadata {
        request_id: context.request_id,
        timestamp: context.timestamp,
        version: context.version,
        ranking_strategy: context.strategy,
        timings,
        providers_used: report.providers_used(),
        result_counts,
        provider_latency_ms,
        partial_results: !provider_errors.is_empty(),
        provider_errors,
        total_results: ranked.results.len(),
        deduplication,
        bias: ranked.bias,
    };

    SearchResponse {
        results: ranked.results,
        query,
        metadata,
    }
}
