// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::query::Query;
use super::search_result::CanonicalResult;

/// 排序策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RankingStrategy {
    /// 加权打分
    #[default]
    Weighted,
    /// 按引擎轮流交错
    Interleaved,
}

impl RankingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weighted => "weighted",
            Self::Interleaved => "interleaved",
        }
    }
}

/// 去重统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DedupStats {
    /// 去重前的原始结果数
    pub input_count: usize,
    /// 去重后的唯一结果数
    pub unique_count: usize,
    /// 被合并掉的重复结果数
    pub duplicates_removed: usize,
    /// 被多个引擎同时返回的结果数
    pub corroborated_count: usize,
}

/// 多样性与偏差统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BiasStats {
    pub total: usize,
    /// 每个主引擎的结果占比
    pub provider_share: BTreeMap<String, f64>,
    /// 广告结果占比
    pub ad_fraction: f64,
    /// 结果最多的主引擎
    pub majority_provider: Option<String>,
    /// 主引擎不是多数引擎的结果数
    pub minority_count: usize,
    /// 被多个引擎佐证的结果占比
    pub corroborated_fraction: f64,
}

/// 各阶段耗时（毫秒）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timings {
    pub analysis_ms: f64,
    pub dispatch_ms: f64,
    pub dedup_ms: f64,
    pub ranking_ms: f64,
    pub total_ms: f64,
}

/// 单个引擎的失败信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderError {
    /// unauthorized / rate_limited / unavailable / timeout
    pub kind: String,
    pub message: String,
    /// 限流时建议的重试等待（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
}

/// 搜索元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMetadata {
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub ranking_strategy: RankingStrategy,
    pub timings: Timings,
    /// 本次请求实际调用的引擎，按优先级排列
    pub providers_used: Vec<String>,
    /// 每个引擎返回的原始结果数
    pub result_counts: BTreeMap<String, usize>,
    /// 每个引擎的延迟（毫秒）
    pub provider_latency_ms: BTreeMap<String, f64>,
    pub provider_errors: BTreeMap<String, ProviderError>,
    /// 部分引擎失败时为 true，调用方可换一组引擎重试
    pub partial_results: bool,
    pub total_results: usize,
    pub deduplication: DedupStats,
    pub bias: BiasStats,
}

/// 搜索响应
///
/// `results` 的数组顺序即排名顺序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<CanonicalResult>,
    pub query: Query,
    pub metadata: SearchMetadata,
}
