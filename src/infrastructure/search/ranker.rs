// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::provider::ProviderConfig;
use crate::domain::models::search_response::{BiasStats, RankingStrategy};
use crate::domain::models::search_result::{CanonicalResult, Contribution};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// 加权打分参数
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// 引擎未直接报告相关度时，从结果元数据中读取相关度的键
    pub relevance_key: String,
    /// 位置衰减系数：`1 / (1 + decay * position)`
    pub position_decay: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            relevance_key: "relevance_score".to_string(),
            position_decay: 1.0,
        }
    }
}

/// 排序结果与偏差统计
#[derive(Debug, Clone, Default)]
pub struct RankedResults {
    pub results: Vec<CanonicalResult>,
    pub bias: BiasStats,
}

/// 排序器
///
/// 支持加权与交错两种策略，偏差统计在输出结果的同一遍中累计
#[derive(Debug, Clone, Default)]
pub struct Ranker {
    scoring: ScoringConfig,
}

impl Ranker {
    pub fn new(scoring: ScoringConfig) -> Self {
        Self { scoring }
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// 对去重后的结果排序
    ///
    /// # 参数
    ///
    /// * `results` - 去重后的结果
    /// * `strategy` - 排序策略
    /// * `providers` - 参与本次搜索的引擎，顺序即优先级
    /// * `limit` - 最多返回的结果数
    pub fn rank(
        &self,
        results: Vec<CanonicalResult>,
        strategy: RankingStrategy,
        providers: &[ProviderConfig],
        limit: usize,
    ) -> RankedResults {
        match strategy {
            RankingStrategy::Weighted => self.rank_weighted(results, providers, limit),
            RankingStrategy::Interleaved => rank_interleaved(results, providers, limit),
        }
    }

    fn rank_weighted(
        &self,
        mut results: Vec<CanonicalResult>,
        providers: &[ProviderConfig],
        limit: usize,
    ) -> RankedResults {
        let weights: HashMap<&str, f64> = providers
            .iter()
            .map(|p| (p.name.as_str(), p.effective_weight()))
            .collect();
        let total_weight: f64 = weights.values().sum();

        for result in results.iter_mut() {
            let raw: f64 = result
                .contributions
                .iter()
                .map(|c| {
                    weights.get(c.provider.as_str()).copied().unwrap_or(0.0)
                        * self.relevance(result, c)
                })
                .sum();
            result.score = if total_weight > 0.0 {
                (raw / total_weight).clamp(0.0, 1.0)
            } else {
                0.0
            };
        }

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.best_rank().cmp(&b.best_rank()))
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut bias = BiasAccumulator::new(providers);
        let ranked: Vec<CanonicalResult> = results
            .into_iter()
            .take(limit)
            .inspect(|r| bias.observe(r))
            .collect();

        RankedResults {
            results: ranked,
            bias: bias.finish(),
        }
    }

    /// 贡献的相关度，范围 [0, 1]
    fn relevance(&self, result: &CanonicalResult, contribution: &Contribution) -> f64 {
        let reported = contribution.relevance.or_else(|| {
            if contribution.provider == result.primary_provider {
                result
                    .metadata
                    .get(&self.scoring.relevance_key)
                    .and_then(Value::as_f64)
            } else {
                None
            }
        });

        match reported {
            Some(value) if value.is_finite() => value.clamp(0.0, 1.0),
            _ => {
                let position = contribution.rank.saturating_sub(1) as f64;
                let decay = self.scoring.position_decay.max(0.0);
                1.0 / (1.0 + decay * position)
            }
        }
    }
}

/// 按主引擎轮流取结果
fn rank_interleaved(
    results: Vec<CanonicalResult>,
    providers: &[ProviderConfig],
    limit: usize,
) -> RankedResults {
    let mut order: Vec<String> = providers.iter().map(|p| p.name.clone()).collect();
    let mut queues: HashMap<String, Vec<CanonicalResult>> = HashMap::new();
    for result in results {
        if !order.contains(&result.primary_provider) {
            order.push(result.primary_provider.clone());
        }
        queues
            .entry(result.primary_provider.clone())
            .or_default()
            .push(result);
    }

    let mut queues: Vec<VecDeque<CanonicalResult>> = order
        .iter()
        .map(|name| {
            let mut queue = queues.remove(name).unwrap_or_default();
            queue.sort_by(|a, b| {
                a.primary_rank()
                    .cmp(&b.primary_rank())
                    .then_with(|| a.id.cmp(&b.id))
            });
            VecDeque::from(queue)
        })
        .collect();

    let mut bias = BiasAccumulator::new(providers);
    let mut ranked = Vec::new();
    'rounds: while queues.iter().any(|q| !q.is_empty()) {
        for queue in queues.iter_mut() {
            if ranked.len() >= limit {
                break 'rounds;
            }
            if let Some(result) = queue.pop_front() {
                bias.observe(&result);
                ranked.push(result);
            }
        }
    }

    let n = ranked.len();
    for (i, result) in ranked.iter_mut().enumerate() {
        result.score = (n - i) as f64 / n as f64;
    }

    RankedResults {
        results: ranked,
        bias: bias.finish(),
    }
}

/// 偏差统计累加器
struct BiasAccumulator {
    priority: Vec<String>,
    counts: HashMap<String, usize>,
    total: usize,
    ads: usize,
    corroborated: usize,
}

impl BiasAccumulator {
    fn new(providers: &[ProviderConfig]) -> Self {
        Self {
            priority: providers.iter().map(|p| p.name.clone()).collect(),
            counts: HashMap::new(),
            total: 0,
            ads: 0,
            corroborated: 0,
        }
    }

    fn observe(&mut self, result: &CanonicalResult) {
        self.total += 1;
        if result.is_ad {
            self.ads += 1;
        }
        if result.providers.len() > 1 {
            self.corroborated += 1;
        }
        *self
            .counts
            .entry(result.primary_provider.clone())
            .or_default() += 1;
    }

    fn priority_of(&self, provider: &str) -> usize {
        self.priority
            .iter()
            .position(|p| p == provider)
            .unwrap_or(usize::MAX)
    }

    fn finish(self) -> BiasStats {
        if self.total == 0 {
            return BiasStats::default();
        }

        let total = self.total as f64;
        let majority = self
            .counts
            .iter()
            .max_by(|(a_name, a_count), (b_name, b_count)| {
                a_count.cmp(b_count).then_with(|| {
                    // Higher priority (lower index) wins ties.
                    self.priority_of(b_name)
                        .cmp(&self.priority_of(a_name))
                        .then_with(|| b_name.cmp(a_name))
                })
            })
            .map(|(name, count)| (name.clone(), *count));

        let provider_share: BTreeMap<String, f64> = self
            .counts
            .iter()
            .map(|(name, count)| (name.clone(), *count as f64 / total))
            .collect();

        let (majority_provider, majority_count) = match majority {
            Some((name, count)) => (Some(name), count),
            None => (None, 0),
        };

        BiasStats {
            total: self.total,
            provider_share,
            ad_fraction: self.ads as f64 / total,
            majority_provider,
            minority_count: self.total - majority_count,
            corroborated_fraction: self.corroborated as f64 / total,
        }
    }
}
