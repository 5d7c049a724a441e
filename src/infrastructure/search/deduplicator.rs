// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::search_response::DedupStats;
use crate::domain::models::search_result::{CanonicalResult, Contribution, RawResult};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::debug;

use super::url_normalize::normalize_url;

/// 去重结果
#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    /// 合并后的结果，顺序为首次出现顺序（尚未排序）
    pub results: Vec<CanonicalResult>,
    pub stats: DedupStats,
}

/// 结果去重器
///
/// 以规范化 URL 作为去重键合并各引擎返回的结果。
/// 合并规则：
/// - 展示字段取自最先出现的结果（引擎优先级优先，其次为排名）
/// - 摘要取较长者
/// - 任一来源标记为广告即视为广告
/// - 引擎列表取并集，按首次出现顺序排列
#[derive(Debug, Default, Clone)]
pub struct Deduplicator;

impl Deduplicator {
    pub fn new() -> Self {
        Self
    }

    /// 合并各引擎的结果
    ///
    /// # 参数
    ///
    /// * `per_provider` - 按引擎优先级排列的 (引擎名称, 原始结果) 列表
    pub fn dedupe<'a, I>(&self, per_provider: I) -> DedupOutcome
    where
        I: IntoIterator<Item = (&'a str, &'a [RawResult])>,
    {
        let mut results: Vec<CanonicalResult> = Vec::new();
        let mut index_by_key: HashMap<String, usize> = HashMap::new();
        let mut input_count = 0usize;

        for (provider, raw_results) in per_provider {
            let mut ordered: Vec<&RawResult> = raw_results.iter().collect();
            ordered.sort_by_key(|r| r.rank);

            for raw in ordered {
                if raw.url.trim().is_empty() {
                    debug!(provider = provider, "skipping result without url");
                    continue;
                }
                input_count += 1;

                let key = normalize_url(&raw.url);
                match index_by_key.get(&key) {
                    Some(&index) => merge_into(&mut results[index], provider, raw),
                    None => {
                        index_by_key.insert(key.clone(), results.len());
                        results.push(new_canonical(key, provider, raw));
                    }
                }
            }
        }

        let unique_count = results.len();
        let corroborated_count = results.iter().filter(|r| r.providers.len() > 1).count();
        let stats = DedupStats {
            input_count,
            unique_count,
            duplicates_removed: input_count - unique_count,
            corroborated_count,
        };

        debug!(
            input = stats.input_count,
            unique = stats.unique_count,
            corroborated = stats.corroborated_count,
            "deduplication finished"
        );

        DedupOutcome { results, stats }
    }
}

/// 由去重键生成稳定的结果 ID
pub fn result_id(dedup_key: &str) -> String {
    hex::encode(Sha256::digest(dedup_key.as_bytes()))
}

fn new_canonical(dedup_key: String, provider: &str, raw: &RawResult) -> CanonicalResult {
    CanonicalResult {
        id: result_id(&dedup_key),
        dedup_key,
        title: raw.title.clone(),
        url: raw.url.clone(),
        snippet: raw.snippet.clone(),
        primary_provider: provider.to_string(),
        providers: vec![provider.to_string()],
        contributions: vec![Contribution {
            provider: provider.to_string(),
            rank: raw.rank,
            relevance: raw.relevance,
        }],
        content_type: raw.content_type,
        is_ad: raw.is_ad,
        metadata: raw.metadata.clone(),
        score: 0.0,
    }
}

fn merge_into(existing: &mut CanonicalResult, provider: &str, raw: &RawResult) {
    if raw.snippet.chars().count() > existing.snippet.chars().count() {
        existing.snippet = raw.snippet.clone();
    }
    existing.is_ad |= raw.is_ad;

    for (key, value) in &raw.metadata {
        if !existing.metadata.contains_key(key) {
            existing.metadata.insert(key.clone(), value.clone());
        }
    }

    match existing
        .contributions
        .iter_mut()
        .find(|c| c.provider == provider)
    {
        // Same provider listed the resource twice; results arrive rank-ordered.
        Some(contribution) => {
            if contribution.relevance.is_none() {
                contribution.relevance = raw.relevance;
            }
        }
        None => {
            existing.providers.push(provider.to_string());
            existing.contributions.push(Contribution {
                provider: provider.to_string(),
                rank: raw.rank,
                relevance: raw.relevance,
            });
        }
    }
}
