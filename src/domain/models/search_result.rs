// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 结果内容类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Web,
    Image,
    Video,
    News,
    Document,
    Social,
    Product,
    Other,
}

/// 单个搜索引擎返回的原始结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// 返回该结果的搜索引擎名称
    pub provider: String,
    /// 引擎给出的排名，从 1 开始
    pub rank: u32,
    /// 引擎报告的相关度 (0.0-1.0)，未报告时为 None
    pub relevance: Option<f64>,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub is_ad: bool,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Default for RawResult {
    fn default() -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            snippet: String::new(),
            provider: String::new(),
            rank: 1,
            relevance: None,
            content_type: ContentType::Web,
            is_ad: false,
            metadata: Map::new(),
        }
    }
}

impl RawResult {
    pub fn new(title: String, url: String, snippet: String, provider: String, rank: u32) -> Self {
        Self {
            title,
            url,
            snippet,
            provider,
            rank,
            ..Default::default()
        }
    }
}

/// 某个引擎对合并结果的贡献
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub provider: String,
    /// 该引擎对此资源给出的最佳排名
    pub rank: u32,
    pub relevance: Option<f64>,
}

/// 去重、排序后的规范化结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalResult {
    /// 基于去重键生成的稳定 ID
    pub id: String,
    /// 规范化后的 URL
    pub dedup_key: String,
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// 提供展示字段的引擎
    pub primary_provider: String,
    /// 所有返回过该资源的引擎，按首次出现顺序
    pub providers: Vec<String>,
    pub contributions: Vec<Contribution>,
    pub content_type: ContentType,
    pub is_ad: bool,
    pub metadata: Map<String, Value>,
    /// 最终得分 (0.0-1.0)
    pub score: f64,
}

impl CanonicalResult {
    /// 主引擎给出的排名
    pub fn primary_rank(&self) -> u32 {
        self.contributions
            .iter()
            .find(|c| c.provider == self.primary_provider)
            .map(|c| c.rank)
            .unwrap_or(u32::MAX)
    }

    /// 所有贡献中最好的排名
    pub fn best_rank(&self) -> u32 {
        self.contributions
            .iter()
            .map(|c| c.rank)
            .min()
            .unwrap_or(u32::MAX)
    }

    pub fn contributed_by(&self, provider: &str) -> bool {
        self.providers.iter().any(|p| p == provider)
    }
}
