// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 搜索引擎实现类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Custom Search JSON API
    Google,
    /// Bing Web Search API v7
    Bing,
}

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Bing => "bing",
        }
    }

    /// 官方 API 地址
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Google => "https://www.googleapis.com/customsearch/v1",
            Self::Bing => "https://api.bing.microsoft.com/v7.0/search",
        }
    }

    /// 单次请求允许的最大结果数
    pub fn request_cap(&self) -> usize {
        match self {
            Self::Google => 10,
            Self::Bing => 50,
        }
    }
}

/// 搜索引擎配置
///
/// 启动时加载，请求处理期间只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// 引擎名称，同时作为结果归属标识
    pub name: String,
    pub kind: ProviderKind,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// 排序权重（非负）
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// API 地址，未配置时使用官方地址
    #[serde(default)]
    pub endpoint: Option<String>,
    /// 凭证引用，通过凭证存储解析为实际 API Key
    #[serde(default)]
    pub credential: Option<String>,
    /// 引擎特定参数，例如 Google 的 `cx`
    #[serde(default)]
    pub params: HashMap<String, String>,
    /// 单个请求最多获取的结果数
    #[serde(default)]
    pub max_results: Option<usize>,
    /// 每分钟请求配额
    #[serde(default)]
    pub requests_per_minute: Option<u32>,
}

fn default_enabled() -> bool {
    true
}

fn default_weight() -> f64 {
    1.0
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, kind: ProviderKind) -> Self {
        Self {
            name: name.into(),
            kind,
            enabled: true,
            weight: 1.0,
            endpoint: None,
            credential: None,
            params: HashMap::new(),
            max_results: None,
            requests_per_minute: None,
        }
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.kind.default_endpoint())
    }

    /// 权重，负数与 NaN 按 0 处理
    pub fn effective_weight(&self) -> f64 {
        if self.weight.is_finite() && self.weight > 0.0 {
            self.weight
        } else {
            0.0
        }
    }
}
