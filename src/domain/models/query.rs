// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// 查询意图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchIntent {
    /// 获取信息
    Informational,
    /// 查找特定站点
    Navigational,
    /// 购买或下载
    Transactional,
    /// 商品调研
    Commercial,
    /// 本地服务
    Local,
    /// 图片或视频
    Visual,
    /// 新闻资讯
    News,
    /// 无法确定
    #[default]
    Undefined,
}

impl SearchIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Informational => "informational",
            Self::Navigational => "navigational",
            Self::Transactional => "transactional",
            Self::Commercial => "commercial",
            Self::Local => "local",
            Self::Visual => "visual",
            Self::News => "news",
            Self::Undefined => "undefined",
        }
    }
}

/// 查询地域范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchLocality {
    /// 无地域限制
    Global,
    /// 附近
    Local,
    /// 区域
    Regional,
    /// 国家
    National,
    /// 无法确定
    #[default]
    Undefined,
}

impl SearchLocality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Local => "local",
            Self::Regional => "regional",
            Self::National => "national",
            Self::Undefined => "undefined",
        }
    }
}

/// 规范化查询
///
/// 由查询分析器生成，之后整个请求处理链路只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// 原始查询文本
    pub text: String,
    /// 预处理后的文本（小写、去除操作符）
    #[serde(default)]
    pub processed_text: String,
    #[serde(default)]
    pub intent: SearchIntent,
    #[serde(default)]
    pub locality: SearchLocality,
    /// ISO 639-1 语言代码
    #[serde(default = "default_language")]
    pub language: String,
    /// 查询参数（`site:`、`lang:` 等操作符也会写入这里）
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// 调用方提供的上下文
    #[serde(default)]
    pub context: Map<String, Value>,
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_language() -> String {
    "en".to_string()
}

impl Query {
    /// 创建未经分析的查询
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            processed_text: text.trim().to_lowercase(),
            text,
            intent: SearchIntent::Undefined,
            locality: SearchLocality::Undefined,
            language: default_language(),
            parameters: Map::new(),
            context: Map::new(),
            id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    /// 提供给搜索引擎的查询文本
    ///
    /// 优先使用预处理后的文本，为空时回退到原始文本
    pub fn search_text(&self) -> &str {
        if self.processed_text.trim().is_empty() {
            self.text.trim()
        } else {
            self.processed_text.as_str()
        }
    }

    /// 读取字符串类型的参数
    pub fn parameter_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(Value::as_str)
    }
}
