// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::provider::ProviderConfig;
use crate::domain::models::search_response::RankingStrategy;
use crate::infrastructure::search::ranker::ScoringConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含服务器、日志、搜索管线、搜索引擎和指标等配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 日志配置
    pub logging: LoggingSettings,
    /// 搜索管线配置
    pub search: SearchSettings,
    /// 搜索引擎列表，顺序即优先级
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器主机地址
    pub host: String,
    /// 服务器端口
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// 未设置 RUST_LOG 时使用的过滤级别
    pub level: String,
    /// 是否输出 JSON 格式日志
    pub json: bool,
}

/// 搜索管线配置
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    pub default_num_results: usize,
    pub max_num_results: usize,
    /// 默认整体超时（毫秒）
    pub default_timeout_ms: u64,
    /// 请求可指定的最大超时（毫秒）
    pub max_timeout_ms: u64,
    pub default_strategy: RankingStrategy,
    pub relevance_key: String,
    pub position_decay: f64,
}

impl SearchSettings {
    /// 请求超时，未指定时取默认值，超出上限时截断
    pub fn effective_timeout(&self, requested: Option<Duration>) -> Duration {
        let max = Duration::from_millis(self.max_timeout_ms);
        requested
            .unwrap_or_else(|| Duration::from_millis(self.default_timeout_ms))
            .min(max)
    }

    pub fn scoring(&self) -> ScoringConfig {
        ScoringConfig {
            relevance_key: self.relevance_key.clone(),
            position_decay: self.position_decay,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_num_results: 10,
            max_num_results: 100,
            default_timeout_ms: 3000,
            max_timeout_ms: 10_000,
            default_strategy: RankingStrategy::Weighted,
            relevance_key: "relevance_score".to_string(),
            position_decay: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    pub enabled: bool,
    /// Prometheus 抓取端点监听地址
    pub listen_address: String,
}

impl Settings {
    /// 加载配置
    ///
    /// 优先级从低到高：内置默认值、`config/default.toml`、
    /// `config/{APP_ENVIRONMENT}.toml`、`METASEARCH__` 前缀的环境变量
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("METASEARCH").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// 从 TOML 文本加载配置（叠加在内置默认值之上）
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let search = SearchSettings::default();
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("search.default_num_results", search.default_num_results as u64)?
            .set_default("search.max_num_results", search.max_num_results as u64)?
            .set_default("search.default_timeout_ms", search.default_timeout_ms)?
            .set_default("search.max_timeout_ms", search.max_timeout_ms)?
            .set_default("search.default_strategy", search.default_strategy.as_str())?
            .set_default("search.relevance_key", search.relevance_key)?
            .set_default("search.position_decay", search.position_decay)?
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_address", "0.0.0.0:9000")
    }
}
