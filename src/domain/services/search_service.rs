// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::SearchSettings;
use crate::domain::models::provider::ProviderConfig;
use crate::domain::models::query::Query;
use crate::domain::models::search_response::{RankingStrategy, SearchResponse, Timings};
use crate::domain::services::query_analyzer::QueryAnalyzer;
use crate::infrastructure::observability::metrics;
use crate::infrastructure::search::assembler::{assemble, ResponseContext};
use crate::infrastructure::search::deduplicator::Deduplicator;
use crate::infrastructure::search::dispatcher::{DispatchError, FanOutDispatcher};
use crate::infrastructure::search::factory::ProviderRegistry;
use crate::infrastructure::search::ranker::Ranker;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchServiceError {
    /// 没有可用的搜索引擎，请求无法执行
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<DispatchError> for SearchServiceError {
    fn from(err: DispatchError) -> Self {
        SearchServiceError::Configuration(err.to_string())
    }
}

/// 搜索输入：原始文本或已分析的查询
#[derive(Debug, Clone)]
pub enum QueryInput {
    Text(String),
    Analyzed(Query),
}

impl QueryInput {
    fn text(&self) -> &str {
        match self {
            QueryInput::Text(text) => text,
            QueryInput::Analyzed(query) => &query.text,
        }
    }
}

/// 搜索请求
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: QueryInput,
    /// 未指定时使用配置中的默认值
    pub num_results: Option<usize>,
    /// 引擎名称过滤（不区分大小写）
    pub providers: Option<Vec<String>>,
    pub strategy: Option<RankingStrategy>,
    pub timeout: Option<Duration>,
    /// 合并进查询参数，覆盖同名参数
    pub parameters: Map<String, Value>,
}

impl SearchRequest {
    pub fn text(query: impl Into<String>) -> Self {
        Self::new(QueryInput::Text(query.into()))
    }

    pub fn new(query: QueryInput) -> Self {
        Self {
            query,
            num_results: None,
            providers: None,
            strategy: None,
            timeout: None,
            parameters: Map::new(),
        }
    }

    pub fn with_num_results(mut self, num_results: usize) -> Self {
        self.num_results = Some(num_results);
        self
    }

    pub fn with_providers(mut self, providers: Vec<String>) -> Self {
        self.providers = Some(providers);
        self
    }

    pub fn with_strategy(mut self, strategy: RankingStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// 元搜索服务
///
/// 管线：查询分析 → 并发分发 → 去重 → 排序 → 组装响应。
/// 服务本身无可变状态，可以在请求之间共享。
pub struct MetasearchService {
    registry: ProviderRegistry,
    settings: SearchSettings,
    analyzer: QueryAnalyzer,
    dispatcher: FanOutDispatcher,
    deduplicator: Deduplicator,
    ranker: Ranker,
}

impl MetasearchService {
    pub fn new(registry: ProviderRegistry, settings: SearchSettings) -> Self {
        let ranker = Ranker::new(settings.scoring());
        Self {
            registry,
            settings,
            analyzer: QueryAnalyzer::new(),
            dispatcher: FanOutDispatcher::new(),
            deduplicator: Deduplicator::new(),
            ranker,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// 单独执行查询分析，用于诊断
    pub fn analyze_query(&self, text: &str) -> Query {
        self.analyzer.analyze(text)
    }

    /// 执行一次元搜索
    ///
    /// # 返回值
    ///
    /// 只有请求无效或没有可用引擎时返回错误；
    /// 所有引擎都失败时仍然返回空结果的正常响应，失败信息记录在元数据中
    pub async fn search(
        &self,
        request: SearchRequest,
    ) -> Result<SearchResponse, SearchServiceError> {
        let started = Instant::now();
        let strategy = request.strategy.unwrap_or(self.settings.default_strategy);

        let result = self.run(request, strategy, started).await;
        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::record_search(strategy.as_str(), outcome, started.elapsed());
        result
    }

    async fn run(
        &self,
        request: SearchRequest,
        strategy: RankingStrategy,
        started: Instant,
    ) -> Result<SearchResponse, SearchServiceError> {
        if request.query.text().trim().is_empty() {
            return Err(SearchServiceError::InvalidRequest(
                "query must not be empty".to_string(),
            ));
        }

        let num_results = request
            .num_results
            .unwrap_or(self.settings.default_num_results);
        if num_results == 0 || num_results > self.settings.max_num_results {
            return Err(SearchServiceError::InvalidRequest(format!(
                "num_results must be between 1 and {}",
                self.settings.max_num_results
            )));
        }

        let providers = self.registry.select(request.providers.as_deref());
        if providers.is_empty() {
            let message = match &request.providers {
                Some(names) => format!(
                    "none of the requested providers are enabled: {}",
                    names.join(", ")
                ),
                None => "no enabled search providers".to_string(),
            };
            warn!("Search rejected: {}", message);
            return Err(SearchServiceError::Configuration(message));
        }

        let analysis_started = Instant::now();
        let query = self.prepare_query(request.query, request.parameters);
        let analysis_ms = elapsed_ms(analysis_started);

        let timeout = self.settings.effective_timeout(request.timeout);
        let query = Arc::new(query);
        let report = self
            .dispatcher
            .dispatch(query.clone(), &providers, num_results, timeout)
            .await?;
        let dispatch_ms = report.elapsed.as_secs_f64() * 1000.0;

        let dedup_started = Instant::now();
        let deduped = self.deduplicator.dedupe(report.successes());
        let dedup_ms = elapsed_ms(dedup_started);

        let ranking_started = Instant::now();
        let configs: Vec<ProviderConfig> = providers.iter().map(|p| p.config.clone()).collect();
        let ranked = self
            .ranker
            .rank(deduped.results, strategy, &configs, num_results);
        let ranking_ms = elapsed_ms(ranking_started);

        let timings = Timings {
            analysis_ms,
            dispatch_ms,
            dedup_ms,
            ranking_ms,
            total_ms: elapsed_ms(started),
        };

        let query = Arc::try_unwrap(query).unwrap_or_else(|shared| (*shared).clone());
        let response = assemble(
            query,
            ranked,
            &report,
            deduped.stats,
            timings,
            ResponseContext::new(strategy),
        );

        info!(
            request_id = %response.metadata.request_id,
            strategy = strategy.as_str(),
            results = response.results.len(),
            providers = report.outcomes.len(),
            partial = response.metadata.partial_results,
            "search completed in {:.1}ms",
            response.metadata.timings.total_ms
        );

        Ok(response)
    }

    fn prepare_query(&self, input: QueryInput, parameters: Map<String, Value>) -> Query {
        let mut query = match input {
            QueryInput::Text(text) => self.analyzer.analyze(&text),
            QueryInput::Analyzed(query) if query.processed_text.trim().is_empty() => {
                self.analyzer.enrich(query)
            }
            QueryInput::Analyzed(query) => query,
        };

        for (key, value) in parameters {
            query.parameters.insert(key, value);
        }
        if let Some(lang) = query.parameter_str("lang") {
            query.language = lang.to_lowercase();
        }
        query
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
