// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::provider::{ProviderConfig, ProviderKind};
use crate::domain::search::credentials::CredentialStore;
use crate::domain::search::engine::SearchProvider;
use crate::infrastructure::search::bing::BingSearchProvider;
use crate::infrastructure::search::dispatcher::ProviderHandle;
use crate::infrastructure::search::google::GoogleSearchProvider;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// 创建所有适配器共享的 HTTP 客户端
pub fn create_http_client() -> Result<Client, FactoryError> {
    let client = Client::builder()
        .user_agent(concat!("metasearch/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(5))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()?;
    Ok(client)
}

/// 根据引擎类型创建适配器
pub fn create_adapter(
    config: &ProviderConfig,
    client: Client,
    credentials: Arc<dyn CredentialStore>,
) -> Arc<dyn SearchProvider> {
    match config.kind {
        ProviderKind::Google => Arc::new(GoogleSearchProvider::new(config, client, credentials)),
        ProviderKind::Bing => Arc::new(BingSearchProvider::new(config, client, credentials)),
    }
}

/// 引擎注册表
///
/// 启动时由配置构建，之后只读。注册顺序即引擎优先级。
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    handles: Vec<ProviderHandle>,
}

impl ProviderRegistry {
    pub fn new(handles: Vec<ProviderHandle>) -> Self {
        let mut seen = HashSet::new();
        let handles = handles
            .into_iter()
            .filter(|h| {
                let fresh = seen.insert(h.name().to_lowercase());
                if !fresh {
                    warn!("Duplicate provider {} ignored", h.name());
                }
                fresh
            })
            .collect();
        Self { handles }
    }

    /// 由引擎配置构建注册表
    pub fn from_configs(
        configs: &[ProviderConfig],
        credentials: Arc<dyn CredentialStore>,
    ) -> Result<Self, FactoryError> {
        let client = create_http_client()?;
        Ok(Self::with_client(configs, client, credentials))
    }

    pub fn with_client(
        configs: &[ProviderConfig],
        client: Client,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let handles = configs
            .iter()
            .map(|config| {
                info!(
                    "Registering provider {} ({}), enabled={}, weight={}",
                    config.name,
                    config.kind.name(),
                    config.enabled,
                    config.effective_weight()
                );
                ProviderHandle::new(
                    config.clone(),
                    create_adapter(config, client.clone(), credentials.clone()),
                )
            })
            .collect();
        Self::new(handles)
    }

    pub fn handles(&self) -> &[ProviderHandle] {
        &self.handles
    }

    /// 启用的引擎名称，按优先级排列
    pub fn enabled_names(&self) -> Vec<String> {
        self.handles
            .iter()
            .filter(|h| h.config.enabled)
            .map(|h| h.name().to_string())
            .collect()
    }

    /// 选出本次请求使用的引擎
    ///
    /// 过滤器按名称匹配（不区分大小写），结果保持注册顺序并只包含启用的引擎
    pub fn select(&self, filter: Option<&[String]>) -> Vec<ProviderHandle> {
        let wanted: Option<HashSet<String>> =
            filter.map(|names| names.iter().map(|n| n.trim().to_lowercase()).collect());

        self.handles
            .iter()
            .filter(|h| h.config.enabled)
            .filter(|h| match &wanted {
                Some(names) => names.contains(&h.name().to_lowercase()),
                None => true,
            })
            .cloned()
            .collect()
    }
}
