// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metasearch::config::settings::Settings;
use metasearch::domain::search::credentials::EnvCredentialStore;
use metasearch::domain::services::search_service::MetasearchService;
use metasearch::infrastructure::observability::metrics;
use metasearch::infrastructure::search::factory::ProviderRegistry;
use metasearch::presentation::routes;
use metasearch::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责加载配置、初始化日志与指标、注册搜索引擎并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Settings::new()?;

    // 2. Initialize logging
    telemetry::init_telemetry(&settings.logging);
    info!("Starting metasearch {}...", env!("CARGO_PKG_VERSION"));

    // 3. Metrics
    if settings.metrics.enabled {
        metrics::init_metrics(&settings.metrics.listen_address);
    }

    // 4. Providers
    let registry = ProviderRegistry::from_configs(&settings.providers, Arc::new(EnvCredentialStore))?;
    let enabled = registry.enabled_names();
    if enabled.is_empty() {
        warn!("No search providers enabled; search requests will be rejected");
    } else {
        info!("Enabled providers: {}", enabled.join(", "));
    }

    let service = Arc::new(MetasearchService::new(registry, settings.search.clone()));

    // 5. Start HTTP server
    let app = routes::routes(service);
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
