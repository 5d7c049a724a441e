// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::Extension, Json};
use std::sync::Arc;
use std::time::Instant;

use crate::application::dto::health_response::{HealthResponse, VersionResponse};
use crate::domain::services::search_service::MetasearchService;

/// 服务启动时间，用于计算运行时长
#[derive(Debug, Clone, Copy)]
pub struct StartedAt(pub Instant);

/// 健康检查端点
///
/// # 返回值
///
/// 返回服务状态、版本、运行时长与启用的搜索引擎
pub async fn health_check(
    Extension(service): Extension<Arc<MetasearchService>>,
    Extension(started): Extension<StartedAt>,
) -> Json<HealthResponse> {
    let providers = service.registry().enabled_names();
    let status = if providers.is_empty() {
        "degraded"
    } else {
        "ok"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: started.0.elapsed().as_secs(),
        providers,
    })
}

/// 版本信息端点
pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
