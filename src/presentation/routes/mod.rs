// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::search_service::MetasearchService;
use crate::presentation::handlers::health_handler::{self, StartedAt};
use crate::presentation::handlers::search_handler;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// # 参数
///
/// * `service` - 所有请求共享的元搜索服务
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(service: Arc<MetasearchService>) -> Router {
    Router::new()
        .route("/health", get(health_handler::health_check))
        .route("/v1/version", get(health_handler::version))
        .route("/v1/search", post(search_handler::search))
        .route("/v1/search/analyze", get(search_handler::analyze_query))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(service))
        .layer(Extension(StartedAt(Instant::now())))
}
