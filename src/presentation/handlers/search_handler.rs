// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Json, Query as QueryParams,
    },
    response::IntoResponse,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    application::dto::search_request::{AnalyzeQueryParams, SearchRequestDto},
    domain::services::search_service::MetasearchService,
    presentation::errors::AppError,
};

/// 处理搜索请求
///
/// # 参数
///
/// * `service` - 元搜索服务实例
/// * `payload` - 搜索请求数据
///
/// # 返回值
///
/// 返回排序后的搜索结果及元数据
///
/// # 错误
///
/// 可能在以下情况下返回错误响应：
/// - 请求体无法解析或参数验证失败（400）
/// - 没有可用的搜索引擎（503）
pub async fn search(
    Extension(service): Extension<Arc<MetasearchService>>,
    payload: Result<Json<SearchRequestDto>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let response = service.search(payload.into()).await?;
    Ok(Json(response))
}

/// 查询分析诊断端点
pub async fn analyze_query(
    Extension(service): Extension<Arc<MetasearchService>>,
    params: Result<QueryParams<AnalyzeQueryParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let QueryParams(params) = params?;
    params.validate()?;

    Ok(Json(service.analyze_query(&params.query)))
}
