// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;
use validator::ValidationErrors;

use crate::domain::services::search_service::SearchServiceError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口。
/// 响应体为 `{"error": ..., "code": ...}`
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    /// 映射为 HTTP 状态码与错误代码
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        if let Some(err) = self.0.downcast_ref::<SearchServiceError>() {
            return match err {
                SearchServiceError::InvalidRequest(_) => {
                    (StatusCode::BAD_REQUEST, "invalid_request")
                }
                SearchServiceError::Configuration(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "configuration_error")
                }
            };
        }
        if self.0.downcast_ref::<ValidationErrors>().is_some()
            || self.0.downcast_ref::<JsonRejection>().is_some()
            || self.0.downcast_ref::<QueryRejection>().is_some()
        {
            return (StatusCode::BAD_REQUEST, "invalid_request");
        }
        (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let error_message = self.0.to_string();
        if status.is_server_error() {
            error!("Request failed: {}", error_message);
        }

        let body = Json(json!({ "error": error_message, "code": code }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
