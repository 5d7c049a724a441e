// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::create_service;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use metasearch::presentation::routes;
use tower::util::ServiceExt;

/// 健康检查测试
///
/// 验证健康检查端点是否正常工作
#[tokio::test]
async fn health_check_works() {
    let app = routes::routes(create_service(Vec::new()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

/// 未知路由返回 404
#[tokio::test]
async fn unknown_route_returns_404() {
    let app = routes::routes(create_service(Vec::new()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/scrape")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// 搜索端点只接受 POST
#[tokio::test]
async fn search_rejects_get() {
    let app = routes::routes(create_service(Vec::new()));

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/search")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
