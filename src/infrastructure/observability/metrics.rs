// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};

pub const SEARCH_REQUESTS_TOTAL: &str = "search_requests_total";
pub const SEARCH_DURATION_SECONDS: &str = "search_duration_seconds";
pub const PROVIDER_REQUESTS_TOTAL: &str = "provider_requests_total";
pub const PROVIDER_LATENCY_SECONDS: &str = "provider_latency_seconds";

/// 初始化指标系统
///
/// 安装 Prometheus recorder 并在 `listen_address` 上暴露抓取端点。
/// 未调用时所有指标宏都是空操作。
pub fn init_metrics(listen_address: &str) {
    let addr: SocketAddr = match listen_address.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}", listen_address, e);
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return;
    }

    describe_counter!(SEARCH_REQUESTS_TOTAL, "Total number of search requests");
    describe_histogram!(
        SEARCH_DURATION_SECONDS,
        "End-to-end duration of search requests in seconds"
    );
    describe_counter!(
        PROVIDER_REQUESTS_TOTAL,
        "Total number of provider calls by outcome"
    );
    describe_histogram!(
        PROVIDER_LATENCY_SECONDS,
        "Latency of provider calls in seconds"
    );

    info!("Metrics exporter listening on {}", addr);
}

/// 记录一次搜索请求
pub fn record_search(strategy: &'static str, outcome: &'static str, elapsed: Duration) {
    counter!(SEARCH_REQUESTS_TOTAL, "strategy" => strategy, "outcome" => outcome).increment(1);
    histogram!(SEARCH_DURATION_SECONDS, "strategy" => strategy).record(elapsed.as_secs_f64());
}

/// 记录一次引擎调用，`outcome` 为 ok 或错误类别
pub fn record_provider_call(provider: &str, outcome: &'static str, latency: Duration) {
    counter!(
        PROVIDER_REQUESTS_TOTAL,
        "provider" => provider.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!(PROVIDER_LATENCY_SECONDS, "provider" => provider.to_string())
        .record(latency.as_secs_f64());
}
