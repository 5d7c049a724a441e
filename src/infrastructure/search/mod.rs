// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 搜索服务模块
///
/// 元搜索管线的基础设施部分：
/// Google、Bing 适配器，并发分发器，去重器，排序器以及响应组装
pub mod assembler;
pub mod bing;
pub mod deduplicator;
pub mod dispatcher;
pub mod factory;
pub mod google;
pub mod http_status;
pub mod quota;
pub mod ranker;
pub mod url_normalize;

pub use dispatcher::{DispatchReport, FanOutDispatcher, ProviderHandle, ProviderOutcome};
pub use factory::{create_http_client, ProviderRegistry};
pub use ranker::{Ranker, ScoringConfig};
