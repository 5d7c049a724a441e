// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层
///
/// 外部搜索引擎的 HTTP 适配器、聚合管线各阶段实现以及指标上报
pub mod observability;
pub mod search;
