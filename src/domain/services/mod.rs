// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 查询分析（query_analyzer）：基于规则识别意图、地域和语言，提取查询操作符
/// - 搜索服务（search_service）：元搜索入口，串联分发、去重、排序与响应组装
pub mod query_analyzer;
pub mod search_service;
