// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了元搜索的核心数据结构，包括：
/// - 查询（query）：经过分析的规范化查询
/// - 搜索结果（search_result）：引擎原始结果与合并后的规范化结果
/// - 搜索响应（search_response）：排序结果及其元数据
/// - 引擎配置（provider）：每个搜索引擎的启用状态、权重与凭证引用
///
/// 所有模型都在单个请求内创建和销毁，不做持久化。
pub mod provider;
pub mod query;
pub mod search_response;
pub mod search_result;
