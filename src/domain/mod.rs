// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含元搜索的核心业务逻辑，包括：
/// - 领域模型（models）：查询、结果、响应与引擎配置
/// - 搜索接口（search）：搜索引擎适配器契约与凭证存储
/// - 服务（services）：查询分析与搜索服务
pub mod models;
pub mod search;
pub mod services;
