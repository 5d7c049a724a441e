// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 搜索领域模块
///
/// 定义搜索引擎适配器接口、适配器错误类型以及凭证存储抽象
pub mod credentials;
pub mod engine;
