// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 可观测性模块
///
/// 搜索请求与引擎调用的计数、延迟指标
pub mod metrics;
