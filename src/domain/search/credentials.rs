// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;

/// 凭证存储
///
/// 搜索引擎适配器通过凭证引用获取 API Key，凭证的生命周期不由这里管理
pub trait CredentialStore: Send + Sync {
    /// 解析凭证引用，不存在或为空时返回 None
    fn resolve(&self, reference: &str) -> Option<String>;
}

/// 从环境变量读取凭证，引用即环境变量名
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialStore;

impl CredentialStore for EnvCredentialStore {
    fn resolve(&self, reference: &str) -> Option<String> {
        std::env::var(reference)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// 内存凭证存储
#[derive(Debug, Default, Clone)]
pub struct StaticCredentialStore {
    secrets: HashMap<String, String>,
}

impl StaticCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reference: impl Into<String>, secret: impl Into<String>) -> Self {
        self.secrets.insert(reference.into(), secret.into());
        self
    }
}

impl CredentialStore for StaticCredentialStore {
    fn resolve(&self, reference: &str) -> Option<String> {
        self.secrets
            .get(reference)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}
