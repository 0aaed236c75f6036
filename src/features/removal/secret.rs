//! 上游凭据的读取与持有。
//!
//! `ApiKey` 不实现 `Display`，`Debug` 输出固定占位符，避免在日志或错误信息中意外带出密钥。

use std::fmt;

use reqwest::header::HeaderValue;

/// remove.bg API Key
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// 转为 `X-Api-Key` 头的值（标记为 sensitive，不会出现在 reqwest 的调试输出中）
    pub fn header_value(&self) -> Option<HeaderValue> {
        let mut value = HeaderValue::from_str(&self.0).ok()?;
        value.set_sensitive(true);
        Some(value)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// 凭据来源：每次请求时查找，而不是在启动时固化成全局变量。
#[derive(Debug, Clone)]
pub enum ApiKeySource {
    /// 从进程环境变量读取
    Env { var: String },
    /// 固定值（测试或嵌入式使用）
    Static(ApiKey),
}

impl ApiKeySource {
    pub fn env(var: impl Into<String>) -> Self {
        Self::Env { var: var.into() }
    }

    /// 查找当前凭据。缺失或为空时返回 None，由上游以认证失败的形式反馈。
    pub fn lookup(&self) -> Option<ApiKey> {
        match self {
            ApiKeySource::Env { var } => std::env::var(var)
                .ok()
                .filter(|v| !v.is_empty())
                .map(ApiKey::new),
            ApiKeySource::Static(key) => Some(key.clone()),
        }
    }

    /// 凭据来源的描述（不含密钥本身），用于启动日志
    pub fn describe(&self) -> String {
        match self {
            ApiKeySource::Env { var } => format!("env:{var}"),
            ApiKeySource::Static(_) => "static".to_string(),
        }
    }
}
