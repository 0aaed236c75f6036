use crate::config::AppConfig;
use crate::error::AppError;
use crate::features::removal::ApiKeySource;

/// 执行启动检查
///
/// 1. 校验 API 前缀格式
/// 2. 校验上游端点可解析为 URL
/// 3. 检查 API Key 是否存在（仅告警：缺失时由上游返回认证失败）
pub fn run_startup_checks(config: &AppConfig, api_key: &ApiKeySource) -> Result<(), AppError> {
    tracing::info!("🔍 开始执行启动检查...");

    check_api_prefix(&config.api.prefix)?;
    check_endpoint(&config.removebg.endpoint)?;

    if api_key.lookup().is_none() {
        tracing::warn!(
            "⚠️ 未找到 remove.bg API Key（{}），请求将以上游认证失败返回",
            api_key.describe()
        );
    } else {
        tracing::info!("✅ remove.bg API Key 已配置（{}）", api_key.describe());
    }

    if config.removebg.timeout().is_none() {
        tracing::info!("💡 未设置上游超时，请求会等待到上游响应或连接失败");
    }

    tracing::info!("✅ 启动检查完成");
    Ok(())
}

fn check_api_prefix(prefix: &str) -> Result<(), AppError> {
    if prefix.is_empty() {
        return Ok(());
    }
    if !prefix.starts_with('/') || prefix.ends_with('/') {
        return Err(AppError::Internal(format!(
            "api.prefix 必须以 / 开头且不能以 / 结尾: {prefix:?}"
        )));
    }
    Ok(())
}

fn check_endpoint(endpoint: &str) -> Result<(), AppError> {
    let url = reqwest::Url::parse(endpoint)
        .map_err(|e| AppError::Internal(format!("removebg.endpoint 无效 ({endpoint}): {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::Internal(format!(
            "removebg.endpoint 仅支持 http/https: {endpoint}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_api_prefix, check_endpoint};

    #[test]
    fn api_prefix_shape() {
        assert!(check_api_prefix("/api").is_ok());
        assert!(check_api_prefix("").is_ok());
        assert!(check_api_prefix("api").is_err());
        assert!(check_api_prefix("/api/").is_err());
    }

    #[test]
    fn endpoint_must_be_http_url() {
        assert!(check_endpoint("https://api.remove.bg/v1.0/removebg").is_ok());
        assert!(check_endpoint("ftp://example.com/x").is_err());
        assert!(check_endpoint("not a url").is_err());
    }
}
