use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::features::removal::provider::RemovalError;

/// 缺少 `image` 字段时返回给调用方的固定文案。
pub const NO_IMAGE_PROVIDED: &str = "No image provided";

/// 上游错误文案前缀，便于调用方区分本地错误与 remove.bg 错误。
pub const UPSTREAM_ERROR_PREFIX: &str = "Remove.bg API error: ";

/// 兜底错误文案：不回显任何内部细节。
pub const INTERNAL_ERROR_MESSAGE: &str = "Failed to remove background";

/// 应用统一错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 参数校验错误（缺少必需输入）
    #[error("参数校验错误: {0}")]
    Validation(String),

    /// 上游返回非 2xx：状态码原样透传
    #[error("上游错误 ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// 上传体积超过服务端限制
    #[error("上传体积超限")]
    PayloadTooLarge,

    /// 上传字段声明的类型不是图片
    #[error("不支持的图片类型: {0}")]
    UnsupportedMediaType(String),

    /// 内部服务器错误（细节只写日志）
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 所有错误响应统一使用的 JSON 结构：`{"error": "..."}`。
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// 可直接展示给最终用户的错误信息
    #[schema(example = "No image provided")]
    pub error: String,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 对外暴露的错误信息。Internal 永远只返回固定文案。
    fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Upstream { message, .. } => format!("{UPSTREAM_ERROR_PREFIX}{message}"),
            AppError::PayloadTooLarge => "Image too large".to_string(),
            AppError::UnsupportedMediaType(_) => "Unsupported image type".to_string(),
            AppError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = crate::request_id::current_request_id();

        match &self {
            AppError::Internal(detail) => {
                tracing::error!(request_id = ?request_id, "Error removing background: {}", detail);
            }
            AppError::Upstream { status, .. } => {
                tracing::warn!(request_id = ?request_id, upstream_status = status, "remove.bg 返回错误");
            }
            other => {
                tracing::info!(request_id = ?request_id, "请求被拒绝: {}", other);
            }
        }

        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

// =============== Error conversions for provider errors ===============

impl From<RemovalError> for AppError {
    fn from(err: RemovalError) -> Self {
        match err {
            RemovalError::Upstream { status, message } => AppError::Upstream { status, message },
            other => AppError::Internal(other.to_string()),
        }
    }
}
