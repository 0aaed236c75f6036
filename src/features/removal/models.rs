use axum::body::Bytes;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

/// 结果图片的 data URI 前缀（上游固定返回 PNG）
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// 从 multipart `image` 字段读出的上传图片，只在单个请求内存活。
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Bytes,
    /// 字段声明的 MIME 类型（客户端可能不提供）
    pub content_type: Option<String>,
    /// 客户端声明的文件名（仅用于日志）
    pub file_name: String,
}

impl UploadedImage {
    /// 编码为上游要求的 base64 文本
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// 去背景后的图片（上游返回的原始字节）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedImage {
    pub bytes: Bytes,
}

impl RemovedImage {
    pub fn to_data_uri(&self) -> String {
        format!("{PNG_DATA_URI_PREFIX}{}", STANDARD.encode(&self.bytes))
    }
}

/// remove.bg 请求体
#[derive(Debug, Serialize)]
pub struct RemoveBgRequest {
    pub image_file_b64: String,
    pub size: String,
}

/// 成功响应
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RemovalResponse {
    /// PNG 结果的 data URI，可直接作为 `<img src>` 使用
    #[schema(example = "data:image/png;base64,iVBORw0KGgo=")]
    pub image: String,
}

/// multipart 表单（仅用于 OpenAPI 文档）
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct RemoveBackgroundForm {
    /// 待处理的图片文件
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}
