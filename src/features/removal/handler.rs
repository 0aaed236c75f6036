//! 去背景代理接口（features/removal）
use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    routing::post,
};

use crate::config::UploadConfig;
use crate::error::{AppError, NO_IMAGE_PROVIDED};
use crate::state::AppState;

use super::models::{RemovalResponse, UploadedImage};

/// 表单中承载图片的字段名
pub const IMAGE_FIELD: &str = "image";

#[utoipa::path(
    post,
    path = "/remove-background",
    summary = "移除图片背景",
    description = "接收 multipart 表单中的 `image` 字段，转为 base64 后调用 remove.bg，结果以 PNG data URI 返回。上游失败时透传其状态码。",
    request_body(content = crate::features::removal::models::RemoveBackgroundForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "处理成功", body = RemovalResponse),
        (status = 400, description = "缺少 image 字段", body = crate::error::ErrorBody),
        (status = 413, description = "超过服务端上传上限（仅在配置 upload.max_bytes 时）", body = crate::error::ErrorBody),
        (status = 415, description = "图片类型不被接受（仅在启用 upload.require_image_content_type 时）", body = crate::error::ErrorBody),
        (status = 500, description = "内部错误", body = crate::error::ErrorBody),
        (status = "default", description = "remove.bg 返回的错误（状态码原样透传）", body = crate::error::ErrorBody)
    ),
    tag = "Removal"
)]
pub async fn remove_background(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<RemovalResponse>), AppError> {
    let multipart = multipart.map_err(|e| AppError::Internal(format!("无法解析表单: {e}")))?;

    let image = read_image_field(multipart, &state.upload)
        .await?
        .ok_or_else(|| AppError::Validation(NO_IMAGE_PROVIDED.to_string()))?;

    tracing::debug!(
        input_bytes = image.bytes.len(),
        content_type = image.content_type.as_deref().unwrap_or("-"),
        file_name = %image.file_name,
        "收到待处理图片"
    );

    let removed = state.remover.remove_background(&image).await?;

    Ok((
        StatusCode::OK,
        Json(RemovalResponse {
            image: removed.to_data_uri(),
        }),
    ))
}

/// 读取第一个名为 `image` 的字段；其余字段直接跳过。
///
/// 没有 filename 的同名字段是普通文本值而不是文件：空值视为未提供图片，非空值视为表单错误，
/// 两种情况都不会调用上游。
async fn read_image_field(
    mut multipart: Multipart,
    upload: &UploadConfig,
) -> Result<Option<UploadedImage>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let text = field.bytes().await.map_err(map_multipart_error)?;
            if text.is_empty() {
                return Ok(None);
            }
            return Err(AppError::Internal(format!(
                "image 字段是文本值而非文件（{} 字节）",
                text.len()
            )));
        };

        let content_type = field.content_type().map(str::to_string);
        if upload.require_image_content_type
            && !content_type
                .as_deref()
                .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("image/"))
        {
            return Err(AppError::UnsupportedMediaType(
                content_type.unwrap_or_default(),
            ));
        }

        let bytes = field.bytes().await.map_err(map_multipart_error)?;
        return Ok(Some(UploadedImage {
            bytes,
            content_type,
            file_name,
        }));
    }
    Ok(None)
}

fn map_multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Internal(format!("读取表单失败: {}", err.body_text()))
    }
}

/// 请求体上限：0 表示关闭（同时关闭 axum 默认的 2MB 限制）
fn body_limit(upload: &UploadConfig) -> DefaultBodyLimit {
    match upload.max_bytes {
        0 => DefaultBodyLimit::disable(),
        n => DefaultBodyLimit::max(usize::try_from(n).unwrap_or(usize::MAX)),
    }
}

pub fn create_removal_router(upload: &UploadConfig) -> Router<AppState> {
    Router::<AppState>::new().route(
        "/remove-background",
        post(remove_background).layer(body_limit(upload)),
    )
}
