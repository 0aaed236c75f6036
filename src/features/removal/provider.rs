use async_trait::async_trait;
use thiserror::Error;

use super::models::{RemovedImage, UploadedImage};

/// 去背景服务提供方错误
#[derive(Error, Debug)]
pub enum RemovalError {
    /// 上游返回非 2xx，附带其错误正文
    #[error("上游返回 {status}: {message}")]
    Upstream { status: u16, message: String },

    /// 连接/发送失败
    #[error("网络错误: {0}")]
    Transport(String),

    /// 上游超时（仅在配置了超时时出现）
    #[error("请求超时")]
    Timeout,

    /// 读取上游响应体失败
    #[error("读取响应失败: {0}")]
    Body(String),
}

impl From<reqwest::Error> for RemovalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemovalError::Timeout
        } else {
            RemovalError::Transport(err.to_string())
        }
    }
}

/// 去背景能力。请求处理逻辑只依赖这个接口，具体服务商可替换。
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// 对一张图片执行一次去背景；不做重试，也不缓存结果。
    async fn remove_background(&self, image: &UploadedImage) -> Result<RemovedImage, RemovalError>;
}
