use std::sync::Arc;

use crate::config::UploadConfig;
use crate::features::removal::BackgroundRemover;

/// 聚合的应用共享状态（只读，无跨请求的可变数据）
#[derive(Clone)]
pub struct AppState {
    /// 去背景服务提供方
    pub remover: Arc<dyn BackgroundRemover>,
    /// 上传限制
    pub upload: UploadConfig,
}

impl AppState {
    pub fn new(remover: Arc<dyn BackgroundRemover>, upload: UploadConfig) -> Self {
        Self { remover, upload }
    }
}
