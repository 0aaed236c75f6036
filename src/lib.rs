/// 统一错误处理模块
pub mod error;

/// 配置模块
pub mod config;

/// 启动检查模块
pub mod startup;

/// 功能聚合模块
pub mod features;

/// 应用状态聚合模块
pub mod state;

/// 路由组装
pub mod app;

/// 优雅退出模块
pub mod shutdown;

/// 上游 HTTP Client 构建
pub mod http;

/// 全局 request_id 中间件
pub mod request_id;

/// CORS 中间件构建
pub mod cors;

/// OpenAPI 文档
pub mod openapi;

// 导出常用类型供外部使用
pub use app::build_app;
pub use config::AppConfig;
pub use error::AppError;
pub use state::AppState;
