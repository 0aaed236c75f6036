/// 健康检查
pub mod health;
/// 去背景代理
pub mod removal;
