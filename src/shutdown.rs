//! 优雅退出
//!
//! 监听 SIGINT/SIGTERM（Windows 下为 Ctrl+C），交给 `axum::serve(..).with_graceful_shutdown` 使用。
//! 进入退出流程后，进行中的上游调用最多再等待 `shutdown.timeout_secs`，超时则强制退出进程。

use std::time::Duration;
use tracing::{error, info, warn};

/// 退出原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// 用户中断信号 (Ctrl+C)
    Interrupt,
    /// 终止信号 (SIGTERM)
    Terminate,
}

/// 等待第一个退出信号
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<ShutdownReason> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let reason = tokio::select! {
        _ = sigint.recv() => ShutdownReason::Interrupt,
        _ = sigterm.recv() => ShutdownReason::Terminate,
    };
    Ok(reason)
}

/// 等待第一个退出信号
#[cfg(not(unix))]
pub async fn wait_for_signal() -> std::io::Result<ShutdownReason> {
    tokio::signal::ctrl_c().await?;
    Ok(ShutdownReason::Interrupt)
}

/// 优雅退出 future：收到信号后返回，同时启动强制退出的兜底计时。
///
/// 信号处理器注册失败时该 future 永不完成（服务继续运行，只能被外部强制终止）。
pub async fn graceful_shutdown_signal(drain_timeout: Duration) {
    match wait_for_signal().await {
        Ok(reason) => info!("接收到退出信号: {:?}，开始优雅退出...", reason),
        Err(e) => {
            error!("信号处理器启动失败: {}", e);
            std::future::pending::<()>().await;
        }
    }

    tokio::spawn(async move {
        tokio::time::sleep(drain_timeout).await;
        warn!("优雅退出超时（{}秒），强制退出", drain_timeout.as_secs());
        std::process::exit(1);
    });
}
