use std::sync::Arc;

use bg_remover::features::removal::{ApiKeySource, RemoveBgClient};
use bg_remover::shutdown::graceful_shutdown_signal;
use bg_remover::startup::run_startup_checks;
use bg_remover::{AppConfig, AppState, build_app};

#[tokio::main]
async fn main() {
    // Load config（日志初始化前的加载信息会被丢弃，出错时直接打印到 stderr）
    if let Err(e) = AppConfig::init_global() {
        eprintln!("Config init failed: {e}");
        std::process::exit(1);
    }
    let config = AppConfig::global();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                let level = &config.logging.level;
                format!("bg_remover={level},tower_http={level}").into()
            }),
        )
        .init();

    let api_key = ApiKeySource::env(&config.removebg.api_key_env);

    if let Err(e) = run_startup_checks(config, &api_key) {
        tracing::error!("Startup checks failed: {}", e);
        std::process::exit(1);
    }

    let remover = match RemoveBgClient::new(&config.removebg, api_key) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!("remove.bg client init failed: {}", e);
            std::process::exit(1);
        }
    };

    let app = build_app(config, AppState::new(remover, config.upload.clone()));

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!(
        "Remove background: POST http://{}{}/remove-background",
        addr,
        config.api.prefix
    );

    let graceful = axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown_signal(config.shutdown.timeout_duration()));

    if let Err(e) = graceful.await {
        tracing::error!("服务器运行错误: {}", e);
        std::process::exit(1);
    }

    tracing::info!("服务器已优雅关闭");
}
