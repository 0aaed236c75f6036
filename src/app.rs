use axum::{Router, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::compression::predicate::{NotForContentType, Predicate, SizeAbove};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::cors::build_cors_layer;
use crate::features::health::health_check;
use crate::features::removal::create_removal_router;
use crate::openapi::ApiDoc;
use crate::request_id::request_id_middleware;
use crate::state::AppState;

/// 响应压缩策略：JSON（含 base64 图片）值得压缩；原始图片/二进制下载不压缩。
fn compression_predicate() -> impl Predicate {
    SizeAbove::default()
        .and(NotForContentType::GRPC)
        .and(NotForContentType::IMAGES)
        .and(NotForContentType::SSE)
        .and(NotForContentType::const_new("application/octet-stream"))
}

/// 组装完整路由：业务接口挂在 `api.prefix` 下，`/health` 与文档挂在根路径。
pub fn build_app(config: &AppConfig, state: AppState) -> Router {
    let api_router = create_removal_router(&config.upload);

    let router = Router::<AppState>::new().route("/health", get(health_check));
    let router = if config.api.prefix.is_empty() {
        router.merge(api_router)
    } else {
        router.nest(&config.api.prefix, api_router)
    };

    let mut app = router
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state);

    if let Some(cors) = build_cors_layer(&config.cors) {
        app = app.layer(cors);
    }

    app.layer(CompressionLayer::new().compress_when(compression_predicate()))
        .layer(axum::middleware::from_fn(request_id_middleware))
}
