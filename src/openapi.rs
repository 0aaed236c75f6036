use utoipa::OpenApi;
use utoipa::openapi::server::{ServerBuilder, ServerVariableBuilder};

/// 为 Swagger UI 提供正确的“业务接口前缀”Servers 配置。
///
/// - 业务接口默认前缀为 `/api`（对应 `config.api.prefix` / `APP_API__PREFIX`）。
/// - `/health` 不带前缀，因此额外提供 `/` 作为备用 server。
struct ApiServers;

impl utoipa::Modify for ApiServers {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let api = ServerBuilder::new()
            .url("{api_prefix}")
            .description(Some("业务接口（默认 /api）"))
            .parameter(
                "api_prefix",
                ServerVariableBuilder::new()
                    .default_value("/api")
                    .description(Some(
                        "业务接口前缀：对应 config.api.prefix（可通过 APP_API__PREFIX 覆盖）",
                    )),
            )
            .build();

        let root = ServerBuilder::new()
            .url("/")
            .description(Some("根路径（用于 /health）"))
            .build();

        openapi.servers = Some(vec![api, root]);
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::health_check,
        crate::features::removal::handler::remove_background,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::features::health::HealthResponse,
        crate::features::removal::models::RemovalResponse,
        crate::features::removal::models::RemoveBackgroundForm,
    )),
    modifiers(&ApiServers),
    tags(
        (
            name = "Removal",
            description = "去背景：上传图片，由 remove.bg 处理后以 PNG data URI 返回。"
        ),
        (name = "Health", description = "健康检查：服务探活。"),
    ),
    info(
        title = "Background Remover API",
        version = env!("CARGO_PKG_VERSION"),
        description = "remove.bg 代理服务（Axum + utoipa）。除 /health 外，业务接口挂载在 `config.api.prefix`（默认 /api）下，OpenAPI 的 paths 不包含该前缀。"
    )
)]
pub struct ApiDoc;
