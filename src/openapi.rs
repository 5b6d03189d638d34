use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::server::{ServerBuilder, ServerVariableBuilder};
use utoipa::{Modify, OpenApi};

/// 注入会话凭据的两种携带方式：`auth-token` Cookie 与 Bearer 头。
struct SessionSecurity;

impl Modify for SessionSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("auth-token"))),
        );
        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// 业务接口挂载在 `config.api.prefix` 下，`/health` 不带前缀。
struct ApiServers;

impl Modify for ApiServers {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let api = ServerBuilder::new()
            .url("{api_prefix}")
            .description(Some("业务接口（默认 /api）"))
            .parameter(
                "api_prefix",
                ServerVariableBuilder::new()
                    .default_value("/api")
                    .description(Some("对应 config.api.prefix（可通过 APP_API__PREFIX 覆盖）")),
            )
            .build();

        let root = ServerBuilder::new()
            .url("/")
            .description(Some("根路径（/health）"))
            .build();

        openapi.servers = Some(vec![api, root]);
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::health_check,
        crate::features::health::handler::health_action,
        crate::features::auth::handler::post_login,
        crate::features::auth::handler::get_verify,
        crate::features::auth::handler::post_logout,
        crate::features::submissions::handler::post_submit_form,
        crate::features::submissions::handler::get_submissions,
        crate::features::submissions::handler::get_export,
        crate::features::analytics::handler::get_analytics,
        crate::features::analytics::handler::post_analytics,
        crate::features::analytics::handler::get_analytics_submissions,
    ),
    modifiers(&SessionSecurity, &ApiServers),
    tags(
        (name = "Auth", description = "会话：登录、校验、登出。"),
        (name = "Submissions", description = "公开表单提交，以及管理端的分页与导出。"),
        (name = "Analytics", description = "仪表盘聚合与原始数据（仅管理员）。"),
        (name = "Health", description = "健康检查与数据库初始化。"),
    ),
    info(
        title = "EV Charging Network API",
        version = env!("CARGO_PKG_VERSION"),
        description = "充电站选址线索收集后端（Axum + utoipa）。除 /health 外，业务接口挂载在 `config.api.prefix`（默认 /api）下，paths 不包含该前缀。"
    )
)]
pub struct ApiDoc;
