use axum::{Json, Router, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::AppConfig;
use crate::features::{analytics, auth, health, submissions};
use crate::openapi::ApiDoc;
use crate::request_context::request_context_middleware;
use crate::state::AppState;

fn compression_predicate() -> impl tower_http::compression::predicate::Predicate {
    use tower_http::compression::predicate::{NotForContentType, Predicate, SizeAbove};

    // 只压缩 JSON/文本类响应；流式与二进制内容直接透传
    SizeAbove::default()
        .and(NotForContentType::GRPC)
        .and(NotForContentType::IMAGES)
        .and(NotForContentType::SSE)
        .and(NotForContentType::const_new("application/octet-stream"))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// 业务路由（不含前缀与全局中间件）
pub fn api_router() -> Router<AppState> {
    Router::<AppState>::new()
        .nest("/auth", auth::create_auth_router())
        .merge(submissions::create_submissions_router())
        .merge(analytics::create_analytics_router())
}

/// 组装完整应用：业务路由挂在 `prefix` 下，外层依次为会话解析、请求上下文、CORS、压缩与访问日志。
pub fn build_app(state: AppState, prefix: &str, development: bool) -> Router {
    let mut app = Router::<AppState>::new().merge(health::create_health_router());
    app = match prefix.trim_end_matches('/') {
        "" => app.merge(api_router()),
        p => app.nest(p, api_router()),
    };

    let app = app
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::session::session_middleware,
        ))
        .with_state(state);

    app.layer(axum::middleware::from_fn_with_state(
        development,
        request_context_middleware,
    ))
}

/// 在 [`build_app`] 之上叠加按配置启用的传输层中间件
pub fn build_app_from_config(state: AppState, config: &AppConfig) -> Router {
    let mut app = build_app(state, &config.api.prefix, config.server.development);

    if let Some(cors) = crate::cors::build_cors_layer(&config.cors) {
        app = app.layer(cors);
    }

    app.layer(CompressionLayer::new().compress_when(compression_predicate()))
        .layer(TraceLayer::new_for_http())
}
