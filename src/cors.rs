use axum::http::{HeaderValue, Method, header};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsConfig;

/// 根据配置构建 CORS 中间件。
///
/// 仪表盘依赖 Cookie 会话，跨域部署时需要 `allow_credentials=true` 并列出具体 Origin。
pub fn build_cors_layer(cors: &CorsConfig) -> Option<CorsLayer> {
    if !cors.enabled {
        return None;
    }

    let (any_origin, origins) = parse_list("allowed_origins", &cors.allowed_origins, |v| {
        HeaderValue::from_str(v).ok()
    });
    if !any_origin && origins.is_empty() {
        tracing::warn!("CORS 已启用但 allowed_origins 为空，已跳过启用");
        return None;
    }

    let (any_methods, methods) = parse_list("allowed_methods", &cors.allowed_methods, |v| {
        Method::from_bytes(v.to_ascii_uppercase().as_bytes()).ok()
    });
    let (any_headers, headers) = parse_list("allowed_headers", &cors.allowed_headers, |v| {
        header::HeaderName::from_bytes(v.to_ascii_lowercase().as_bytes()).ok()
    });

    if cors.allow_credentials && (any_origin || any_methods || any_headers) {
        tracing::error!("CORS 配置无效：allow_credentials=true 不能与 \"*\" 同时使用，已跳过启用");
        return None;
    }

    let mut layer = CorsLayer::new().expose_headers([header::HeaderName::from_static(
        "x-request-id",
    )]);

    layer = if any_origin {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    };

    if any_methods {
        layer = layer.allow_methods(Any);
    } else if !methods.is_empty() {
        layer = layer.allow_methods(methods);
    }

    if any_headers {
        layer = layer.allow_headers(Any);
    } else if !headers.is_empty() {
        layer = layer.allow_headers(headers);
    }

    if cors.allow_credentials {
        layer = layer.allow_credentials(true);
    }

    if let Some(secs) = cors.max_age_secs
        && secs > 0
    {
        layer = layer.max_age(Duration::from_secs(secs));
    }

    Some(layer)
}

/// 解析配置列表：`"*"` 表示任意，空白项跳过，无效项告警后忽略
fn parse_list<T>(
    label: &str,
    values: &[String],
    parse: impl Fn(&str) -> Option<T>,
) -> (bool, Vec<T>) {
    let mut any = false;
    let mut out = Vec::new();
    for raw in values {
        let value = raw.trim();
        if value.is_empty() {
            continue;
        }
        if value == "*" {
            any = true;
            continue;
        }
        match parse(value) {
            Some(v) => out.push(v),
            None => tracing::warn!("CORS {} 含无效值: {}", label, value),
        }
    }
    (any, out)
}
