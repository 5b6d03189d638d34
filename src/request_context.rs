use std::future::Future;

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// 每个请求的上下文：追踪 ID 与是否允许在错误响应中返回诊断细节。
#[derive(Debug, Clone)]
struct RequestContext {
    request_id: String,
    diagnostics: bool,
}

tokio::task_local! {
    static TASK_CONTEXT: RequestContext;
}

/// 获取当前请求上下文中的 request_id。
pub fn current_request_id() -> Option<String> {
    TASK_CONTEXT
        .try_with(|ctx| ctx.request_id.clone())
        .ok()
        .filter(|v| !v.is_empty())
}

/// 当前请求是否处于开发模式（存储/内部错误附带 detail）。
pub fn diagnostics_enabled() -> bool {
    TASK_CONTEXT.try_with(|ctx| ctx.diagnostics).unwrap_or(false)
}

/// 在不经过中间件的场景（单元测试、后台任务）下手动设置诊断开关。
pub async fn scope_diagnostics<F: Future>(enabled: bool, fut: F) -> F::Output {
    TASK_CONTEXT
        .scope(
            RequestContext {
                request_id: String::new(),
                diagnostics: enabled,
            },
            fut,
        )
        .await
}

fn is_valid_request_id(v: &str) -> bool {
    !v.is_empty()
        && v.len() <= 128
        && v.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.')
}

fn resolve_request_id(req: &Request) -> String {
    if let Some(raw) = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        && is_valid_request_id(raw)
    {
        return raw.to_string();
    }
    format!("req_{}", Uuid::new_v4().simple())
}

/// 全局请求上下文中间件：
/// - 优先透传客户端传入的 `X-Request-Id`，缺失或非法时自动生成
/// - 回写到响应头
/// - 将开发模式开关注入任务上下文，供 `AppError` 渲染时读取
pub async fn request_context_middleware(
    State(development): State<bool>,
    req: Request,
    next: Next,
) -> Response {
    let request_id = resolve_request_id(&req);

    let ctx = RequestContext {
        request_id: request_id.clone(),
        diagnostics: development,
    };
    let mut res = TASK_CONTEXT
        .scope(ctx, async move { next.run(req).await })
        .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        res.headers_mut().insert("x-request-id", value);
    }

    res
}

#[cfg(test)]
mod tests {
    use super::{diagnostics_enabled, is_valid_request_id, scope_diagnostics};

    #[test]
    fn request_id_validation_rejects_unsafe_chars() {
        assert!(is_valid_request_id("req-123_abc.def"));
        assert!(!is_valid_request_id(""));
        assert!(!is_valid_request_id("bad id"));
    }

    #[tokio::test]
    async fn diagnostics_default_off_outside_request() {
        assert!(!diagnostics_enabled());
        assert!(scope_diagnostics(true, async { diagnostics_enabled() }).await);
    }
}
