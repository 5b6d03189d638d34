use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::header,
    response::IntoResponse,
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

use super::models::{LoginRequest, LoginResponse, LogoutResponse, VerifyResponse};
use super::session::SessionState;

#[utoipa::path(
    post,
    path = "/auth/login",
    summary = "登录",
    description = "使用邮箱或用户名 + 口令登录。成功后写入 HttpOnly 会话 Cookie，同时在响应体中返回令牌供 Bearer 方式使用。账号不存在与口令错误返回同一提示。",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功", body = LoginResponse),
        (status = 400, description = "缺少标识或口令", body = crate::error::ProblemDetails),
        (status = 401, description = "凭据无效", body = crate::error::ProblemDetails)
    ),
    tag = "Auth"
)]
pub async fn post_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let outcome = state.auth.login(&req.identifier, &req.password).await?;
    let cookie = state
        .session
        .issue_cookie(&outcome.token, state.tokens.ttl().as_secs());

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            success: true,
            user: outcome.user,
            message: "Authentication successful".into(),
            token: outcome.token,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/auth/verify",
    summary = "校验当前会话",
    description = "按 Cookie 优先、Bearer 兜底的顺序解析会话令牌，返回令牌中的身份。",
    responses(
        (status = 200, description = "会话有效", body = VerifyResponse),
        (status = 401, description = "未登录或令牌无效", body = crate::error::ProblemDetails)
    ),
    tag = "Auth"
)]
pub async fn get_verify(session: SessionState) -> Result<Json<VerifyResponse>, AppError> {
    let user = session
        .user()
        .cloned()
        .ok_or_else(|| AppError::Auth("Not authenticated".into()))?;
    Ok(Json(VerifyResponse {
        success: true,
        user,
        message: "User authenticated".into(),
    }))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    summary = "登出",
    description = "令牌无服务端状态，登出只清除 Cookie；始终返回成功。",
    responses((status = 200, description = "已登出", body = LogoutResponse)),
    tag = "Auth"
)]
pub async fn post_logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, state.session.clear_cookie())],
        Json(LogoutResponse {
            success: true,
            message: "Logged out".into(),
        }),
    )
}

pub fn create_auth_router() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/login", post(post_login))
        .route("/verify", get(get_verify))
        .route("/logout", post(post_logout))
}
