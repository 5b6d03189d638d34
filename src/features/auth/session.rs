use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

use super::models::{AuthenticatedUser, Role};
use super::token::TokenCodec;

/// 中间件解析出的会话状态，注入到请求扩展中。
///
/// 缺少令牌与令牌无效对调用方不可区分，均为 `Anonymous`。
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(AuthenticatedUser),
}

impl SessionState {
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            SessionState::Anonymous => None,
            SessionState::Authenticated(user) => Some(user),
        }
    }

    /// 要求已认证且角色满足 `required`
    pub fn require(&self, required: Role) -> Result<&AuthenticatedUser, AppError> {
        let user = self
            .user()
            .ok_or_else(|| AppError::Auth("Authentication required".into()))?;
        if !authorize(user, required) {
            return Err(AppError::Forbidden(format!(
                "{} access required",
                capitalize(required.as_str())
            )));
        }
        Ok(user)
    }
}

/// 从请求扩展中取出中间件写入的会话；未挂载中间件时视为匿名
#[async_trait]
impl<S> FromRequestParts<S> for SessionState
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<SessionState>()
            .cloned()
            .unwrap_or_default())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 会话 Cookie 设置
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub cookie_name: String,
    pub cookie_secure: bool,
}

impl SessionSettings {
    pub fn from_config(cfg: &crate::config::AuthConfig) -> Self {
        Self {
            cookie_name: cfg.cookie_name.clone(),
            cookie_secure: cfg.cookie_secure,
        }
    }

    /// 登录成功后写入的 `Set-Cookie` 值
    pub fn issue_cookie(&self, token: &str, max_age_secs: u64) -> String {
        let mut cookie = format!(
            "{}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}",
            self.cookie_name
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    /// 立即过期的 `Set-Cookie` 值，用于登出
    pub fn clear_cookie(&self) -> String {
        let mut cookie = format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
            self.cookie_name
        );
        if self.cookie_secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// 纯函数的授权判定
pub fn authorize(identity: &AuthenticatedUser, required: Role) -> bool {
    identity.role.satisfies(required)
}

pub fn read_cookie_value(headers: &HeaderMap, key: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|part| {
            let mut iter = part.trim().splitn(2, '=');
            let name = iter.next()?.trim();
            let value = iter.next()?.trim();
            if name == key && !value.is_empty() {
                Some(value.to_string())
            } else {
                None
            }
        })
}

pub fn read_bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?
        .trim();
    let token = raw.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// 定位候选令牌：Cookie 优先，其次 `Authorization: Bearer`
pub fn locate_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    read_cookie_value(headers, cookie_name).or_else(|| read_bearer_token(headers))
}

/// 将请求解析为已认证身份；没有候选令牌时不会调用解码器
pub fn resolve(headers: &HeaderMap, cookie_name: &str, codec: &TokenCodec) -> SessionState {
    let Some(token) = locate_token(headers, cookie_name) else {
        return SessionState::Anonymous;
    };
    match codec.verify(&token) {
        Some(claims) => SessionState::Authenticated(claims.identity()),
        None => SessionState::Anonymous,
    }
}

pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let session = resolve(req.headers(), &state.session.cookie_name, &state.tokens);
    if let SessionState::Authenticated(user) = &session {
        tracing::debug!(
            target: "ev_charging_backend::auth::session",
            user_id = %user.id,
            role = user.role.as_str(),
            "session resolved"
        );
    }
    req.extensions_mut().insert(session);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::{HeaderMap, HeaderValue, header};

    use super::{SessionState, authorize, locate_token, resolve};
    use crate::error::AppError;
    use crate::features::auth::models::{AuthenticatedUser, Role};
    use crate::features::auth::token::TokenCodec;

    fn codec() -> TokenCodec {
        TokenCodec::new("s", "iss", "aud", Duration::from_secs(3600))
    }

    fn user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            id: "7".into(),
            email: "u@example.com".into(),
            username: "u".into(),
            role,
        }
    }

    #[test]
    fn cookie_wins_over_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; auth-token=from-cookie"),
        );
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        assert_eq!(
            locate_token(&headers, "auth-token").as_deref(),
            Some("from-cookie")
        );
    }

    #[test]
    fn bearer_header_is_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        assert_eq!(
            locate_token(&headers, "auth-token").as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn non_bearer_scheme_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(locate_token(&headers, "auth-token").is_none());
    }

    #[test]
    fn invalid_token_resolves_to_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer forged.token.value"),
        );
        assert!(resolve(&headers, "auth-token", &codec()).user().is_none());
    }

    #[test]
    fn valid_cookie_resolves_identity_from_claims() {
        let codec = codec();
        let token = codec.issue(&user(Role::User)).expect("issue");
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("auth-token={token}")).unwrap(),
        );
        let session = resolve(&headers, "auth-token", &codec);
        assert_eq!(session.user(), Some(&user(Role::User)));
    }

    #[test]
    fn cookie_values_carry_expected_attributes() {
        let settings = super::SessionSettings {
            cookie_name: "auth-token".into(),
            cookie_secure: true,
        };
        let set = settings.issue_cookie("abc", 604800);
        assert!(set.starts_with("auth-token=abc;"));
        assert!(set.contains("HttpOnly"));
        assert!(set.contains("SameSite=Lax"));
        assert!(set.contains("Max-Age=604800"));
        assert!(set.ends_with("; Secure"));

        let cleared = settings.clear_cookie();
        assert!(cleared.starts_with("auth-token=;"));
        assert!(cleared.contains("Max-Age=0"));
    }

    #[test]
    fn authorize_follows_role_ordering() {
        assert!(authorize(&user(Role::Admin), Role::Admin));
        assert!(authorize(&user(Role::Admin), Role::User));
        assert!(authorize(&user(Role::User), Role::User));
        assert!(!authorize(&user(Role::User), Role::Admin));
    }

    #[test]
    fn require_distinguishes_unauthenticated_from_forbidden() {
        let anon = SessionState::Anonymous;
        assert!(matches!(anon.require(Role::User), Err(AppError::Auth(_))));

        let plain = SessionState::Authenticated(user(Role::User));
        match plain.require(Role::Admin) {
            Err(AppError::Forbidden(msg)) => assert_eq!(msg, "Admin access required"),
            other => panic!("expected forbidden, got {other:?}"),
        }
    }
}
