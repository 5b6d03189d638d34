use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::AppError;

use super::models::{AuthenticatedUser, Role};

/// 会话令牌中携带的声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn identity(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            id: self.sub.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// 签发与校验会话令牌（HS256）。
///
/// 密钥、issuer、audience 均在构造时注入；校验过程不读取环境，也不访问共享可变状态。
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(
        secret: &str,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl,
        }
    }

    pub fn from_config(cfg: &AuthConfig, secret: &str) -> Self {
        Self::new(
            secret,
            cfg.jwt_issuer.clone(),
            cfg.jwt_audience.clone(),
            cfg.token_ttl(),
        )
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 以当前时间签发令牌
    pub fn issue(&self, user: &AuthenticatedUser) -> Result<String, AppError> {
        self.issue_at(user, chrono::Utc::now().timestamp())
    }

    /// 以指定签发时间签发令牌；相同声明 + 时间 + 密钥得到相同结果
    pub fn issue_at(&self, user: &AuthenticatedUser, issued_at: i64) -> Result<String, AppError> {
        let exp = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|ttl| issued_at.checked_add(ttl))
            .ok_or_else(|| AppError::Internal("会话令牌有效期超出范围".into()))?;
        let claims = SessionClaims {
            sub: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: issued_at,
            exp,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("签发会话令牌失败: {e}")))
    }

    /// 校验签名、issuer、audience 与过期时间。
    ///
    /// 任何失败都折叠为 `None`，具体原因只写日志。
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        match jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!(
                    target: "ev_charging_backend::auth::token",
                    "session token rejected: {:?}",
                    e.kind()
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::TokenCodec;
    use crate::features::auth::models::{AuthenticatedUser, Role};

    const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    fn codec() -> TokenCodec {
        TokenCodec::new("unit-secret", "ev-charging-network", "ev-charging-users", WEEK)
    }

    fn admin() -> AuthenticatedUser {
        AuthenticatedUser {
            id: "1".into(),
            email: "admin@evcharging.com".into(),
            username: "admin".into(),
            role: Role::Admin,
        }
    }

    #[test]
    fn issued_token_verifies_and_carries_claims() {
        let codec = codec();
        let token = codec.issue(&admin()).expect("issue");
        let claims = codec.verify(&token).expect("valid token");
        assert_eq!(claims.identity(), admin());
        assert_eq!(claims.exp - claims.iat, WEEK.as_secs() as i64);
    }

    #[test]
    fn issue_is_deterministic_for_fixed_timestamp() {
        let codec = codec();
        let a = codec.issue_at(&admin(), 1_700_000_000).expect("issue");
        let b = codec.issue_at(&admin(), 1_700_000_000).expect("issue");
        assert_eq!(a, b);
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec();
        let long_ago = chrono::Utc::now().timestamp() - WEEK.as_secs() as i64 - 5;
        let token = codec.issue_at(&admin(), long_ago).expect("issue");
        assert!(codec.verify(&token).is_none());
    }

    #[test]
    fn token_from_other_secret_issuer_or_audience_is_rejected() {
        let token = codec().issue(&admin()).expect("issue");

        let other_secret =
            TokenCodec::new("other-secret", "ev-charging-network", "ev-charging-users", WEEK);
        let other_issuer = TokenCodec::new("unit-secret", "someone-else", "ev-charging-users", WEEK);
        let other_audience =
            TokenCodec::new("unit-secret", "ev-charging-network", "other-app", WEEK);

        assert!(other_secret.verify(&token).is_none());
        assert!(other_issuer.verify(&token).is_none());
        assert!(other_audience.verify(&token).is_none());
    }

    #[test]
    fn oversized_ttl_is_an_error_not_a_wrapped_expiry() {
        let codec = TokenCodec::new(
            "unit-secret",
            "ev-charging-network",
            "ev-charging-users",
            Duration::from_secs(u64::MAX),
        );
        assert!(codec.issue(&admin()).is_err());
    }

    #[test]
    fn garbage_input_is_invalid_not_a_panic() {
        let codec = codec();
        assert!(codec.verify("").is_none());
        assert!(codec.verify("a.b.c").is_none());
        assert!(codec.verify("not a token at all").is_none());
    }
}
