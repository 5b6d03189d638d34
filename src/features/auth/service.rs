use std::sync::Arc;

use crate::error::AppError;

use super::models::AuthenticatedUser;
use super::password::verify_password;
use super::repository::AccountRepository;
use super::token::TokenCodec;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// 登录成功的结果：令牌 + 去敏后的账号
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: AuthenticatedUser,
}

/// 登录流程：查账号、校验口令、签发令牌
#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountRepository>,
    tokens: Arc<TokenCodec>,
}

impl AuthService {
    pub fn new(accounts: Arc<dyn AccountRepository>, tokens: Arc<TokenCodec>) -> Self {
        Self { accounts, tokens }
    }

    /// 账号不存在与口令错误返回同一个错误
    pub async fn login(&self, identifier: &str, password: &str) -> Result<LoginOutcome, AppError> {
        if identifier.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email/username and password are required".into(),
            ));
        }

        let Some(account) = self.accounts.find_by_identifier(identifier).await? else {
            tracing::info!(target: "ev_charging_backend::auth", "login rejected: unknown identifier");
            return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
        };

        if !verify_password(password, &account.password_hash)? {
            tracing::info!(
                target: "ev_charging_backend::auth",
                user_id = %account.id,
                "login rejected: password mismatch"
            );
            return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
        }

        let user = account.redacted();
        let token = self.tokens.issue(&user)?;
        tracing::info!(
            target: "ev_charging_backend::auth",
            user_id = %user.id,
            role = user.role.as_str(),
            "login succeeded"
        );
        Ok(LoginOutcome { token, user })
    }
}
