use serde::{Deserialize, Serialize};

/// 账号角色。`Admin` 满足所有角色要求，`User` 仅满足 `User` 要求。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// 当前角色是否满足 `required` 的访问要求
    pub fn satisfies(self, required: Role) -> bool {
        match required {
            Role::User => matches!(self, Role::Admin | Role::User),
            Role::Admin => self == Role::Admin,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// 可登录账号（含口令哈希，仅在服务端流转）
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

impl Account {
    /// 去掉口令哈希后的对外视图
    pub fn redacted(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            id: self.id.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// 已认证身份。由会话令牌中的声明还原，不回查账号仓库。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AuthenticatedUser {
    #[schema(example = "1")]
    pub id: String,
    #[schema(example = "admin@evcharging.com")]
    pub email: String,
    #[schema(example = "admin")]
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// 邮箱或用户名（大小写敏感，精确匹配）
    #[serde(default)]
    #[schema(example = "admin")]
    pub identifier: String,
    #[serde(default)]
    #[schema(example = "admin123")]
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub user: AuthenticatedUser,
    #[schema(example = "Authentication successful")]
    pub message: String,
    /// 同时写入 Cookie；此处返回供无法使用 Cookie 的客户端以 Bearer 方式携带
    pub token: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VerifyResponse {
    pub success: bool,
    pub user: AuthenticatedUser,
    #[schema(example = "User authenticated")]
    pub message: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LogoutResponse {
    pub success: bool,
    #[schema(example = "Logged out")]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::Role;

    #[test]
    fn admin_satisfies_both_roles() {
        assert!(Role::Admin.satisfies(Role::Admin));
        assert!(Role::Admin.satisfies(Role::User));
    }

    #[test]
    fn user_satisfies_only_user() {
        assert!(Role::User.satisfies(Role::User));
        assert!(!Role::User.satisfies(Role::Admin));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let r: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(r, Role::User);
    }
}
