use async_trait::async_trait;

use crate::config::AccountSeed;
use crate::error::AppError;

use super::models::{Account, Role};
use super::password::hash_password;

/// 账号仓库：登录流程只依赖此接口，可替换为数据库实现
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// 按邮箱或用户名精确查找（大小写敏感）
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, AppError>;
}

/// 部署时写死的内存账号表
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: Vec<Account>,
}

impl InMemoryAccountRepository {
    /// 由配置构建；明文口令在此处哈希一次，之后只保留哈希
    pub fn from_seeds(seeds: &[AccountSeed]) -> Result<Self, AppError> {
        let mut accounts = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let password_hash = match (&seed.password_hash, &seed.password) {
                (Some(hash), _) if !hash.trim().is_empty() => hash.clone(),
                (_, Some(plain)) if !plain.is_empty() => hash_password(plain)?,
                _ => {
                    return Err(AppError::Internal(format!(
                        "账号 {} 缺少 password_hash 或 password",
                        seed.username
                    )));
                }
            };
            if accounts
                .iter()
                .any(|a: &Account| a.username == seed.username || a.email == seed.email)
            {
                return Err(AppError::Internal(format!(
                    "账号 {} 的用户名或邮箱重复",
                    seed.username
                )));
            }
            accounts.push(Account {
                id: seed.id.clone(),
                email: seed.email.clone(),
                username: seed.username.clone(),
                password_hash,
                role: seed.role,
            });
        }
        Ok(Self { accounts })
    }

    /// 演示部署使用的默认账号
    pub fn demo_seeds() -> Vec<AccountSeed> {
        vec![
            AccountSeed {
                id: "1".into(),
                email: "admin@evcharging.com".into(),
                username: "admin".into(),
                role: Role::Admin,
                password_hash: None,
                password: Some("admin123".into()),
            },
            AccountSeed {
                id: "2".into(),
                email: "demo@evcharging.com".into(),
                username: "demo".into(),
                role: Role::User,
                password_hash: None,
                password: Some("demo123".into()),
            },
        ]
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>, AppError> {
        Ok(self
            .accounts
            .iter()
            .find(|a| a.email == identifier || a.username == identifier)
            .cloned())
    }
}
