use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::features::auth::models::Role;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// 开发模式：错误响应附带存储/内部错误的诊断细节
    #[serde(default)]
    pub development: bool,
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API 路由前缀
    pub prefix: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别（RUST_LOG 优先）
    pub level: String,
    /// 日志格式：full | compact
    pub format: String,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite 文件路径
    #[serde(default = "DatabaseConfig::default_path")]
    pub path: String,
    /// 是否启用 WAL
    #[serde(default = "DatabaseConfig::default_wal")]
    pub wal: bool,
    /// 连接池上限（同时在途的查询数）
    #[serde(default = "DatabaseConfig::default_max_connections")]
    pub max_connections: u32,
    /// 获取连接的超时时间（秒）
    #[serde(default = "DatabaseConfig::default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    fn default_path() -> String {
        "./data/ev_charging_network.db".to_string()
    }
    fn default_wal() -> bool {
        true
    }
    fn default_max_connections() -> u32 {
        10
    }
    fn default_acquire_timeout() -> u64 {
        60
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs.max(1))
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            wal: Self::default_wal(),
            max_connections: Self::default_max_connections(),
            acquire_timeout_secs: Self::default_acquire_timeout(),
        }
    }
}

/// 账号种子：部署时写入，运行期只读
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSeed {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: Role,
    /// PHC 格式口令哈希（推荐）
    #[serde(default)]
    pub password_hash: Option<String>,
    /// 明文口令，启动时哈希一次；与 `password_hash` 同时存在时以哈希为准
    #[serde(default)]
    pub password: Option<String>,
}

/// 认证与会话配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT 签名密钥（留空时读取环境变量 JWT_SECRET）
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "AuthConfig::default_issuer")]
    pub jwt_issuer: String,
    #[serde(default = "AuthConfig::default_audience")]
    pub jwt_audience: String,
    /// 会话令牌有效期（秒），默认 7 天
    #[serde(default = "AuthConfig::default_ttl")]
    pub token_ttl_secs: u64,
    #[serde(default = "AuthConfig::default_cookie_name")]
    pub cookie_name: String,
    /// Cookie 是否附带 Secure
    #[serde(default)]
    pub cookie_secure: bool,
    /// 账号列表；为空时使用演示账号
    #[serde(default)]
    pub accounts: Vec<AccountSeed>,
}

impl AuthConfig {
    fn default_issuer() -> String {
        "ev-charging-network".to_string()
    }
    fn default_audience() -> String {
        "ev-charging-users".to_string()
    }
    fn default_ttl() -> u64 {
        7 * 24 * 60 * 60
    }
    fn default_cookie_name() -> String {
        "auth-token".to_string()
    }

    /// 解析签名密钥：配置优先，其次环境变量 `JWT_SECRET`；都为空时拒绝启动。
    pub fn resolve_jwt_secret(&self) -> Result<String, ConfigError> {
        if !self.jwt_secret.trim().is_empty() {
            return Ok(self.jwt_secret.clone());
        }
        let from_env = std::env::var("JWT_SECRET").unwrap_or_default();
        if !from_env.trim().is_empty() {
            return Ok(from_env);
        }
        Err(ConfigError::Message(
            "auth.jwt_secret 未配置（可通过 APP_AUTH__JWT_SECRET 或 JWT_SECRET 设置）".into(),
        ))
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs.max(60))
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: Self::default_issuer(),
            jwt_audience: Self::default_audience(),
            token_ttl_secs: Self::default_ttl(),
            cookie_name: Self::default_cookie_name(),
            cookie_secure: false,
            accounts: Vec::new(),
        }
    }
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// 是否启用 CORS
    #[serde(default)]
    pub enabled: bool,
    /// 允许的 Origin 列表（支持 "*" 表示任意）
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// 允许的方法列表（支持 "*" 表示任意）
    #[serde(default)]
    pub allowed_methods: Vec<String>,
    /// 允许的请求头列表（支持 "*" 表示任意）
    #[serde(default)]
    pub allowed_headers: Vec<String>,
    /// 是否允许携带凭证（Cookie/Authorization）
    #[serde(default)]
    pub allow_credentials: bool,
    /// 预检缓存时间（秒）
    #[serde(default)]
    pub max_age_secs: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_origins: Vec::new(),
            allowed_methods: Vec::new(),
            allowed_headers: Vec::new(),
            allow_credentials: false,
            max_age_secs: None,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl AppConfig {
    /// 从配置文件加载配置，支持环境变量覆盖（例如 `APP_SERVER__PORT=8080`）
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path();

        tracing::info!("正在从 {:?} 加载配置文件", config_path);

        let defaults = ConfigBuilder::try_from(&Self::default())?;
        let builder = ConfigBuilder::builder()
            .add_source(defaults)
            .add_source(File::from(config_path).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        builder.try_deserialize()
    }

    /// 获取配置文件路径
    fn get_config_path() -> PathBuf {
        std::env::var("APP_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"))
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                development: false,
            },
            api: ApiConfig {
                prefix: "/api".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "full".to_string(),
            },
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}
