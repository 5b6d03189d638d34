use std::sync::Arc;

use ev_charging_backend::app::build_app_from_config;
use ev_charging_backend::config::AppConfig;
use ev_charging_backend::database::Database;
use ev_charging_backend::features::auth::{
    repository::InMemoryAccountRepository, session::SessionSettings, token::TokenCodec,
};
use ev_charging_backend::shutdown::shutdown_signal;
use ev_charging_backend::state::AppState;

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "ev_charging_backend={level},tower_http={level}",
            level = config.logging.level
        )
        .into()
    });
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.format == "compact" {
        builder.compact().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config init failed: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(&config);

    let secret = match config.auth.resolve_jwt_secret() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("JWT 密钥缺失: {}", e);
            std::process::exit(1);
        }
    };
    let tokens = Arc::new(TokenCodec::from_config(&config.auth, &secret));

    let seeds = if config.auth.accounts.is_empty() {
        tracing::warn!("未配置 auth.accounts，使用演示账号（admin / demo），请勿用于生产环境");
        InMemoryAccountRepository::demo_seeds()
    } else {
        config.auth.accounts.clone()
    };
    let accounts = match InMemoryAccountRepository::from_seeds(&seeds) {
        Ok(r) => Arc::new(r),
        Err(e) => {
            tracing::error!("账号初始化失败: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("已加载 {} 个账号", accounts.len());

    let db = match Database::connect(&config.database).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("数据库连接失败: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = db.init_schema().await {
        tracing::error!("数据库建表失败: {}", e);
        std::process::exit(1);
    }

    let shutdown = match shutdown_signal() {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("信号处理器启动失败: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(
        db.clone(),
        tokens,
        accounts,
        SessionSettings::from_config(&config.auth),
    );
    let app = build_app_from_config(state, &config);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("Server: http://{}", addr);
    tracing::info!("OpenAPI: http://{}/api-docs/openapi.json", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!("API prefix: {}", config.api.prefix);
    if config.server.development {
        tracing::warn!("开发模式已开启：错误响应将附带诊断细节");
    }

    let graceful = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown.await;
        tracing::info!("开始优雅关闭HTTP服务器...");
    });

    if let Err(e) = graceful.await {
        tracing::error!("服务器运行错误: {}", e);
        std::process::exit(1);
    }

    db.close().await;
    tracing::info!("服务器已优雅关闭");
}
