use std::path::Path;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};

use crate::config::DatabaseConfig;
use crate::error::AppError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS ev_form_submissions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    vehicle_type TEXT NOT NULL,
    brand_model TEXT NOT NULL,
    usage_type TEXT NOT NULL,
    average_kms_per_day TEXT NOT NULL,
    preference_connector TEXT,
    usual_charging_schedule TEXT,
    primary_charging_location TEXT NOT NULL,
    charging_address TEXT NOT NULL,
    charging_latitude REAL,
    charging_longitude REAL,
    charger_type TEXT NOT NULL,
    cost_per_km_charged TEXT,
    full_name TEXT NOT NULL,
    phone TEXT NOT NULL,
    email TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_submissions_vehicle_type ON ev_form_submissions(vehicle_type);
CREATE INDEX IF NOT EXISTS idx_submissions_usage_type ON ev_form_submissions(usage_type);
CREATE INDEX IF NOT EXISTS idx_submissions_charging_location ON ev_form_submissions(primary_charging_location);
CREATE INDEX IF NOT EXISTS idx_submissions_created_at ON ev_form_submissions(created_at);
CREATE INDEX IF NOT EXISTS idx_submissions_email ON ev_form_submissions(email);

CREATE TABLE IF NOT EXISTS desired_locations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    submission_id INTEGER NOT NULL REFERENCES ev_form_submissions(id) ON DELETE CASCADE,
    identifier TEXT NOT NULL CHECK (length(trim(identifier)) > 0),
    address TEXT NOT NULL,
    latitude REAL,
    longitude REAL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_locations_submission_id ON desired_locations(submission_id);
CREATE INDEX IF NOT EXISTS idx_locations_identifier ON desired_locations(identifier);
CREATE INDEX IF NOT EXISTS idx_locations_coordinates ON desired_locations(latitude, longitude);
"#;

/// 共享的 SQLite 连接池句柄（启动时创建一次，经 AppState 显式传递）
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// 按配置建立有界连接池：最多 `max_connections` 个在途查询，超出的请求排队直到
    /// 拿到连接或 `acquire_timeout` 到期。
    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self, AppError> {
        if let Some(parent) = Path::new(&cfg.path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Internal(format!("create database dir: {e}")))?;
        }

        let journal = if cfg.wal {
            SqliteJournalMode::Wal
        } else {
            SqliteJournalMode::Delete
        };
        let opt = SqliteConnectOptions::new()
            .filename(Path::new(&cfg.path))
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(journal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(cfg.max_connections.max(1))
            .acquire_timeout(cfg.acquire_timeout())
            .connect_with(opt)
            .await
            .map_err(|e| AppError::Storage(format!("sqlite connect: {e}")))?;

        tracing::info!(
            path = %cfg.path,
            max_connections = cfg.max_connections,
            "数据库连接池已建立"
        );
        Ok(Self { pool })
    }

    /// 幂等建表
    pub async fn init_schema(&self) -> Result<(), AppError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Storage(format!("init schema: {e}")))?;
        Ok(())
    }

    /// 探活：执行一次最简单的查询
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Storage(format!("ping: {e}")))?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
