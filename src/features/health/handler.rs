use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub connected: bool,
    /// 计数查询是否成功
    pub operational: bool,
    pub total_submissions: i64,
}

/// 健康检查响应
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// healthy | degraded | unhealthy
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "ev-charging-backend")]
    pub service: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    pub database: DatabaseHealth,
    pub response_time_ms: u64,
    pub timestamp: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct HealthActionRequest {
    #[serde(default)]
    #[schema(example = "init-database")]
    pub action: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthActionResponse {
    pub success: bool,
    pub message: String,
    pub submission_count: i64,
    pub timestamp: String,
}

#[utoipa::path(
    get,
    path = "/health",
    summary = "健康检查",
    description = "探测数据库连接并统计提交数量。连接失败返回 503；连接正常但计数失败返回 206（degraded）。",
    responses(
        (status = 200, description = "服务健康", body = HealthResponse),
        (status = 206, description = "服务降级", body = HealthResponse),
        (status = 503, description = "数据库不可用", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let started = Instant::now();

    let connected = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("健康检查：数据库不可达: {}", e);
            false
        }
    };
    let count = if connected {
        state.submissions.count().await.ok()
    } else {
        None
    };

    let (status, label) = match (connected, count) {
        (false, _) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
        (true, None) => (StatusCode::PARTIAL_CONTENT, "degraded"),
        (true, Some(_)) => (StatusCode::OK, "healthy"),
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: DatabaseHealth {
                connected,
                operational: count.is_some(),
                total_submissions: count.unwrap_or(0),
            },
            response_time_ms: started.elapsed().as_millis() as u64,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    )
}

#[utoipa::path(
    post,
    path = "/health",
    summary = "维护操作",
    description = "目前仅支持 `{\"action\": \"init-database\"}`：幂等地重新建表并返回提交数量。",
    request_body = HealthActionRequest,
    responses(
        (status = 200, description = "执行成功", body = HealthActionResponse),
        (status = 400, description = "未知操作", body = crate::error::ProblemDetails),
        (status = 503, description = "数据库不可用", body = crate::error::ProblemDetails)
    ),
    tag = "Health"
)]
pub async fn health_action(
    State(state): State<AppState>,
    payload: Result<Json<HealthActionRequest>, JsonRejection>,
) -> Result<Json<HealthActionResponse>, AppError> {
    let Json(req) = payload?;
    if req.action != "init-database" {
        return Err(AppError::Validation(
            "Invalid action. Use \"init-database\" to initialize the database.".into(),
        ));
    }
    state.db.init_schema().await?;
    let submission_count = state.submissions.count().await?;
    tracing::info!(submission_count, "数据库初始化完成");
    Ok(Json(HealthActionResponse {
        success: true,
        message: "Database initialized successfully".into(),
        submission_count,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

pub fn create_health_router() -> Router<AppState> {
    Router::<AppState>::new().route("/health", get(health_check).post(health_action))
}
