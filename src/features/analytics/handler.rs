use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
    routing::get,
};

use crate::error::AppError;
use crate::features::auth::models::Role;
use crate::features::auth::session::SessionState;
use crate::state::AppState;

use super::filter::FilterSet;
use super::models::{
    AnalyticsMeta, AnalyticsRequest, AnalyticsResponse, AnalyticsView, RawSubmissionData,
    RawSubmissionMeta, RawSubmissionResponse,
};

async fn run_analytics(
    state: &AppState,
    filters: FilterSet,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let data = state.analytics.aggregate(&filters).await?;
    let meta = AnalyticsMeta {
        total_submissions: data.total_submissions,
        total_locations: data.total_locations,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    Ok(Json(AnalyticsResponse {
        success: true,
        data,
        filters,
        meta,
    }))
}

async fn raw_submissions(
    state: &AppState,
    filters: &FilterSet,
) -> Result<Json<RawSubmissionResponse>, AppError> {
    let set = state.submissions.list_all(filters).await?;
    let meta = RawSubmissionMeta {
        submission_count: set.submissions.len(),
        location_count: set.locations.len(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    Ok(Json(RawSubmissionResponse {
        success: true,
        data: RawSubmissionData {
            submissions: set.submissions,
            locations: set.locations,
        },
        meta,
    }))
}

#[utoipa::path(
    get,
    path = "/analytics",
    summary = "仪表盘聚合数据",
    description = "按车辆类型、用途、充电地点、里程分档、期望地点标签与月份分组计数，并返回提交与期望地点总数。三个过滤字段缺省或为 all 时不加约束。`type=submissions` 时改为返回原始提交与期望地点（同 /analytics/submissions）。仅管理员可访问。",
    params(FilterSet, AnalyticsView),
    responses(
        (status = 200, description = "聚合结果", body = AnalyticsResponse),
        (status = 401, description = "未登录", body = crate::error::ProblemDetails),
        (status = 403, description = "需要管理员权限", body = crate::error::ProblemDetails),
        (status = 503, description = "数据库不可用", body = crate::error::ProblemDetails)
    ),
    tag = "Analytics"
)]
pub async fn get_analytics(
    State(state): State<AppState>,
    session: SessionState,
    filters: Result<Query<FilterSet>, QueryRejection>,
    view: Result<Query<AnalyticsView>, QueryRejection>,
) -> Result<Response, AppError> {
    session.require(Role::Admin)?;
    let Query(filters) = filters?;
    let Query(view) = view?;
    if view.wants_raw_rows() {
        return Ok(raw_submissions(&state, &filters).await?.into_response());
    }
    Ok(run_analytics(&state, filters).await?.into_response())
}

#[utoipa::path(
    post,
    path = "/analytics",
    summary = "仪表盘聚合数据（请求体过滤）",
    description = "与 GET 相同，过滤条件放在请求体 `filters` 中。",
    request_body = AnalyticsRequest,
    responses(
        (status = 200, description = "聚合结果", body = AnalyticsResponse),
        (status = 401, description = "未登录", body = crate::error::ProblemDetails),
        (status = 403, description = "需要管理员权限", body = crate::error::ProblemDetails)
    ),
    tag = "Analytics"
)]
pub async fn post_analytics(
    State(state): State<AppState>,
    session: SessionState,
    payload: Result<Json<AnalyticsRequest>, JsonRejection>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    session.require(Role::Admin)?;
    let Json(req) = payload?;
    run_analytics(&state, req.filters).await
}

#[utoipa::path(
    get,
    path = "/analytics/submissions",
    summary = "原始提交与期望地点",
    description = "返回满足过滤条件的提交行及其期望地点行，供地图与热力图使用。仅管理员可访问。",
    params(FilterSet),
    responses(
        (status = 200, description = "原始数据", body = RawSubmissionResponse),
        (status = 401, description = "未登录", body = crate::error::ProblemDetails),
        (status = 403, description = "需要管理员权限", body = crate::error::ProblemDetails)
    ),
    tag = "Analytics"
)]
pub async fn get_analytics_submissions(
    State(state): State<AppState>,
    session: SessionState,
    filters: Result<Query<FilterSet>, QueryRejection>,
) -> Result<Json<RawSubmissionResponse>, AppError> {
    session.require(Role::Admin)?;
    let Query(filters) = filters?;
    raw_submissions(&state, &filters).await
}

pub fn create_analytics_router() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/analytics", get(get_analytics).post(post_analytics))
        .route("/analytics/submissions", get(get_analytics_submissions))
}
