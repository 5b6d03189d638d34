use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, post},
};

use crate::error::AppError;
use crate::features::analytics::filter::FilterSet;
use crate::features::auth::models::Role;
use crate::features::auth::session::SessionState;
use crate::state::AppState;

use super::models::{
    ExportResponse, PageQuery, SubmissionForm, SubmissionPage, SubmitReceipt, SubmitResponse,
};
use super::validation::validate_submission;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

#[utoipa::path(
    post,
    path = "/submit-form",
    summary = "提交表单",
    description = "公开接口。校验通过后在单个事务中写入提交及其全部期望地点；缺失的必填字段会按表单顺序全部列出。",
    request_body = SubmissionForm,
    responses(
        (status = 200, description = "提交成功", body = SubmitResponse),
        (status = 400, description = "校验失败", body = crate::error::ProblemDetails),
        (status = 503, description = "数据库不可用", body = crate::error::ProblemDetails)
    ),
    tag = "Submissions"
)]
pub async fn post_submit_form(
    State(state): State<AppState>,
    payload: Result<Json<SubmissionForm>, JsonRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let Json(form) = payload?;
    let submission = validate_submission(form)?;
    let submission_id = state.submissions.insert(&submission).await?;

    Ok(Json(SubmitResponse {
        success: true,
        submission_id,
        message: "Form submitted successfully".into(),
        data: SubmitReceipt {
            submission_id,
            email: submission.email,
            desired_locations_count: submission.desired_locations.len(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        },
    }))
}

#[utoipa::path(
    get,
    path = "/submissions",
    summary = "分页列出提交",
    description = "按创建时间倒序分页。page 从 1 开始，limit 取值 1..=100（默认 10）。仅管理员可访问。",
    params(PageQuery),
    responses(
        (status = 200, description = "分页结果", body = SubmissionPage),
        (status = 400, description = "分页参数非法", body = crate::error::ProblemDetails),
        (status = 401, description = "未登录", body = crate::error::ProblemDetails),
        (status = 403, description = "需要管理员权限", body = crate::error::ProblemDetails)
    ),
    tag = "Submissions"
)]
pub async fn get_submissions(
    State(state): State<AppState>,
    session: SessionState,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<SubmissionPage>, AppError> {
    session.require(Role::Admin)?;
    let Query(q) = query?;

    let page = q.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::Validation("page must be >= 1".into()));
    }
    let limit = q.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    let (submissions, total) = state.submissions.paginate(page, limit).await?;
    Ok(Json(SubmissionPage {
        submissions,
        total,
        page,
        limit,
    }))
}

#[utoipa::path(
    get,
    path = "/submissions/export",
    summary = "导出全部提交",
    description = "返回全部提交与期望地点的原始行，表格文件由客户端生成。任何已登录身份均可访问。",
    responses(
        (status = 200, description = "导出数据", body = ExportResponse),
        (status = 401, description = "未登录", body = crate::error::ProblemDetails)
    ),
    tag = "Submissions"
)]
pub async fn get_export(
    State(state): State<AppState>,
    session: SessionState,
) -> Result<Json<ExportResponse>, AppError> {
    let user = session.require(Role::User)?;
    let set = state.submissions.list_all(&FilterSet::default()).await?;
    tracing::info!(user_id = %user.id, rows = set.submissions.len(), "submissions exported");
    Ok(Json(ExportResponse {
        success: true,
        total: set.submissions.len(),
        submissions: set.submissions,
        locations: set.locations,
    }))
}

pub fn create_submissions_router() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/submit-form", post(post_submit_form))
        .route("/submissions", get(get_submissions))
        .route("/submissions/export", get(get_export))
}
