use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用统一错误类型
///
/// `Display` 输出即为返回给调用方的 `message`，因此认证类错误只携带通用文案，
/// 不区分“账号不存在 / 口令错误 / 令牌过期”等具体原因。
#[derive(Error, Debug, utoipa::ToSchema)]
pub enum AppError {
    /// 未认证（凭据错误、缺少或无效的会话令牌）
    #[error("{0}")]
    Auth(String),

    /// 已认证但角色不足
    #[error("{0}")]
    Forbidden(String),

    /// 参数校验错误
    #[error("{0}")]
    Validation(String),

    /// 缺少必填字段（按表单字段顺序列出）
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// 存储不可用（连接失败、查询失败、事务失败）
    #[error("存储错误: {0}")]
    Storage(String),

    /// 内部服务器错误
    #[error("内部错误: {0}")]
    Internal(String),
}

/// RFC7807 风格的错误响应（Problem Details）。
///
/// 额外保留 `success` / `message` 两个字段，兼容仪表盘前端既有的 `{success, message}` 判定方式。
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// 问题类型（URI）。若无更细分的类型，可使用 about:blank。
    #[serde(rename = "type")]
    #[schema(example = "about:blank")]
    pub type_url: String,

    /// 简短标题，用于概括错误。
    #[schema(example = "Unauthorized")]
    pub title: String,

    /// HTTP 状态码（与响应 status 一致）。
    #[schema(example = 401)]
    pub status: u16,

    /// 恒为 false。
    pub success: bool,

    /// 面向用户的提示文案（认证类错误为通用文案）。
    #[schema(example = "Invalid credentials")]
    pub message: String,

    /// 诊断细节；存储/内部错误仅在开发模式下返回。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// 稳定的错误码，用于程序化处理。
    #[schema(example = "UNAUTHORIZED")]
    pub code: String,

    /// 可选：请求追踪 ID。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// 可选：字段级校验错误。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ProblemFieldError>>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemFieldError {
    /// 字段名（camelCase）。
    pub field: String,
    /// 字段错误信息。
    pub message: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::MissingFields(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn stable_code(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Validation(_) => "VALIDATION_FAILED",
            AppError::MissingFields(_) => "MISSING_FIELDS",
            AppError::Storage(_) => "SERVICE_UNAVAILABLE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn title(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "Bad Request",
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::FORBIDDEN => "Forbidden",
            StatusCode::SERVICE_UNAVAILABLE => "Service Unavailable",
            StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
            _ => "Error",
        }
    }

    /// 返回给调用方的文案；存储/内部错误统一为固定文案，细节走 `detail`。
    fn public_message(&self) -> String {
        match self {
            AppError::Storage(_) => "Unable to reach the database, please try again later".into(),
            AppError::Internal(_) => "Internal server error".into(),
            other => other.to_string(),
        }
    }

    fn diagnostic_detail(&self) -> Option<String> {
        match self {
            AppError::Storage(d) | AppError::Internal(d) => {
                crate::request_context::diagnostics_enabled().then(|| d.clone())
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Storage(d) => {
                tracing::error!(target: "ev_charging_backend::error", "storage failure: {}", d)
            }
            AppError::Internal(d) => {
                tracing::error!(target: "ev_charging_backend::error", "internal failure: {}", d)
            }
            _ => {}
        }

        let errors = match &self {
            AppError::MissingFields(fields) => Some(
                fields
                    .iter()
                    .map(|f| ProblemFieldError {
                        field: f.clone(),
                        message: "required".to_string(),
                    })
                    .collect(),
            ),
            _ => None,
        };

        let problem = ProblemDetails {
            type_url: "about:blank".to_string(),
            title: self.title().to_string(),
            status: status.as_u16(),
            success: false,
            message: self.public_message(),
            detail: self.diagnostic_detail(),
            code: self.stable_code().to_string(),
            request_id: crate::request_context::current_request_id(),
            errors,
        };

        let mut res = Json(problem).into_response();
        *res.status_mut() = status;
        res.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        res
    }
}

// =============== Error conversions for common external errors ===============

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(format!("Invalid query string: {}", rejection.body_text()))
    }
}
