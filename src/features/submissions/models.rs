use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, sqlite::SqliteRow};

/// 日均里程的固定分档
pub const DISTANCE_BUCKETS: [&str; 3] = [
    "Menos de 10Km",
    "Más de 10Km y menos de 50Km",
    "Por encima de 50Km",
];

#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct Coordinates {
    #[serde(default)]
    #[schema(example = 19.4326)]
    pub lat: Option<f64>,
    #[serde(default)]
    #[schema(example = -99.1332)]
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct DesiredLocationInput {
    /// 自由文本标签，例如 home / work
    #[serde(default)]
    #[schema(example = "work")]
    pub identifier: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

/// 公开表单的原始请求体；所有字段先按可选接收，缺失项在校验阶段统一列出
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionForm {
    #[serde(default)]
    #[schema(example = "SUV")]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub brand_model: Option<String>,
    #[serde(default)]
    pub usage_type: Option<String>,
    #[serde(default)]
    #[schema(example = "Menos de 10Km")]
    pub average_kms_per_day: Option<String>,
    #[serde(default)]
    pub preference_connector: Option<String>,
    #[serde(default)]
    pub usual_charging_schedule: Option<String>,
    #[serde(default)]
    pub primary_charging_location: Option<String>,
    #[serde(default)]
    pub charging_address: Option<String>,
    #[serde(default)]
    pub charger_type: Option<String>,
    #[serde(default)]
    pub cost_per_km_charged: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub desired_locations: Vec<DesiredLocationInput>,
    #[serde(default)]
    pub current_charging_location: Coordinates,
}

/// 通过校验、可直接入库的期望地点
#[derive(Debug, Clone)]
pub struct NewDesiredLocation {
    pub identifier: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// 通过校验、可直接入库的提交
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub vehicle_type: String,
    pub brand_model: String,
    pub usage_type: String,
    pub average_kms_per_day: String,
    pub preference_connector: Option<String>,
    pub usual_charging_schedule: Option<String>,
    pub primary_charging_location: String,
    pub charging_address: String,
    pub charging_latitude: Option<f64>,
    pub charging_longitude: Option<f64>,
    pub charger_type: String,
    pub cost_per_km_charged: Option<String>,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub desired_locations: Vec<NewDesiredLocation>,
}

/// 提交表中的一行（字段名与列名一致）
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct SubmissionRecord {
    pub id: i64,
    pub vehicle_type: String,
    pub brand_model: String,
    pub usage_type: String,
    pub average_kms_per_day: String,
    pub preference_connector: Option<String>,
    pub usual_charging_schedule: Option<String>,
    pub primary_charging_location: String,
    pub charging_address: String,
    pub charging_latitude: Option<f64>,
    pub charging_longitude: Option<f64>,
    pub charger_type: String,
    pub cost_per_km_charged: Option<String>,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl<'r> FromRow<'r, SqliteRow> for SubmissionRecord {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            vehicle_type: row.try_get("vehicle_type")?,
            brand_model: row.try_get("brand_model")?,
            usage_type: row.try_get("usage_type")?,
            average_kms_per_day: row.try_get("average_kms_per_day")?,
            preference_connector: row.try_get("preference_connector")?,
            usual_charging_schedule: row.try_get("usual_charging_schedule")?,
            primary_charging_location: row.try_get("primary_charging_location")?,
            charging_address: row.try_get("charging_address")?,
            charging_latitude: row.try_get("charging_latitude")?,
            charging_longitude: row.try_get("charging_longitude")?,
            charger_type: row.try_get("charger_type")?,
            cost_per_km_charged: row.try_get("cost_per_km_charged")?,
            full_name: row.try_get("full_name")?,
            phone: row.try_get("phone")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// 期望地点表中的一行
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct DesiredLocationRecord {
    pub id: i64,
    pub submission_id: i64,
    pub identifier: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: String,
}

impl<'r> FromRow<'r, SqliteRow> for DesiredLocationRecord {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            submission_id: row.try_get("submission_id")?,
            identifier: row.try_get("identifier")?,
            address: row.try_get("address")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// 提交与其期望地点的原始行（地图/热力图、导出使用）
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct SubmissionSet {
    pub submissions: Vec<SubmissionRecord>,
    pub locations: Vec<DesiredLocationRecord>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub submission_id: i64,
    pub email: String,
    pub desired_locations_count: usize,
    /// RFC 3339
    pub timestamp: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub submission_id: i64,
    #[schema(example = "Form submitted successfully")]
    pub message: String,
    pub data: SubmitReceipt,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 页码，从 1 开始
    pub page: Option<i64>,
    /// 每页条数，1..=100
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SubmissionPage {
    pub submissions: Vec<SubmissionRecord>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ExportResponse {
    pub success: bool,
    pub submissions: Vec<SubmissionRecord>,
    pub locations: Vec<DesiredLocationRecord>,
    pub total: usize,
}
