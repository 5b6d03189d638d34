use serde::Serialize;
use sqlx::{FromRow, Row, sqlite::SqliteRow};

use crate::features::submissions::models::{DesiredLocationRecord, SubmissionRecord};

use super::filter::FilterSet;

/// 为分组计数行生成结构体：分组列名即 JSON 字段名
macro_rules! group_count {
    ($(#[$doc:meta])* $name:ident, $field:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
        pub struct $name {
            pub $field: String,
            pub count: i64,
        }

        impl<'r> FromRow<'r, SqliteRow> for $name {
            fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
                Ok(Self {
                    $field: row.try_get(stringify!($field))?,
                    count: row.try_get("count")?,
                })
            }
        }
    };
}

group_count!(VehicleTypeCount, vehicle_type);
group_count!(UsageTypeCount, usage_type);
group_count!(ChargingLocationCount, primary_charging_location);
group_count!(
    /// 按日均里程分档计数
    KmRangeCount,
    average_kms_per_day
);
group_count!(
    /// 按期望地点标签计数（经联表过滤）
    DesiredLocationCount,
    identifier
);
group_count!(
    /// 按 `YYYY-MM` 月份计数
    MonthlyCount,
    month
);

/// 仪表盘消费的聚合结果；每次请求重新计算
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResult {
    pub vehicle_types: Vec<VehicleTypeCount>,
    pub usage_types: Vec<UsageTypeCount>,
    pub charging_locations: Vec<ChargingLocationCount>,
    pub km_ranges: Vec<KmRangeCount>,
    pub desired_location_counts: Vec<DesiredLocationCount>,
    /// 最近 12 个月，月份倒序
    pub monthly_data: Vec<MonthlyCount>,
    pub total_submissions: i64,
    pub total_locations: i64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsMeta {
    pub total_submissions: i64,
    pub total_locations: i64,
    pub timestamp: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AnalyticsResponse {
    pub success: bool,
    pub data: AnalyticsResult,
    pub filters: FilterSet,
    pub meta: AnalyticsMeta,
}

/// `GET /analytics` 的视图选择：`type=submissions` 返回原始行而非聚合
#[derive(Debug, Default, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyticsView {
    #[serde(default, rename = "type")]
    pub view: Option<String>,
}

impl AnalyticsView {
    pub fn wants_raw_rows(&self) -> bool {
        self.view.as_deref().map(str::trim) == Some("submissions")
    }
}

/// POST 形式的请求体：`{ "filters": { ... } }`
#[derive(Debug, Default, serde::Deserialize, utoipa::ToSchema)]
pub struct AnalyticsRequest {
    #[serde(default)]
    pub filters: FilterSet,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RawSubmissionData {
    pub submissions: Vec<SubmissionRecord>,
    pub locations: Vec<DesiredLocationRecord>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawSubmissionMeta {
    pub submission_count: usize,
    pub location_count: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RawSubmissionResponse {
    pub success: bool,
    pub data: RawSubmissionData,
    pub meta: RawSubmissionMeta,
}
