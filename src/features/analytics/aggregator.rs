use sqlx::SqlitePool;

use crate::error::AppError;
use crate::features::submissions::storage::fetch_rows;

use super::filter::{FilterSet, Predicate};
use super::models::{
    AnalyticsResult, ChargingLocationCount, DesiredLocationCount, KmRangeCount, MonthlyCount,
    UsageTypeCount, VehicleTypeCount,
};

const JOIN_ALIAS: &str = "efs";
const LOCATIONS_JOIN: &str =
    "FROM desired_locations dl JOIN ev_form_submissions efs ON dl.submission_id = efs.id";

/// 对提交数据做分组计数的聚合器
#[derive(Clone)]
pub struct AnalyticsAggregator {
    pool: SqlitePool,
}

impl AnalyticsAggregator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 以同一组过滤条件并发执行六个分组查询与两个总数查询。
    ///
    /// 直接查询提交表时使用不带别名的谓词，联表查询使用 `efs.` 限定的谓词；
    /// 两者参数顺序一致。计数相同的分组之间没有额外的排序键。
    pub async fn aggregate(&self, filters: &FilterSet) -> Result<AnalyticsResult, AppError> {
        let direct = filters.predicate();
        let joined = filters.predicate_qualified(JOIN_ALIAS);
        let w = direct.where_clause();
        let jw = joined.where_clause();

        let vehicle_sql = grouped("vehicle_type", &w);
        let usage_sql = grouped("usage_type", &w);
        let location_sql = grouped("primary_charging_location", &w);
        let km_sql = grouped("average_kms_per_day", &w);
        let desired_sql = format!(
            "SELECT dl.identifier AS identifier, COUNT(*) AS count {LOCATIONS_JOIN}{jw} \
             GROUP BY dl.identifier ORDER BY count DESC"
        );
        let monthly_sql = format!(
            "SELECT substr(created_at, 1, 7) AS month, COUNT(*) AS count \
             FROM ev_form_submissions{w} GROUP BY month ORDER BY month DESC LIMIT 12"
        );
        let total_submissions_sql = format!("SELECT COUNT(*) FROM ev_form_submissions{w}");
        let total_locations_sql = format!("SELECT COUNT(dl.id) {LOCATIONS_JOIN}{jw}");

        let (
            vehicle_types,
            usage_types,
            charging_locations,
            km_ranges,
            desired_location_counts,
            monthly_data,
            total_submissions,
            total_locations,
        ) = tokio::try_join!(
            fetch_rows::<VehicleTypeCount>(&self.pool, &vehicle_sql, &direct),
            fetch_rows::<UsageTypeCount>(&self.pool, &usage_sql, &direct),
            fetch_rows::<ChargingLocationCount>(&self.pool, &location_sql, &direct),
            fetch_rows::<KmRangeCount>(&self.pool, &km_sql, &direct),
            fetch_rows::<DesiredLocationCount>(&self.pool, &desired_sql, &joined),
            fetch_rows::<MonthlyCount>(&self.pool, &monthly_sql, &direct),
            fetch_total(&self.pool, &total_submissions_sql, &direct),
            fetch_total(&self.pool, &total_locations_sql, &joined),
        )?;

        tracing::debug!(
            total_submissions,
            total_locations,
            filtered = !filters.is_empty(),
            "analytics aggregated"
        );

        Ok(AnalyticsResult {
            vehicle_types,
            usage_types,
            charging_locations,
            km_ranges,
            desired_location_counts,
            monthly_data,
            total_submissions,
            total_locations,
        })
    }
}

fn grouped(column: &str, where_clause: &str) -> String {
    format!(
        "SELECT {column}, COUNT(*) AS count FROM ev_form_submissions{where_clause} \
         GROUP BY {column} ORDER BY count DESC"
    )
}

async fn fetch_total(pool: &SqlitePool, sql: &str, predicate: &Predicate) -> Result<i64, AppError> {
    let mut query = sqlx::query_scalar::<_, i64>(sql);
    for value in &predicate.params {
        query = query.bind(value);
    }
    query
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::Storage(format!("count query failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::grouped;

    #[test]
    fn grouped_query_embeds_where_clause_before_group_by() {
        let sql = grouped("usage_type", " WHERE vehicle_type = ?");
        assert_eq!(
            sql,
            "SELECT usage_type, COUNT(*) AS count FROM ev_form_submissions WHERE vehicle_type = ? \
             GROUP BY usage_type ORDER BY count DESC"
        );
    }
}
