use sqlx::SqlitePool;

use crate::error::AppError;
use crate::features::analytics::filter::{FilterSet, Predicate};

use super::models::{DesiredLocationRecord, NewSubmission, SubmissionRecord, SubmissionSet};

/// 提交与期望地点的读写
#[derive(Clone)]
pub struct SubmissionStore {
    pool: SqlitePool,
}

impl SubmissionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 在同一事务中写入提交及其全部期望地点，返回新提交的 id。
    ///
    /// 任一写入失败时整个事务回滚（`Transaction` 在未提交时被丢弃即回滚），
    /// 读者不会看到缺少父记录或只写了一半地点的提交。
    pub async fn insert(&self, submission: &NewSubmission) -> Result<i64, AppError> {
        let now = chrono::Utc::now().to_rfc3339();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Storage(format!("begin tx: {e}")))?;

        let submission_id = sqlx::query(
            "INSERT INTO ev_form_submissions(
                vehicle_type, brand_model, usage_type, average_kms_per_day,
                preference_connector, usual_charging_schedule,
                primary_charging_location, charging_address, charging_latitude, charging_longitude,
                charger_type, cost_per_km_charged, full_name, phone, email, created_at, updated_at)
             VALUES(?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)",
        )
        .bind(&submission.vehicle_type)
        .bind(&submission.brand_model)
        .bind(&submission.usage_type)
        .bind(&submission.average_kms_per_day)
        .bind(&submission.preference_connector)
        .bind(&submission.usual_charging_schedule)
        .bind(&submission.primary_charging_location)
        .bind(&submission.charging_address)
        .bind(submission.charging_latitude)
        .bind(submission.charging_longitude)
        .bind(&submission.charger_type)
        .bind(&submission.cost_per_km_charged)
        .bind(&submission.full_name)
        .bind(&submission.phone)
        .bind(&submission.email)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Storage(format!("insert submission: {e}")))?
        .last_insert_rowid();

        for (idx, loc) in submission.desired_locations.iter().enumerate() {
            sqlx::query(
                "INSERT INTO desired_locations(submission_id, identifier, address, latitude, longitude, created_at)
                 VALUES(?,?,?,?,?,?)",
            )
            .bind(submission_id)
            .bind(&loc.identifier)
            .bind(&loc.address)
            .bind(loc.latitude)
            .bind(loc.longitude)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Storage(format!("insert desired location #{idx}: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Storage(format!("commit submission: {e}")))?;

        tracing::info!(
            submission_id,
            locations = submission.desired_locations.len(),
            "提交已写入"
        );
        Ok(submission_id)
    }

    /// 按过滤条件读取全部提交与其期望地点（均按创建时间倒序）
    pub async fn list_all(&self, filters: &FilterSet) -> Result<SubmissionSet, AppError> {
        let direct = filters.predicate();
        let joined = filters.predicate_qualified("efs");

        let submissions_sql = format!(
            "SELECT * FROM ev_form_submissions{} ORDER BY created_at DESC, id DESC",
            direct.where_clause()
        );
        let locations_sql = format!(
            "SELECT dl.* FROM desired_locations dl
             JOIN ev_form_submissions efs ON dl.submission_id = efs.id{}
             ORDER BY dl.created_at DESC, dl.id DESC",
            joined.where_clause()
        );

        let (submissions, locations) = tokio::try_join!(
            fetch_rows::<SubmissionRecord>(&self.pool, &submissions_sql, &direct),
            fetch_rows::<DesiredLocationRecord>(&self.pool, &locations_sql, &joined),
        )?;

        tracing::debug!(
            submissions = submissions.len(),
            locations = locations.len(),
            "读取提交与期望地点"
        );
        Ok(SubmissionSet {
            submissions,
            locations,
        })
    }

    /// 分页读取提交（最新在前）与总数
    pub async fn paginate(
        &self,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<SubmissionRecord>, i64), AppError> {
        let offset = page
            .checked_sub(1)
            .and_then(|p| p.checked_mul(limit))
            .ok_or_else(|| AppError::Validation("page out of range".into()))?;
        let rows = sqlx::query_as::<_, SubmissionRecord>(
            "SELECT * FROM ev_form_submissions ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Storage(format!("paginate submissions: {e}")))?;
        let total = self.count().await?;
        Ok((rows, total))
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM ev_form_submissions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Storage(format!("count submissions: {e}")))
    }
}

/// 执行带过滤谓词的查询；参数按谓词列顺序绑定
pub(crate) async fn fetch_rows<T>(
    pool: &SqlitePool,
    sql: &str,
    predicate: &Predicate,
) -> Result<Vec<T>, AppError>
where
    T: for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> + Send + Unpin,
{
    let mut query = sqlx::query_as::<_, T>(sql);
    for value in &predicate.params {
        query = query.bind(value);
    }
    query
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::Storage(format!("query failed: {e}")))
}
