//! 活跃告警仓库

use crate::db::PostgresPool;
use crate::errors::AppError;
use crate::models::{ActiveAlertSet, AlertKey, AlertRecord};

/// 活跃告警存储接口
#[async_trait::async_trait]
pub trait AlertStore: Send + Sync {
    /// 按唯一键查找
    async fn find(&self, key: &AlertKey) -> Result<Option<AlertRecord>, AppError>;

    /// 插入或刷新；已存在时不修改 `alert_started_at`
    async fn upsert(&self, record: &AlertRecord) -> Result<(), AppError>;

    /// 删除所有不在当前严重集合中的告警，返回删除条数
    async fn delete_stale(&self, active: &ActiveAlertSet) -> Result<u64, AppError>;

    /// 全部活跃告警，按开始时间排序
    async fn list_active(&self) -> Result<Vec<AlertRecord>, AppError>;

    /// 单个 PDU 的活跃告警
    async fn list_for_pdu(&self, pdu_id: &str) -> Result<Vec<AlertRecord>, AppError>;

    /// 存储是否可达；失败时返回 `StoreUnavailable`
    async fn health_check(&self) -> Result<(), AppError>;
}

/// 活跃告警仓库
#[derive(Clone)]
pub struct AlertRepository {
    pool: PostgresPool,
}

impl AlertRepository {
    pub fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AlertStore for AlertRepository {
    async fn find(&self, key: &AlertKey) -> Result<Option<AlertRecord>, AppError> {
        let record = sqlx::query_as::<_, AlertRecord>(
            r#"
            SELECT * FROM active_alerts
            WHERE pdu_id = $1 AND metric_type = $2 AND alert_reason = $3
            "#,
        )
        .bind(&key.pdu_id)
        .bind(key.metric_type)
        .bind(key.reason.to_string())
        .fetch_optional(self.pool.pool())
        .await?;

        Ok(record)
    }

    async fn upsert(&self, record: &AlertRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO active_alerts (
                id, pdu_id, rack_id, metric_type, alert_reason, alert_value,
                threshold_exceeded, alert_started_at, last_updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (pdu_id, metric_type, alert_reason) DO UPDATE SET
                rack_id = EXCLUDED.rack_id,
                alert_value = EXCLUDED.alert_value,
                threshold_exceeded = EXCLUDED.threshold_exceeded,
                last_updated_at = EXCLUDED.last_updated_at
            "#,
        )
        .bind(record.id)
        .bind(&record.pdu_id)
        .bind(&record.rack_id)
        .bind(record.metric_type)
        .bind(&record.alert_reason)
        .bind(record.alert_value)
        .bind(record.threshold_exceeded)
        .bind(record.alert_started_at)
        .bind(record.last_updated_at)
        .execute(self.pool.pool())
        .await?;

        Ok(())
    }

    async fn delete_stale(&self, active: &ActiveAlertSet) -> Result<u64, AppError> {
        let (pdu_ids, reasons) = active.to_columns();

        // 集合差：保留 (pdu_id, alert_reason) 仍在当前严重集合中的记录
        let result = sqlx::query(
            r#"
            DELETE FROM active_alerts a
            WHERE NOT EXISTS (
                SELECT 1 FROM UNNEST($1::text[], $2::text[]) AS k(pdu_id, alert_reason)
                WHERE k.pdu_id = a.pdu_id AND k.alert_reason = a.alert_reason
            )
            "#,
        )
        .bind(&pdu_ids)
        .bind(&reasons)
        .execute(self.pool.pool())
        .await?;

        Ok(result.rows_affected())
    }

    async fn list_active(&self) -> Result<Vec<AlertRecord>, AppError> {
        let records = sqlx::query_as::<_, AlertRecord>(
            "SELECT * FROM active_alerts ORDER BY alert_started_at, pdu_id",
        )
        .fetch_all(self.pool.pool())
        .await?;

        Ok(records)
    }

    async fn list_for_pdu(&self, pdu_id: &str) -> Result<Vec<AlertRecord>, AppError> {
        let records = sqlx::query_as::<_, AlertRecord>(
            "SELECT * FROM active_alerts WHERE pdu_id = $1 ORDER BY alert_started_at",
        )
        .bind(pdu_id)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(records)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.pool.health_check().await
    }
}
