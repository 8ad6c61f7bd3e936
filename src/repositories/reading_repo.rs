//! PDU 读数仓库

use crate::db::PostgresPool;
use crate::errors::AppError;
use crate::models::MetricReading;

/// 读数来源（由采集层写入）
#[async_trait::async_trait]
pub trait ReadingSource: Send + Sync {
    /// 每个 PDU 的最新一条读数
    async fn latest_readings(&self) -> Result<Vec<MetricReading>, AppError>;
}

/// PDU 读数仓库
#[derive(Clone)]
pub struct ReadingRepository {
    pool: PostgresPool,
}

impl ReadingRepository {
    pub fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ReadingSource for ReadingRepository {
    async fn latest_readings(&self) -> Result<Vec<MetricReading>, AppError> {
        let readings = sqlx::query_as::<_, MetricReading>(
            r#"
            SELECT DISTINCT ON (pdu_id)
                pdu_id, rack_id, chain_id, name, site, datacenter, phase, node, serial,
                current, voltage, temperature, humidity, recorded_at
            FROM pdu_readings
            ORDER BY pdu_id, recorded_at DESC
            "#,
        )
        .fetch_all(self.pool.pool())
        .await?;

        Ok(readings)
    }
}
