//! 阈值配置仓库

use crate::db::PostgresPool;
use crate::errors::AppError;
use crate::models::ThresholdSetting;
use sqlx::FromRow;
use std::collections::HashMap;

/// 阈值配置读取接口
#[async_trait::async_trait]
pub trait ThresholdStore: Send + Sync {
    /// 全局阈值
    async fn list_global(&self) -> Result<Vec<ThresholdSetting>, AppError>;

    /// 一次性批量加载多个机柜的覆盖配置
    async fn list_overrides(
        &self,
        rack_ids: &[String],
    ) -> Result<HashMap<String, Vec<ThresholdSetting>>, AppError>;
}

#[derive(FromRow)]
struct OverrideRow {
    rack_id: String,
    key: String,
    value: f64,
    unit: Option<String>,
}

/// 阈值配置仓库
#[derive(Clone)]
pub struct ThresholdRepository {
    pool: PostgresPool,
}

impl ThresholdRepository {
    pub fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ThresholdStore for ThresholdRepository {
    async fn list_global(&self) -> Result<Vec<ThresholdSetting>, AppError> {
        let settings = sqlx::query_as::<_, ThresholdSetting>(
            "SELECT key, value, unit FROM threshold_settings ORDER BY key",
        )
        .fetch_all(self.pool.pool())
        .await?;

        Ok(settings)
    }

    async fn list_overrides(
        &self,
        rack_ids: &[String],
    ) -> Result<HashMap<String, Vec<ThresholdSetting>>, AppError> {
        if rack_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, OverrideRow>(
            r#"
            SELECT rack_id, key, value, unit FROM rack_threshold_overrides
            WHERE rack_id = ANY($1)
            ORDER BY rack_id, key
            "#,
        )
        .bind(rack_ids)
        .fetch_all(self.pool.pool())
        .await?;

        let mut overrides: HashMap<String, Vec<ThresholdSetting>> = HashMap::new();
        for row in rows {
            overrides.entry(row.rack_id).or_default().push(ThresholdSetting {
                key: row.key,
                value: row.value,
                unit: row.unit,
            });
        }

        Ok(overrides)
    }
}
