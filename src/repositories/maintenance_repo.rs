//! 维护登记仓库

use crate::db::PostgresPool;
use crate::errors::AppError;
use std::collections::HashSet;

/// 维护集合读取接口
#[async_trait::async_trait]
pub trait MaintenanceStore: Send + Sync {
    /// 维护中的机柜
    async fn list_rack_ids(&self) -> Result<HashSet<String>, AppError>;

    /// 整链维护的链路（同一次维护登记了该链路下多个机柜）
    async fn list_chain_ids(&self) -> Result<HashSet<String>, AppError>;
}

/// 维护登记仓库
#[derive(Clone)]
pub struct MaintenanceRepository {
    pool: PostgresPool,
}

impl MaintenanceRepository {
    pub fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MaintenanceStore for MaintenanceRepository {
    async fn list_rack_ids(&self) -> Result<HashSet<String>, AppError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT rack_id FROM maintenance_racks")
            .fetch_all(self.pool.pool())
            .await?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn list_chain_ids(&self) -> Result<HashSet<String>, AppError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT chain_id FROM maintenance_racks
            WHERE chain_id IS NOT NULL AND chain_id <> ''
            GROUP BY maintenance_id, chain_id
            HAVING COUNT(DISTINCT rack_id) > 1
            "#,
        )
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}
