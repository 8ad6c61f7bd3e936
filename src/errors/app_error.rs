//! 统一错误类型定义

/// 应用错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // 数据验证错误
    #[error("数据无效: {0}")]
    ValidationError(String),

    // 数据库错误
    #[error("数据库错误: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // 存储不可用（连接失败、超时等）
    #[error("存储不可用: {0}")]
    StoreUnavailable(String),

    // 阈值配置错误
    #[error("阈值配置无效: {0}")]
    InvalidThreshold(String),

    // 内部错误
    #[error("内部服务错误: {0}")]
    InternalError(String),

    // 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),
}

impl AppError {
    /// 是否为存储连接层面的故障
    ///
    /// 出现这类错误时对账会先做健康检查，确认存储不可达才放弃整个周期。
    pub fn is_store_unavailable(&self) -> bool {
        match self {
            AppError::StoreUnavailable(_) => true,
            AppError::DatabaseError(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::WorkerCrashed
            ),
            _ => false,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
