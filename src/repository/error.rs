// ==========================================
// 组合分析数据导入系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("数据库连接失败: {0}")]
    ConnectionError(String),

    #[error("数据库连接已关闭")]
    ConnectionClosed,

    #[error("锁获取失败: {0}")]
    LockError(String),

    #[error("数据库执行失败: {0}")]
    SqlError(#[from] rusqlite::Error),

    #[error("IO 失败: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
