// ==========================================
// 组合分析数据导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分层: ImportError = 致命（中止本次运行）
//       SkipReason  = 文件级可恢复（跳过该文件，运行继续）
// ==========================================

use serde::Serialize;
use thiserror::Error;

/// 导入运行级错误（致命，中止运行）
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 目录与配置错误 =====
    #[error("扫描目录不存在: {0}")]
    DirectoryNotFound(String),

    #[error("目录遍历失败: {0}")]
    DirectoryReadError(String),

    #[error("配置缺失 (key: {0})")]
    ConfigMissing(String),

    #[error("配置读取失败 ({path}): {message}")]
    ConfigReadError { path: String, message: String },

    // ===== 落库错误 =====
    #[error("数据落库失败: {0}")]
    SinkError(#[from] crate::repository::RepositoryError),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::DirectoryReadError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

/// 文件级跳过原因（可恢复，逐文件记录，不影响运行结果）
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum SkipReason {
    #[error("文件格式不支持: {0}（仅支持 .csv/.xlsx/.xls）")]
    UnsupportedFormat(String),

    #[error("文件解析失败: {0}")]
    ParseFailed(String),

    #[error("文件为空（无数据行）")]
    EmptyFile,

    #[error("未识别到任何已知列")]
    NoRecognizedColumns,

    #[error("缺少必要列: {0}")]
    MissingRequiredField(String),

    #[error("文件名不含标记 {0}")]
    NameFilterMismatch(String),

    #[error("解析超时（超过 {0} 秒）")]
    Timeout(u64),
}
