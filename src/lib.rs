// ==========================================
// 组合分析数据导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 回测结果批量入库工具（一次性批处理）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 数据帧与 Schema 类型
pub mod domain;

// 数据仓储层 - 表落库
pub mod repository;

// 导入层 - 发现/规范化/聚合/编排
pub mod importer;

// 配置层 - 运行配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    AggregatedDataset, CanonicalSchema, ColumnSpec, FileRecord, NormalizedFrame, PrimaryKeySpec,
    SchemaSource, SqlType, Value,
};

// 导入层
pub use importer::{
    FileOutcome, FileStatus, ImportError, ImportOrchestrator, ImportOutcome, ImportProfile,
    ImportRequest, ImportResult, PortfolioImporter, RunStatus, SkipReason,
};

// 配置
pub use config::{ImportConfig, ImportConfigReader};

// 仓储
pub use repository::{RepositoryError, SqliteTableSinkRepository, TableSinkRepository};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "组合分析数据导入系统";
