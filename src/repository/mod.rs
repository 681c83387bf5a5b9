// ==========================================
// 组合分析数据导入系统 - 数据仓储层
// ==========================================
// 职责: 表落库（建表 + upsert）
// 红线: Repository 不含业务规则，只做数据写入
// ==========================================

pub mod error;
pub mod table_sink_repo;
pub mod table_sink_repo_impl;

// 重导出核心类型
pub use error::RepositoryError;
pub use table_sink_repo::TableSinkRepository;
pub use table_sink_repo_impl::SqliteTableSinkRepository;
