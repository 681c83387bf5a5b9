// ==========================================
// 组合分析数据导入系统 - 领域层
// ==========================================
// 职责: 导入管道的核心数据类型（帧/Schema/值）
// 红线: 不含文件解析、不含落库逻辑
// ==========================================

pub mod frame;
pub mod schema;
pub mod types;

// 重导出核心类型
pub use frame::{derive_portfolio_name, strip_run_marker, AggregatedDataset, FileRecord, NormalizedFrame};
pub use schema::{CanonicalSchema, ColumnSpec, PrimaryKeySpec, SchemaSource};
pub use types::{SqlType, Value};
