// ==========================================
// 组合分析数据导入系统 - 表落库 Trait
// ==========================================
// 职责: 定义落库接口（不包含实现）
// ==========================================

use crate::domain::frame::AggregatedDataset;
use crate::domain::schema::CanonicalSchema;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// TableSinkRepository Trait
// ==========================================
// 用途: 目标表的建表与写入接口
// 实现者: SqliteTableSinkRepository
#[async_trait]
pub trait TableSinkRepository: Send + Sync {
    /// 按 Schema 建表（幂等；表已存在则不动）
    ///
    /// # 参数
    /// - table: 目标表名
    /// - schema: 规范 Schema（列顺序即建表列顺序）
    /// - pk_fields: 主键字段（可为空 → 无主键表）
    /// - database: 目标库名
    ///
    /// # 说明
    /// 建表失败对调用方非致命（既有兼容表仍可接收 upsert）。
    async fn create_table_if_absent(
        &self,
        table: &str,
        schema: &CanonicalSchema,
        pk_fields: &[String],
        database: &str,
    ) -> RepositoryResult<()>;

    /// 按主键 insert-or-update 写入数据集
    ///
    /// # 返回
    /// - Ok(usize): 写入行数
    ///
    /// # 说明
    /// - 零行调用是安全的 no-op
    /// - 主键为空时退化为普通插入
    /// - 重复调用同一数据集不产生重复行（幂等，主键冲突取后写）
    async fn upsert(
        &self,
        dataset: &AggregatedDataset,
        table: &str,
        schema: &CanonicalSchema,
        pk_fields: &[String],
        database: &str,
    ) -> RepositoryResult<usize>;

    /// 释放连接；可安全重复调用
    async fn close(&self) -> RepositoryResult<()>;
}
