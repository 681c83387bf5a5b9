// ==========================================
// 组合分析数据导入系统 - 导入 Trait
// ==========================================
// 职责: 定义导入接口（不包含实现）
// ==========================================

use crate::importer::error::{ImportResult, SkipReason};
use crate::importer::file_parser::RawTable;
use crate::importer::orchestrator::{ImportOutcome, ImportRequest};
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// PortfolioImporter Trait
// ==========================================
// 用途: 导入主接口（一次完整运行）
// 实现者: ImportOrchestrator
#[async_trait]
pub trait PortfolioImporter: Send + Sync {
    /// 执行一次完整导入
    ///
    /// # 流程
    /// 发现 → 规范化（逐文件隔离）→ 聚合 → Schema 解析 → 建表 → 落库
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 运行结果（含逐文件状态）
    /// - Err: 仅目录/配置/落库级致命错误
    async fn run(&self, request: &ImportRequest) -> ImportResult<ImportOutcome>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（规范化阶段 1）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始表格（有序表头 + 行记录）
    ///
    /// # 返回
    /// - Ok(RawTable): 解析结果
    /// - Err(SkipReason): 文件级可恢复失败，调用方跳过该文件
    fn parse_to_raw_table(&self, file_path: &Path) -> Result<RawTable, SkipReason>;
}
