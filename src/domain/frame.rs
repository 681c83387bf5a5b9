// ==========================================
// 组合分析数据导入系统 - 数据帧类型
// ==========================================
// 职责: 文件上下文 / 规范化帧 / 聚合数据集
// ==========================================

use crate::domain::types::Value;
use serde::Serialize;
use std::path::PathBuf;

/// 组合名派生时识别的文件名后缀标记
///
/// 顺序有意义：长标记在前，避免 `_contribution_weight` 被 `_contribution` 截断。
pub const PORTFOLIO_NAME_SUFFIXES: &[&str] = &[
    "_contribution_weight",
    "_contribution",
    "_performance_summary",
    "_回测",
    "-回测",
    "回测",
];

/// 从文件名主干派生组合名
///
/// 规则：
/// 1. 去掉所有已识别的后缀标记（如 `_contribution_weight` / `_回测`）
/// 2. 去掉一个结尾的 `_<数字>` 标记（同名组合多次运行产生的编号）
pub fn derive_portfolio_name(stem: &str) -> String {
    let mut name = stem.to_string();
    for suffix in PORTFOLIO_NAME_SUFFIXES {
        name = name.replace(suffix, "");
    }
    strip_run_marker(&name).to_string()
}

/// 去掉结尾的 `_<数字>` 标记（如 `fundA_3` → `fundA`）
pub fn strip_run_marker(name: &str) -> &str {
    if let Some(pos) = name.rfind('_') {
        let tail = &name[pos + 1..];
        if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) {
            return &name[..pos];
        }
    }
    name
}

/// 已发现文件及其派生上下文
///
/// 发现阶段创建，之后不可变。
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    /// 文件路径
    pub path: PathBuf,
    /// 记录 ID（调用方显式指定，或取路径祖父目录名）
    pub record_id: Option<String>,
    /// 会话 ID（调用方指定，可缺省）
    pub session_id: Option<String>,
    /// 由文件名派生的组合名（已去后缀与编号标记）
    pub portfolio_hint: String,
}

impl FileRecord {
    pub fn new(path: PathBuf, session_id: Option<String>, record_id: Option<String>) -> Self {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let portfolio_hint = derive_portfolio_name(stem);
        Self {
            path,
            record_id,
            session_id,
            portfolio_hint,
        }
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// 单文件规范化输出
///
/// 不变量：每行携带全部列；固定 Schema 模式下列顺序即 Schema 顺序。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedFrame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl NormalizedFrame {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// 跨文件聚合数据集
///
/// 行顺序 = 文件发现顺序 + 文件内顺序；列为各帧列的首见并集。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedDataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl AggregatedDataset {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, field: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == field)
    }

    /// 指定列的非空值迭代
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().filter_map(move |row| {
            let v = row.get(index)?;
            if v.is_null() {
                None
            } else {
                Some(v)
            }
        })
    }
}
