// ==========================================
// 组合分析数据导入系统 - Schema 类型
// ==========================================
// 职责: 规范列定义 / Schema 来源 / 主键规格
// ==========================================

use crate::domain::types::SqlType;
use serde::Serialize;

/// 规范列定义（字段名 + SQL 类型）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSpec {
    pub field: String,
    pub sql_type: SqlType,
}

impl ColumnSpec {
    pub fn new(field: &str, sql_type: SqlType) -> Self {
        Self {
            field: field.to_string(),
            sql_type,
        }
    }
}

/// 规范 Schema
///
/// 不变量：字段名唯一；列顺序即落库列顺序。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalSchema {
    pub columns: Vec<ColumnSpec>,
}

impl CanonicalSchema {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        debug_assert!(
            {
                let mut seen = std::collections::HashSet::new();
                columns.iter().all(|c| seen.insert(c.field.as_str()))
            },
            "字段名必须唯一"
        );
        Self { columns }
    }

    pub fn fields(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.field.as_str()).collect()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.columns.iter().any(|c| c.field == field)
    }

    pub fn sql_type_of(&self, field: &str) -> Option<&SqlType> {
        self.columns
            .iter()
            .find(|c| c.field == field)
            .map(|c| &c.sql_type)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Schema 来源
///
/// Fixed: 预先声明的固定 Schema（净值/绩效/权重表）
/// Inferred: 对自由格式输入，按观测值逐列推断
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSource {
    Fixed(CanonicalSchema),
    Inferred,
}

/// 主键规格
///
/// 来自配置的逗号分隔字段列表；空项丢弃。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimaryKeySpec {
    fields: Vec<String>,
}

impl PrimaryKeySpec {
    /// 解析逗号分隔的主键配置（如 "valuation_date,session_id,id,"）
    pub fn parse(raw: &str) -> Self {
        let fields = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 对照 Schema 校验主键字段
    ///
    /// 返回 (有效主键, 被丢弃的未知字段)。Schema 中不存在的字段从
    /// 主键中剔除；全部剔除后退化为无主键插入，由调用方告警。
    pub fn validate_against(&self, schema: &CanonicalSchema) -> (PrimaryKeySpec, Vec<String>) {
        let (kept, dropped): (Vec<String>, Vec<String>) = self
            .fields
            .iter()
            .cloned()
            .partition(|f| schema.contains(f));
        (PrimaryKeySpec { fields: kept }, dropped)
    }
}
