// ==========================================
// 组合分析数据导入系统 - 行规范化器
// ==========================================
// 职责: 单文件 → 规范化帧
// 流程: 解析 → 表头映射 → 必要字段补齐/校验 → 组合名派生
//       → 按列类型转换 → 按 Schema 顺序重排
// 约定: 任一步失败只跳过该文件（SkipReason），不中止运行
// ==========================================

use crate::domain::frame::{strip_run_marker, FileRecord, NormalizedFrame};
use crate::domain::schema::{CanonicalSchema, SchemaSource};
use crate::domain::types::{SqlType, Value};
use crate::importer::data_cleaner;
use crate::importer::error::SkipReason;
use crate::importer::file_parser::{RawTable, UniversalFileParser};
use crate::importer::header_mapper::map_headers;
use crate::importer::profile::ImportProfile;
use chrono::{DateTime, Utc};

/// 行规范化器（每个导入变体一份配置，可按文件并发克隆使用）
#[derive(Clone)]
pub struct RowNormalizer {
    profile: ImportProfile,
}

/// Schema 字段的取值来源
enum FieldSource {
    /// 源表头下标
    Column(usize),
    /// 上下文会话 ID
    Session,
    /// 上下文记录 ID
    RecordId,
    /// 文件名派生的组合名
    PortfolioHint,
    /// 落库时间戳（update_time）
    Stamp,
    /// 非必要字段缺失 → Null
    Absent,
}

impl RowNormalizer {
    pub fn new(profile: ImportProfile) -> Self {
        Self { profile }
    }

    /// 规范化单个文件
    pub fn normalize(&self, record: &FileRecord) -> Result<NormalizedFrame, SkipReason> {
        // 文件名过滤在解析之前（如净值导入只接受含"回测"标记的文件）
        if let Some(marker) = self.profile.name_filter {
            if !record.file_name().contains(marker) {
                return Err(SkipReason::NameFilterMismatch(marker.to_string()));
            }
        }

        // === 步骤 1: 解析 ===
        let table = UniversalFileParser.parse(&record.path)?;
        if table.rows.is_empty() {
            return Err(SkipReason::EmptyFile);
        }

        match &self.profile.schema_source {
            SchemaSource::Fixed(schema) => self.normalize_fixed(record, &table, schema),
            SchemaSource::Inferred => Ok(self.normalize_inferred(record, &table)),
        }
    }

    /// 固定 Schema 模式：映射 → 校验 → 转换 → 按 Schema 顺序输出
    fn normalize_fixed(
        &self,
        record: &FileRecord,
        table: &RawTable,
        schema: &CanonicalSchema,
    ) -> Result<NormalizedFrame, SkipReason> {
        // === 步骤 2: 表头映射 ===
        let fields = schema.fields();
        let mapping = map_headers(&table.headers, &fields, self.profile.header_rules);

        if mapping.is_empty() && !self.profile.header_rules.is_empty() {
            return Err(SkipReason::NoRecognizedColumns);
        }

        // === 步骤 3: 必要字段校验与补齐来源规划 ===
        let mut plan: Vec<(String, SqlType, FieldSource)> = Vec::with_capacity(schema.len());
        for spec in &schema.columns {
            let field = spec.field.as_str();
            let source = if let Some(idx) = mapping.get(field) {
                FieldSource::Column(*idx)
            } else if field == "session_id" && record.session_id.is_some() {
                FieldSource::Session
            } else if field == "id" && record.record_id.is_some() {
                FieldSource::RecordId
            } else if field == "portfolio_name" {
                // === 步骤 4: 组合名缺失时由文件名派生 ===
                FieldSource::PortfolioHint
            } else if field == "update_time" {
                FieldSource::Stamp
            } else if self.profile.required_fields.contains(&field) {
                return Err(SkipReason::MissingRequiredField(field.to_string()));
            } else {
                FieldSource::Absent
            };
            plan.push((spec.field.clone(), spec.sql_type.clone(), source));
        }

        // === 步骤 5-6: 按列类型转换，按 Schema 顺序输出 ===
        // 时间戳按文件打一次，不逐行取
        let stamp = Utc::now();
        let mut rows = Vec::with_capacity(table.rows.len());
        for raw_row in &table.rows {
            let mut row = Vec::with_capacity(plan.len());
            for (field, sql_type, source) in &plan {
                let raw: Option<String> = match source {
                    FieldSource::Column(idx) => table
                        .headers
                        .get(*idx)
                        .and_then(|h| raw_row.get(h))
                        .cloned(),
                    FieldSource::Session => record.session_id.clone(),
                    FieldSource::RecordId => record.record_id.clone(),
                    FieldSource::PortfolioHint => Some(record.portfolio_hint.clone()),
                    FieldSource::Stamp | FieldSource::Absent => None,
                };
                row.push(coerce_value(field, sql_type, raw, stamp));
            }
            rows.push(row);
        }

        Ok(NormalizedFrame {
            columns: fields.iter().map(|f| (*f).to_string()).collect(),
            rows,
        })
    }

    /// 推断模式：保留全部源列为文本，按需补 session_id / id / portfolio_name
    fn normalize_inferred(&self, record: &FileRecord, table: &RawTable) -> NormalizedFrame {
        // 保留源列顺序；重复表头仅取首列
        let mut columns: Vec<String> = Vec::new();
        for h in &table.headers {
            if !columns.contains(h) {
                columns.push(h.clone());
            }
        }

        let mut rows: Vec<Vec<Value>> = table
            .rows
            .iter()
            .map(|raw_row| {
                columns
                    .iter()
                    .map(|c| {
                        raw_row
                            .get(c)
                            .map(|v| Value::from_raw(v))
                            .unwrap_or(Value::Null)
                    })
                    .collect()
            })
            .collect();

        let push_column = |columns: &mut Vec<String>, rows: &mut Vec<Vec<Value>>, name: &str, value: Value| {
            if !columns.iter().any(|c| c == name) {
                columns.push(name.to_string());
                for row in rows.iter_mut() {
                    row.push(value.clone());
                }
            }
        };

        if let Some(session) = &record.session_id {
            push_column(
                &mut columns,
                &mut rows,
                "session_id",
                Value::Text(session.clone()),
            );
        }
        if let Some(id) = &record.record_id {
            push_column(&mut columns, &mut rows, "id", Value::Text(id.clone()));
        }
        push_column(
            &mut columns,
            &mut rows,
            "portfolio_name",
            Value::Text(record.portfolio_hint.clone()),
        );

        NormalizedFrame { columns, rows }
    }
}

/// 单元格转换：按列 SQL 类型 best-effort 解析，失败落 Null
fn coerce_value(
    field: &str,
    sql_type: &SqlType,
    raw: Option<String>,
    stamp: DateTime<Utc>,
) -> Value {
    // update_time: 文件内带列则解析其值，缺失或解析失败盖落库时间戳
    if field == "update_time" {
        return match data_cleaner::normalize_null(raw) {
            Some(v) => data_cleaner::parse_datetime_flexible(&v)
                .map(Value::DateTime)
                .unwrap_or(Value::DateTime(stamp)),
            None => Value::DateTime(stamp),
        };
    }

    let Some(v) = data_cleaner::normalize_null(raw) else {
        return Value::Null;
    };

    let mut value = match sql_type {
        SqlType::BigInt => data_cleaner::parse_integer(&v)
            .map(Value::Integer)
            .or_else(|| data_cleaner::parse_number(&v).map(Value::Number))
            .unwrap_or(Value::Null),
        SqlType::Decimal(_, _) | SqlType::Float => data_cleaner::parse_number(&v)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        SqlType::Date => data_cleaner::parse_date_flexible(&v)
            .map(Value::Date)
            .unwrap_or(Value::Null),
        SqlType::DateTime => data_cleaner::parse_datetime_flexible(&v)
            .map(Value::DateTime)
            .unwrap_or(Value::Null),
        SqlType::Varchar(_) | SqlType::Text => Value::Text(v),
    };

    // 组合名统一去掉结尾 `_<数字>` 编号（防止同名组合多次运行被当作不同组合）
    if field == "portfolio_name" {
        if let Value::Text(s) = &value {
            value = Value::Text(strip_run_marker(s).to_string());
        }
    }
    value
}
