// ==========================================
// 组合分析数据导入系统 - Schema 解析器
// ==========================================
// 职责: 固定 Schema 原样返回；自由格式按观测值逐列推断
// 策略: "嗅数据，不信表头" —— 入库文件没有固定契约
// ==========================================

use crate::domain::frame::AggregatedDataset;
use crate::domain::schema::{CanonicalSchema, ColumnSpec, SchemaSource};
use crate::domain::types::{SqlType, Value};
use crate::importer::data_cleaner;

/// 字符串列宽的三档分级，避免短标识符过度占用存储
const VARCHAR_SHORT: usize = 150;
const VARCHAR_MEDIUM: usize = 500;

/// 解析本次运行的 Schema
pub fn resolve(source: &SchemaSource, dataset: &AggregatedDataset) -> CanonicalSchema {
    match source {
        SchemaSource::Fixed(schema) => schema.clone(),
        SchemaSource::Inferred => infer(dataset),
    }
}

/// 按观测值推断 Schema
///
/// 每列类型优先级：全整数 → BIGINT；含小数 → DECIMAL(18,8)；
/// 时间值 → DATETIME；否则按最大观测长度分档的字符串类型。
pub fn infer(dataset: &AggregatedDataset) -> CanonicalSchema {
    let columns = dataset
        .columns
        .iter()
        .enumerate()
        .map(|(i, field)| ColumnSpec::new(field, infer_column(dataset, i)))
        .collect();
    CanonicalSchema::new(columns)
}

fn infer_column(dataset: &AggregatedDataset, index: usize) -> SqlType {
    let mut saw_value = false;
    let mut all_integer = true;
    let mut all_numeric = true;
    let mut all_temporal = true;
    let mut max_len = 0usize;

    for value in dataset.column_values(index) {
        saw_value = true;
        max_len = max_len.max(value.display_len());

        match value {
            Value::Integer(_) => {
                all_temporal = false;
            }
            Value::Number(_) => {
                all_integer = false;
                all_temporal = false;
            }
            Value::Date(_) | Value::DateTime(_) => {
                all_integer = false;
                all_numeric = false;
            }
            Value::Text(s) => {
                all_temporal = false;
                if data_cleaner::parse_integer(s).is_none() {
                    all_integer = false;
                    if data_cleaner::parse_number(s).is_none() {
                        all_numeric = false;
                    }
                }
            }
            Value::Null => unreachable!("column_values 已滤除 Null"),
        }
    }

    // 全空列退化为短字符串
    if !saw_value {
        return SqlType::Varchar(VARCHAR_SHORT as u16);
    }

    if all_temporal {
        return SqlType::DateTime;
    }
    if all_integer {
        return SqlType::BigInt;
    }
    if all_numeric {
        return SqlType::Decimal(18, 8);
    }
    if max_len <= VARCHAR_SHORT {
        SqlType::Varchar(VARCHAR_SHORT as u16)
    } else if max_len <= VARCHAR_MEDIUM {
        SqlType::Varchar(VARCHAR_MEDIUM as u16)
    } else {
        SqlType::Text
    }
}
