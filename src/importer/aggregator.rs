// ==========================================
// 组合分析数据导入系统 - 聚合器
// ==========================================
// 职责: 多帧拼接为一个数据集
// 语义: 行顺序 = 发现顺序 + 文件内顺序；列取首见并集；
//       跨文件统一 valuation_date 列类型
// ==========================================

use crate::domain::frame::{AggregatedDataset, NormalizedFrame};
use crate::domain::types::Value;
use crate::importer::data_cleaner;

/// 拼接规范化帧
///
/// 空列表返回 None（显式空标记，编排器据此短路，不触达落库层）。
pub fn aggregate(frames: Vec<NormalizedFrame>) -> Option<AggregatedDataset> {
    if frames.is_empty() {
        return None;
    }

    // 列并集（首见顺序）
    let mut columns: Vec<String> = Vec::new();
    for frame in &frames {
        for c in &frame.columns {
            if !columns.contains(c) {
                columns.push(c.clone());
            }
        }
    }

    // 逐帧重投影到并集列，缺失单元格补 Null
    let mut rows: Vec<Vec<Value>> = Vec::new();
    for frame in frames {
        let index_map: Vec<Option<usize>> = columns
            .iter()
            .map(|c| frame.columns.iter().position(|fc| fc == c))
            .collect();
        for row in frame.rows {
            rows.push(
                index_map
                    .iter()
                    .map(|idx| match idx {
                        Some(i) => row[*i].clone(),
                        None => Value::Null,
                    })
                    .collect(),
            );
        }
    }

    // 跨文件统一: valuation_date 列（大小写不敏感）重解析为日期，
    // 即使逐文件阶段已尝试过，保证各文件解析成败不一时类型仍一致
    for (i, column) in columns.iter().enumerate() {
        if column.eq_ignore_ascii_case("valuation_date") {
            for row in &mut rows {
                row[i] = reparse_date(&row[i]);
            }
        }
    }

    Some(AggregatedDataset { columns, rows })
}

/// 单元格重解析为日期；已是日期保留，解析失败落 Null
fn reparse_date(value: &Value) -> Value {
    match value {
        Value::Date(d) => Value::Date(*d),
        Value::DateTime(dt) => Value::Date(dt.date_naive()),
        Value::Text(s) => data_cleaner::parse_date_flexible(s)
            .map(Value::Date)
            .unwrap_or(Value::Null),
        Value::Integer(i) => data_cleaner::parse_date_flexible(&i.to_string())
            .map(Value::Date)
            .unwrap_or(Value::Null),
        Value::Number(_) | Value::Null => Value::Null,
    }
}
